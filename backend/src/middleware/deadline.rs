//! Per-request deadline.
//!
//! The wrapped service future is dropped once the deadline passes, which
//! cancels in-flight database calls, and the client receives a
//! `service_unavailable` error envelope.

use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::Error as DomainError;

/// Default request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Middleware enforcing a wall-clock limit on each request.
///
/// A request that overruns resolves to an [`actix_web::Error`] wrapping a
/// `service_unavailable` domain error; the server renders it through the
/// usual error envelope.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use actix_web::App;
/// use storefront::middleware::Deadline;
///
/// let app = App::new().wrap(Deadline::new(Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    limit: Duration,
}

impl Deadline {
    /// Build a deadline that cancels requests running longer than `limit`.
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

impl<S, B> Transform<S, ServiceRequest> for Deadline
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = DeadlineMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(DeadlineMiddleware {
            service,
            limit: self.limit,
        }))
    }
}

/// Service wrapper produced by [`Deadline`].
pub struct DeadlineMiddleware<S> {
    service: S,
    limit: Duration,
}

impl<S, B> Service<ServiceRequest> for DeadlineMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let limit = self.limit;
        // Routing needs sole ownership of the request head, so only the path
        // is kept for the timeout branch.
        let path = req.path().to_owned();
        let fut = self.service.call(req);
        Box::pin(async move {
            match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        %path,
                        limit_ms = limit.as_millis(),
                        "request deadline exceeded"
                    );
                    Err(DomainError::service_unavailable("request timed out").into())
                }
            }
        })
    }
}

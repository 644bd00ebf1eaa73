//! HTTP server configuration object.

use std::time::Duration;

use crate::config::AppSettings;
use crate::middleware::DEFAULT_REQUEST_TIMEOUT;

/// Listener and middleware settings for [`create_server`](super::create_server).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: (String, u16),
    pub(crate) request_timeout: Duration,
}

impl ServerConfig {
    /// Bind to `bind_addr` with the default request deadline.
    #[must_use]
    pub fn new(bind_addr: (String, u16)) -> Self {
        Self {
            bind_addr,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request deadline.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Host and port to bind.
    #[must_use]
    pub fn bind_addr(&self) -> &(String, u16) {
        &self.bind_addr
    }

    /// Per-request deadline.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl From<&AppSettings> for ServerConfig {
    fn from(settings: &AppSettings) -> Self {
        Self::new(settings.bind_addr()).with_request_timeout(settings.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_to_the_standard_deadline() {
        let config = ServerConfig::new(("127.0.0.1".to_owned(), 0));
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.bind_addr(), &("127.0.0.1".to_owned(), 0));
    }

    #[rstest]
    fn timeout_override_sticks() {
        let config = ServerConfig::new(("0.0.0.0".to_owned(), 8080))
            .with_request_timeout(Duration::from_secs(2));
        assert_eq!(config.request_timeout(), Duration::from_secs(2));
    }
}

//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{Adapters, build_http_state, postgres_adapters};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::accounts::{
    get_profile, login, logout, register, update_avatar, update_profile, verify,
};
use crate::inbound::http::admin::{delete_user, list_users, set_balance, set_role, stats};
use crate::inbound::http::balance::{adjust_balance, checkout};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::json_config;
use crate::middleware::{Deadline, Trace};

/// Shared state handed to every worker.
#[derive(Clone)]
pub struct AppDependencies {
    /// Readiness and liveness flags.
    pub health_state: web::Data<HealthState>,
    /// Driving ports for the API handlers.
    pub http_state: web::Data<HttpState>,
    /// Request deadline wrapped around the API scope.
    pub deadline: Deadline,
}

/// Assemble routes, extractor configuration and middleware.
///
/// Routes live under `/api`; health checks and (in debug builds) Swagger UI
/// sit at the root.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        deadline,
    } = deps;

    let api = web::scope("/api")
        .service(register)
        .service(login)
        .service(verify)
        .service(get_profile)
        .service(update_profile)
        .service(update_avatar)
        .service(adjust_balance)
        .service(checkout)
        .service(logout)
        .service(stats)
        .service(list_users)
        .service(set_role)
        .service(set_balance)
        .service(delete_user);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.wrap(deadline).wrap(Trace)
}

/// Construct an Actix HTTP server.
///
/// Readiness flips to 200 once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state: web::Data::new(http_state),
        deadline: Deadline::new(config.request_timeout),
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}

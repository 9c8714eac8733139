//! Application state and factory
//!
//! Holds the shared services and builds the Actix-web application around
//! them.

use actix_cors::Cors;
use actix_web::{
    error::InternalError,
    http::StatusCode,
    web, App, HttpResponse,
};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use ac_core::domain::entities::Role;
use ac_core::repositories::{DirectoryRepository, TokenStore};
use ac_core::services::{AuthService, RequestAuthorizer, TokenService};
use ac_shared::{error_codes, HealthResponse};

use crate::dto::{ErrorResponse, ErrorResponseExt};
use crate::middleware::JwtAuth;
use crate::routes::{admin, permission, session, user};

/// Application state that holds shared services
pub struct AppState<D, S>
where
    D: DirectoryRepository,
    S: TokenStore + 'static,
{
    pub auth: Arc<AuthService<D, S>>,
}

impl<D, S> AppState<D, S>
where
    D: DirectoryRepository,
    S: TokenStore + 'static,
{
    pub fn new(auth: Arc<AuthService<D, S>>) -> Self {
        Self { auth }
    }

    pub fn tokens(&self) -> &Arc<TokenService<S>> {
        self.auth.tokens()
    }

    /// Gate handle for `JwtAuth`, which is not generic over the store
    pub fn authorizer(&self) -> web::Data<dyn RequestAuthorizer> {
        let authorizer: Arc<dyn RequestAuthorizer> = self.tokens().clone();
        web::Data::from(authorizer)
    }

    /// Seconds an access token minted now stays valid
    pub fn access_expires_in(&self) -> i64 {
        self.tokens().config().access_ttl.num_seconds()
    }
}

/// Create and configure the application with all dependencies
pub fn create_app<D, S>(
    app_state: web::Data<AppState<D, S>>,
    cors: Cors,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    D: DirectoryRepository + 'static,
    S: TokenStore + 'static,
{
    let authorizer = app_state.authorizer();

    App::new()
        .app_data(app_state)
        .app_data(authorizer)
        .app_data(web::JsonConfig::default().error_handler(|err, _| {
            let response = ErrorResponse::new(error_codes::VALIDATION_ERROR, err.to_string())
                .to_response(StatusCode::BAD_REQUEST);
            InternalError::from_response(err, response).into()
        }))
        .wrap(cors)
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/user")
                        .route("/getjwt", web::post().to(user::get_jwt::<D, S>))
                        .route("/refreshjwt", web::post().to(user::refresh_jwt::<D, S>))
                        .route("/validatejwt", web::post().to(user::validate_jwt::<D, S>))
                        .route("/logout", web::post().to(user::logout::<D, S>)),
                )
                .route(
                    "/session/me",
                    web::get().to(session::me).wrap(JwtAuth::new()),
                )
                .service(
                    web::scope("/admin")
                        .route(
                            "/principals/{principal_id}/sessions/revoke",
                            web::post()
                                .to(admin::revoke_principal_sessions::<D, S>)
                                .wrap(JwtAuth::roles(&[Role::Admin])),
                        )
                        .route(
                            "/tenants/{tenant_id}/sessions/revoke",
                            web::post()
                                .to(admin::revoke_tenant_sessions::<D, S>)
                                .wrap(JwtAuth::roles(&[Role::Admin, Role::Institution])),
                        ),
                )
                .route(
                    "/permission/check",
                    web::post()
                        .to(permission::check_permission::<D, S>)
                        .wrap(JwtAuth::new()),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::healthy("access-core-api", env!("CARGO_PKG_VERSION")))
}

async fn not_found() -> HttpResponse {
    ErrorResponse::new(error_codes::NOT_FOUND, "The requested resource was not found")
        .to_response(StatusCode::NOT_FOUND)
}

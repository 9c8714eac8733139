use actix_web::{http::StatusCode, web, HttpResponse};
use validator::Validate;

use ac_core::errors::{AuthError, DomainError};
use ac_core::repositories::{DirectoryRepository, TokenStore};
use ac_shared::error_codes;

use crate::app::AppState;
use crate::dto::{ErrorResponse, ErrorResponseExt, PermissionCheckRequest, PermissionCheckResponse};
use crate::handlers::{handle_domain_error, handle_validation_error};
use crate::middleware::AuthContext;

/// Handler for POST /api/v1/permission/check
///
/// Asks the permission oracle whether the caller holds `relation` on their
/// own tenant. A denial is a normal answer, not an error.
pub async fn check_permission<D, S>(
    state: web::Data<AppState<D, S>>,
    auth: AuthContext,
    request: web::Json<PermissionCheckRequest>,
) -> HttpResponse
where
    D: DirectoryRepository + 'static,
    S: TokenStore + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_error(errors);
    }

    let gate = state.tokens().gate();
    if !gate.has_oracle() {
        return ErrorResponse::new(error_codes::SERVICE_UNAVAILABLE, "Permission checks are not configured")
            .to_response(StatusCode::SERVICE_UNAVAILABLE);
    }

    match gate.check_relation(&auth, &request.relation).await {
        Ok(()) => HttpResponse::Ok().json(PermissionCheckResponse { allowed: true }),
        Err(DomainError::Auth(AuthError::PermissionDenied { .. })) => {
            HttpResponse::Ok().json(PermissionCheckResponse { allowed: false })
        }
        Err(error) => handle_domain_error(error),
    }
}

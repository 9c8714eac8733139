use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use ac_core::repositories::{DirectoryRepository, TokenStore};
use ac_core::services::extract_bearer;

use crate::app::AppState;
use crate::dto::{LoginRequest, LogoutResponse, TokenResponse, ValidateResponse};
use crate::handlers::{handle_domain_error, handle_validation_error, unauthorized_response};
use crate::middleware::authorization_header;

/// Handler for POST /api/v1/user/getjwt
///
/// Exchanges credentials for an access/refresh token pair.
///
/// # Request Body
///
/// ```json
/// {
///     "username": "ana",
///     "password": "..."
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "accessToken": "eyJ...",
///     "refreshToken": "eyJ...",
///     "tokenId": "9f0c...",
///     "tokenType": "Bearer",
///     "expiresIn": 900
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Missing fields
/// - 401 Unauthorized: Wrong credentials, disabled account or inactive tenant
/// - 503 Service Unavailable: Session storage unreachable
pub async fn get_jwt<D, S>(
    state: web::Data<AppState<D, S>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    D: DirectoryRepository + 'static,
    S: TokenStore + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_error(errors);
    }

    match state.auth.login(&request.username, &request.password).await {
        Ok(details) => HttpResponse::Ok().json(TokenResponse::from_details(details, state.access_expires_in())),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/user/refreshjwt
///
/// Takes the refresh token as the bearer credential and returns a new
/// access token for the same session. No new refresh token is issued.
pub async fn refresh_jwt<D, S>(req: HttpRequest, state: web::Data<AppState<D, S>>) -> HttpResponse
where
    D: DirectoryRepository + 'static,
    S: TokenStore + 'static,
{
    let refreshed = match extract_bearer(authorization_header(&req)) {
        Ok(token) => state.auth.refresh(token).await,
        Err(error) => Err(error),
    };

    match refreshed {
        Ok(details) => HttpResponse::Ok().json(TokenResponse::from_details(details, state.access_expires_in())),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/user/validatejwt
///
/// Runs the authorization gate, so every failure (storage outages included)
/// answers with the generic 401 like any other protected route.
pub async fn validate_jwt<D, S>(req: HttpRequest, state: web::Data<AppState<D, S>>) -> HttpResponse
where
    D: DirectoryRepository + 'static,
    S: TokenStore + 'static,
{
    match state.auth.validate(authorization_header(&req)).await {
        Ok(claims) => HttpResponse::Ok().json(ValidateResponse { valid: true, claims }),
        // Already logged with its kind by the gate
        Err(_) => unauthorized_response(),
    }
}

/// Handler for POST /api/v1/user/logout
///
/// Accepts either token of the session. Logging out a session that is
/// already gone succeeds with `revoked: false`.
pub async fn logout<D, S>(req: HttpRequest, state: web::Data<AppState<D, S>>) -> HttpResponse
where
    D: DirectoryRepository + 'static,
    S: TokenStore + 'static,
{
    match state.auth.logout(authorization_header(&req)).await {
        Ok(revoked) => HttpResponse::Ok().json(LogoutResponse { revoked }),
        Err(error) => handle_domain_error(error),
    }
}

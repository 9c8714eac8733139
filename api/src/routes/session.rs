use actix_web::HttpResponse;

use crate::dto::SessionResponse;
use crate::middleware::AuthContext;

/// Handler for GET /api/v1/session/me
pub async fn me(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(SessionResponse::from(&*auth))
}

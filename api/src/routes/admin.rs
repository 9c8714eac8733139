use actix_web::{web, HttpResponse};
use uuid::Uuid;

use ac_core::repositories::{DirectoryRepository, TokenStore};

use crate::app::AppState;
use crate::dto::RevokeResponse;
use crate::handlers::handle_domain_error;
use crate::middleware::AuthContext;

/// Handler for POST /api/v1/admin/principals/{principal_id}/sessions/revoke
///
/// Admin only. Revokes every live session of the principal.
pub async fn revoke_principal_sessions<D, S>(
    state: web::Data<AppState<D, S>>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> HttpResponse
where
    D: DirectoryRepository + 'static,
    S: TokenStore + 'static,
{
    let principal_id = path.into_inner();
    tracing::info!(
        actor = %auth.principal_id(),
        principal_id = %principal_id,
        "Bulk revoke requested for principal"
    );

    match state.tokens().revoke_all_for_principal(principal_id).await {
        Ok(revoked) => HttpResponse::Ok().json(RevokeResponse { revoked }),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/admin/tenants/{tenant_id}/sessions/revoke
///
/// Admins may target any tenant; institutions only their own.
pub async fn revoke_tenant_sessions<D, S>(
    state: web::Data<AppState<D, S>>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> HttpResponse
where
    D: DirectoryRepository + 'static,
    S: TokenStore + 'static,
{
    let tenant_id = path.into_inner();
    if let Err(error) = auth.ensure_tenant_access(tenant_id) {
        return handle_domain_error(error);
    }
    tracing::info!(actor = %auth.principal_id(), tenant_id = %tenant_id, "Bulk revoke requested for tenant");

    match state.tokens().revoke_all_for_tenant(tenant_id).await {
        Ok(revoked) => HttpResponse::Ok().json(RevokeResponse { revoked }),
        Err(error) => handle_domain_error(error),
    }
}

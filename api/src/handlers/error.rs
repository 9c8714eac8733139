use actix_web::{http::StatusCode, HttpResponse};
use validator::ValidationErrors;

use ac_core::errors::{AuthError, DomainError};
use ac_shared::error_codes;

use crate::dto::{ErrorResponse, ErrorResponseExt};

/// The one body every rejected credential gets; the specific reason is only logged
pub fn unauthorized_response() -> HttpResponse {
    ErrorResponse::new(error_codes::UNAUTHORIZED, "Unauthorized").to_response(StatusCode::UNAUTHORIZED)
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    match &error {
        DomainError::StorageFailure { .. } | DomainError::Configuration { .. } | DomainError::Internal { .. } => {
            tracing::error!(kind = error.kind(), error = %error, "Request failed");
        }
        _ => {
            tracing::warn!(kind = error.kind(), error = %error, "Request rejected");
        }
    }

    match error {
        DomainError::Token(_) => unauthorized_response(),

        DomainError::Auth(auth_error) => match auth_error {
            AuthError::InvalidCredentials => {
                ErrorResponse::new(error_codes::INVALID_CREDENTIALS, "Invalid username or password")
                    .to_response(StatusCode::UNAUTHORIZED)
            }
            AuthError::PrincipalDisabled => {
                ErrorResponse::new(error_codes::PRINCIPAL_DISABLED, "Account is disabled")
                    .to_response(StatusCode::UNAUTHORIZED)
            }
            AuthError::TenantInactive => {
                ErrorResponse::new(error_codes::TENANT_INACTIVE, "Organization is inactive")
                    .to_response(StatusCode::UNAUTHORIZED)
            }
            AuthError::MissingCredential
            | AuthError::RoleForbidden { .. }
            | AuthError::TenantForbidden { .. }
            | AuthError::PermissionDenied { .. } => unauthorized_response(),
        },

        DomainError::Validation { message } => {
            ErrorResponse::new(error_codes::VALIDATION_ERROR, message).to_response(StatusCode::BAD_REQUEST)
        }

        DomainError::NotFound { resource } => {
            ErrorResponse::new(error_codes::NOT_FOUND, format!("{} not found", resource))
                .to_response(StatusCode::NOT_FOUND)
        }

        DomainError::StorageFailure { .. } => ErrorResponse::new(
            error_codes::STORAGE_UNAVAILABLE,
            "Session storage is temporarily unavailable",
        )
        .to_response(StatusCode::SERVICE_UNAVAILABLE),

        DomainError::Configuration { .. } => {
            ErrorResponse::new(error_codes::CONFIGURATION_ERROR, "Service is misconfigured")
                .to_response(StatusCode::INTERNAL_SERVER_ERROR)
        }

        DomainError::Internal { .. } => {
            ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred")
                .to_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// 400 with one detail entry per invalid field
pub fn handle_validation_error(errors: ValidationErrors) -> HttpResponse {
    let mut response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Request validation failed");
    for (field, field_errors) in errors.field_errors() {
        let codes: Vec<String> = field_errors.iter().map(|e| e.code.to_string()).collect();
        response = response.add_detail(field.to_string(), codes);
    }
    response.to_response(StatusCode::BAD_REQUEST)
}

//! Bearer authentication middleware for protecting API endpoints.
//!
//! Runs the authorization gate registered as `web::Data<dyn RequestAuthorizer>`
//! against the route's access policy and injects the resulting session into
//! the request. Every rejection gets the same 401 body.

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    ops::Deref,
    rc::Rc,
    task::{Context, Poll},
};

use ac_core::domain::entities::Role;
use ac_core::services::{AccessPolicy, RequestAuthorizer, SessionContext};

use crate::handlers::unauthorized_response;

/// Session injected into requests that passed the gate
#[derive(Debug, Clone)]
pub struct AuthContext(pub SessionContext);

impl Deref for AuthContext {
    type Target = SessionContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Bearer authentication middleware factory
pub struct JwtAuth {
    policy: Rc<AccessPolicy>,
}

impl JwtAuth {
    /// Any live access token
    pub fn new() -> Self {
        Self::with_policy(AccessPolicy::any())
    }

    /// Only the listed roles
    pub fn roles(roles: &[Role]) -> Self {
        Self::with_policy(AccessPolicy::roles(roles))
    }

    pub fn with_policy(policy: AccessPolicy) -> Self {
        Self {
            policy: Rc::new(policy),
        }
    }
}

impl Default for JwtAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            policy: Rc::clone(&self.policy),
        }))
    }
}

/// Bearer authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    policy: Rc<AccessPolicy>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let policy = Rc::clone(&self.policy);

        Box::pin(async move {
            let authorizer = match req.app_data::<web::Data<dyn RequestAuthorizer>>() {
                Some(authorizer) => authorizer.clone(),
                None => {
                    tracing::error!("No request authorizer registered");
                    return Err(rejection());
                }
            };

            let header = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);

            // The gate logs the specific failure kind
            let session = match authorizer.authorize(header.as_deref(), &policy).await {
                Ok(session) => session,
                Err(_) => return Err(rejection()),
            };

            req.extensions_mut().insert(AuthContext(session));
            service.call(req).await
        })
    }
}

fn rejection() -> Error {
    InternalError::from_response("Unauthorized", unauthorized_response()).into()
}

/// Extractor for the authenticated session
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(rejection);

        ready(result)
    }
}

/// Raw `Authorization` header value, for handlers that run the token
/// operations themselves
pub fn authorization_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;

    #[test]
    fn test_authorization_header() {
        let req = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer test_token_123"))
            .to_http_request();
        assert_eq!(authorization_header(&req), Some("Bearer test_token_123"));

        let req_no_header = actix_test::TestRequest::default().to_http_request();
        assert_eq!(authorization_header(&req_no_header), None);
    }
}

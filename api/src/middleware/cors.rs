//! CORS middleware configuration for cross-origin requests.
//!
//! Development is permissive. Production only admits the origins listed in
//! `CorsConfig::allowed_origins`.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use ac_shared::config::{CorsConfig, Environment};

/// Creates a CORS middleware instance configured for the given environment.
pub fn create_cors(environment: Environment, config: &CorsConfig) -> Cors {
    if environment.is_production() {
        create_production_cors(config)
    } else {
        create_development_cors(config)
    }
}

fn create_development_cors(config: &CorsConfig) -> Cors {
    tracing::debug!("Configuring CORS for development environment");

    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(config.max_age)
        .supports_credentials()
}

fn create_production_cors(config: &CorsConfig) -> Cors {
    tracing::info!(origins = config.allowed_origins.len(), "Configuring CORS for production environment");

    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(config.max_age);

    for origin in &config.allowed_origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    #[actix_web::test]
    async fn test_production_cors_only_admits_listed_origins() {
        let config = CorsConfig {
            allowed_origins: vec!["https://portal.example.com".to_string()],
            max_age: 600,
        };
        let app = test::init_service(
            App::new()
                .wrap(create_cors(Environment::Production, &config))
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let allowed = test::TestRequest::get()
            .uri("/ping")
            .insert_header((header::ORIGIN, "https://portal.example.com"))
            .to_request();
        let resp = test::call_service(&app, allowed).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://portal.example.com"
        );

        let foreign = test::TestRequest::get()
            .uri("/ping")
            .insert_header((header::ORIGIN, "https://elsewhere.example.com"))
            .to_request();
        let resp = test::try_call_service(&app, foreign).await;
        assert!(resp.map(|r| r.status() != StatusCode::OK).unwrap_or(true));
    }
}

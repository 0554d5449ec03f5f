//! CORS middleware configuration for cross-origin requests.
//!
//! The job portal front end calls the passcode endpoints from the browser.
//! With no configured origins every origin is allowed, which is the
//! development setup; production lists its origins in
//! `SERVER_ALLOWED_ORIGINS`.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use jp_shared::config::ServerConfig;

/// Preflight cache lifetime in seconds
const MAX_AGE: usize = 3600;

/// Creates a CORS middleware instance from the server configuration.
pub fn create_cors(config: &ServerConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(MAX_AGE);

    if config.allowed_origins.is_empty() {
        tracing::info!("Configuring permissive CORS (no allowed origins configured)");
        return cors.allow_any_origin();
    }

    config.allowed_origins.iter().fold(cors, |cors, origin| {
        tracing::info!("Adding allowed origin: {}", origin);
        cors.allowed_origin(origin)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    fn config() -> ServerConfig {
        ServerConfig {
            allowed_origins: vec!["https://jobs.example.com".to_string()],
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn test_configured_origin_is_allowed() {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&config()))
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/ping")
            .insert_header((header::ORIGIN, "https://jobs.example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://jobs.example.com"
        );
    }

    #[actix_web::test]
    async fn test_unlisted_origin_is_not_echoed() {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&config()))
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/ping")
            .insert_header((header::ORIGIN, "https://evil.example.net"))
            .to_request();

        if let Ok(resp) = test::try_call_service(&app, req).await {
            assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        }
    }

    #[actix_web::test]
    async fn test_any_origin_without_configuration() {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&ServerConfig::default()))
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/ping")
            .insert_header((header::ORIGIN, "http://localhost:3000"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_some());
    }
}

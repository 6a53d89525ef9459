use actix_cors::Cors;
use actix_web::http::{header, Method};

/// Builds CORS middleware from configured origins (§10). Methods and headers
/// are fixed to what the sync/webhook routes actually need — the JSON REST
/// surface this service exposes has no reason to vary them per deployment.
pub fn setup_cors(config: &crate::config::CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allowed_headers(vec![
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ])
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(3600);

    for origin in &config.allowed_origins {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Permissive CORS configuration for local development.
pub fn development_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorsConfig;

    #[test]
    fn setup_cors_with_explicit_origin_does_not_panic() {
        let config = CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        };
        let _cors = setup_cors(&config);
    }

    #[test]
    fn setup_cors_with_wildcard_does_not_panic() {
        let config = CorsConfig {
            allowed_origins: vec!["*".to_string()],
        };
        let _cors = setup_cors(&config);
    }

    #[test]
    fn development_cors_does_not_panic() {
        let _cors = development_cors();
    }
}

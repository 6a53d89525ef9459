use actix_web::{web, HttpResponse, Scope};
use tracing::info;

use crate::handlers::{
    health::{detailed_health_check, health_check, liveness_check, readiness_check},
    sync::{get_process_status, start_initial_sync, start_ongoing_sync},
    webhooks::receive_telephony_event,
};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_routes())
        .service(api_v1_routes())
        .route("/", web::get().to(root_handler));
}

fn health_routes() -> Scope {
    web::scope("/health")
        .route("", web::get().to(health_check))
        .route("/", web::get().to(health_check))
        .route("/detailed", web::get().to(detailed_health_check))
        .route("/ready", web::get().to(readiness_check))
        .route("/live", web::get().to(liveness_check))
}

fn api_v1_routes() -> Scope {
    web::scope("/v1")
        .service(configure_integration_routes())
        .service(configure_process_routes())
}

/// Routes scoped to a single integration: triggering sync runs and the
/// inbound telephony webhook.
fn configure_integration_routes() -> Scope {
    web::scope("/integrations/{integration_id}")
        .route("/sync/initial", web::post().to(start_initial_sync))
        .route("/sync/ongoing", web::post().to(start_ongoing_sync))
        .route("/webhooks/telephony", web::post().to(receive_telephony_event))
}

/// Process status lookups, independent of any particular integration scope.
fn configure_process_routes() -> Scope {
    web::scope("/processes").route("/{process_id}", web::get().to(get_process_status))
}

/// Root handler — returns basic service information.
async fn root_handler() -> HttpResponse {
    info!("root endpoint accessed");

    HttpResponse::Ok().json(serde_json::json!({
        "service": "sync-api",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": {
            "health": "/health",
            "detailed_health": "/health/detailed",
            "readiness": "/health/ready",
            "liveness": "/health/live",
            "start_initial_sync": "/v1/integrations/{id}/sync/initial",
            "start_ongoing_sync": "/v1/integrations/{id}/sync/ongoing",
            "process_status": "/v1/processes/{id}",
            "telephony_webhook": "/v1/integrations/{id}/webhooks/telephony"
        },
        "timestamp": chrono::Utc::now()
    }))
}

/// Development-only diagnostic routes.
#[cfg(debug_assertions)]
pub fn configure_dev_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dev")
            .route("/ping", web::get().to(dev_ping_handler))
            .route("/echo", web::post().to(dev_echo_handler)),
    );
}

#[cfg(debug_assertions)]
async fn dev_ping_handler() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "pong",
        "timestamp": chrono::Utc::now()
    }))
}

#[cfg(debug_assertions)]
async fn dev_echo_handler(body: web::Json<serde_json::Value>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "echo": body.into_inner(),
        "timestamp": chrono::Utc::now()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_root_handler() {
        let app = test::init_service(App::new().route("/", web::get().to(root_handler))).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["service"], "sync-api");
        assert_eq!(body["api_version"], "v1");
    }

    #[cfg(debug_assertions)]
    #[actix_web::test]
    async fn test_dev_ping_handler() {
        let app = test::init_service(App::new().route("/ping", web::get().to(dev_ping_handler))).await;

        let req = test::TestRequest::get().uri("/ping").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "pong");
    }
}

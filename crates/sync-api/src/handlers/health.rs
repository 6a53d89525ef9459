//! Health endpoints backing this service's liveness/readiness probes.
//!
//! `/health` and `/health/live` answer without touching a collaborator, for
//! load balancers that just want "is the process up". `/health/detailed`
//! and `/health/ready` delegate to [`AppState::health_check`], which pings
//! the database, checks the SQS queue is configured, and checks the
//! telephony client has credentials — the three external dependencies this
//! service actually has (§10).

use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::middleware::error_handler::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub uptime: i64,
    pub checks: Vec<HealthCheckItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckItem {
    pub name: String,
    pub status: String,
    pub message: String,
    pub last_checked: chrono::DateTime<chrono::Utc>,
}

/// GET /health — always returns immediately, no dependency checks.
pub async fn health_check() -> Result<HttpResponse, ApiError> {
    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// GET /health/detailed — database, queue, and telephony client checks.
pub async fn detailed_health_check(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let health_result = data.health_check().await;

    info!(healthy = health_result.healthy, "detailed health check");

    let response = DetailedHealthResponse {
        status: if health_result.healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: chrono::Utc::now(),
        version: health_result.version,
        uptime: health_result.uptime,
        checks: health_result
            .checks
            .into_iter()
            .map(|check| HealthCheckItem {
                name: check.name,
                status: match check.status {
                    crate::state::HealthStatus::Healthy => "healthy".to_string(),
                    crate::state::HealthStatus::Unhealthy => "unhealthy".to_string(),
                    crate::state::HealthStatus::Degraded => "degraded".to_string(),
                },
                message: check.message,
                last_checked: check.last_checked,
            })
            .collect(),
    };

    let status_code = if health_result.healthy {
        actix_web::http::StatusCode::OK
    } else {
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE
    };

    Ok(HttpResponse::build(status_code).json(response))
}

/// GET /health/ready — database and queue must be reachable to serve traffic.
/// A degraded telephony check doesn't block readiness; webhook setup can
/// retry, but an unreachable database blocks every sync operation.
pub async fn readiness_check(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let health_result = data.health_check().await;

    if health_result.healthy {
        let response = HealthResponse {
            status: "ready".to_string(),
            timestamp: chrono::Utc::now(),
        };
        Ok(HttpResponse::Ok().json(response))
    } else {
        let response = HealthResponse {
            status: "not_ready".to_string(),
            timestamp: chrono::Utc::now(),
        };
        Ok(HttpResponse::ServiceUnavailable().json(response))
    }
}

/// GET /health/live — process is up and answering requests.
pub async fn liveness_check() -> Result<HttpResponse, ApiError> {
    let response = HealthResponse {
        status: "alive".to_string(),
        timestamp: chrono::Utc::now(),
    };

    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new().route("/health", web::get().to(health_check))
        ).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body: HealthResponse = test::read_body_json(resp).await;
        assert_eq!(body.status, "healthy");
    }

    #[actix_web::test]
    async fn test_liveness_check() {
        let app = test::init_service(
            App::new().route("/health/live", web::get().to(liveness_check))
        ).await;

        let req = test::TestRequest::get().uri("/health/live").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body: HealthResponse = test::read_body_json(resp).await;
        assert_eq!(body.status, "alive");
    }

    #[test]
    fn test_detailed_health_response_serialization() {
        let response = DetailedHealthResponse {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now(),
            version: "1.0.0".to_string(),
            uptime: 3600,
            checks: vec![
                HealthCheckItem {
                    name: "database".to_string(),
                    status: "healthy".to_string(),
                    message: "connected (2ms round trip)".to_string(),
                    last_checked: chrono::Utc::now(),
                },
                HealthCheckItem {
                    name: "telephony".to_string(),
                    status: "degraded".to_string(),
                    message: "telephony client has no API key configured".to_string(),
                    last_checked: chrono::Utc::now(),
                },
            ],
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("database"));
        assert!(json.contains("telephony"));
    }
}

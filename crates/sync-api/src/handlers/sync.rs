//! Triggers a sync run and reports on a Process's state (§4.3, §4.7).

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sync_core::entities::EntityId;
use sync_core::sync::orchestrator;

use crate::middleware::error_handler::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartSyncRequest {
    pub user_id: Uuid,
    pub person_object_types: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StartSyncResponse {
    pub process_ids: Vec<Uuid>,
}

/// `POST /v1/integrations/{id}/sync/initial`
pub async fn start_initial_sync(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<StartSyncRequest>,
) -> Result<HttpResponse, ApiError> {
    let integration_id = EntityId::from(path.into_inner());
    let user_id = EntityId::from(body.user_id);
    let ctx = data.sync_context(integration_id).await?;

    let process_ids =
        orchestrator::start_initial_sync(&ctx, integration_id, user_id, &body.person_object_types)
            .await?;

    Ok(HttpResponse::Accepted().json(StartSyncResponse {
        process_ids: process_ids.into_iter().map(Uuid::from).collect(),
    }))
}

/// `POST /v1/integrations/{id}/sync/ongoing`
pub async fn start_ongoing_sync(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<StartSyncRequest>,
) -> Result<HttpResponse, ApiError> {
    let integration_id = EntityId::from(path.into_inner());
    let user_id = EntityId::from(body.user_id);
    let ctx = data.sync_context(integration_id).await?;

    let process_ids =
        orchestrator::start_ongoing_sync(&ctx, integration_id, user_id, &body.person_object_types)
            .await?;

    Ok(HttpResponse::Accepted().json(StartSyncResponse {
        process_ids: process_ids.into_iter().map(Uuid::from).collect(),
    }))
}

#[derive(Debug, Serialize)]
pub struct ProcessStatusResponse {
    pub id: Uuid,
    pub integration_id: Uuid,
    pub state: String,
    pub total_records: u64,
    pub total_synced: u64,
    pub total_failed: u64,
    pub error_count: usize,
}

/// `GET /v1/processes/{id}`
pub async fn get_process_status(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let process_id = EntityId::from(path.into_inner());
    let process = data.process_store.get_by_id(process_id).await?;

    Ok(HttpResponse::Ok().json(ProcessStatusResponse {
        id: process.id.into(),
        integration_id: process.integration_id.into(),
        state: format!("{:?}", process.state),
        total_records: process.context.total_records,
        total_synced: process.aggregate_data.total_synced,
        total_failed: process.aggregate_data.total_failed,
        error_count: process.aggregate_data.errors.len(),
    }))
}

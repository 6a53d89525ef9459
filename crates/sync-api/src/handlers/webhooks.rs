//! Inbound telephony events (§4.1): the downstream platform calls back
//! here for delivered SMS and completed calls; each event is enqueued as
//! a `LOG_SMS`/`LOG_CALL` message rather than handled inline, so a slow
//! CRM write never blocks the webhook response.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use sync_core::entities::{EntityId, QueueMessage};
use sync_core::queue::OutboundMessage;

use crate::middleware::error_handler::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TelephonyEvent {
    Sms {
        phone_number: String,
        body: String,
        occurred_at: chrono::DateTime<chrono::Utc>,
    },
    Call {
        phone_number: String,
        duration_seconds: u32,
        occurred_at: chrono::DateTime<chrono::Utc>,
    },
}

/// `POST /v1/integrations/{id}/webhooks/telephony`
pub async fn receive_telephony_event(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<TelephonyEvent>,
) -> Result<HttpResponse, ApiError> {
    let integration_id = EntityId::from(path.into_inner());

    let message = match body.into_inner() {
        TelephonyEvent::Sms {
            phone_number,
            body,
            occurred_at,
        } => QueueMessage::LogSms {
            integration_id,
            phone_number,
            body,
            occurred_at: occurred_at.into(),
        },
        TelephonyEvent::Call {
            phone_number,
            duration_seconds,
            occurred_at,
        } => QueueMessage::LogCall {
            integration_id,
            phone_number,
            duration_seconds,
            occurred_at: occurred_at.into(),
        },
    };

    data.queue
        .send(&data.config.queue.queue_url, OutboundMessage::new(message))
        .await?;

    Ok(HttpResponse::Accepted().finish())
}

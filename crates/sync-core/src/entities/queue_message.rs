//! The queue message union driving the fan-out pipeline. Every variant is
//! self-contained: handlers re-resolve the integration and adapter by id
//! rather than carrying an owning reference (§9 "cyclic concerns").

use serde::{Deserialize, Serialize};

use super::common::{EntityId, Timestamp};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueMessage {
    FetchPersonPage {
        process_id: EntityId,
        person_object_type: String,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        cursor: Option<String>,
        limit: u32,
        #[serde(default)]
        modified_since: Option<Timestamp>,
        #[serde(default)]
        sort_desc: bool,
    },
    ProcessPersonBatch {
        process_id: EntityId,
        crm_person_ids: Vec<String>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        total_in_page: Option<u32>,
        #[serde(default)]
        is_webhook: bool,
    },
    CompleteSync {
        process_id: EntityId,
    },
    PostCreateSetup {
        integration_id: EntityId,
    },
    LogSms {
        integration_id: EntityId,
        phone_number: String,
        body: String,
        occurred_at: Timestamp,
    },
    LogCall {
        integration_id: EntityId,
        phone_number: String,
        duration_seconds: u32,
        occurred_at: Timestamp,
    },
}

impl QueueMessage {
    /// A short label used in log spans and test assertions.
    pub fn event_name(&self) -> &'static str {
        match self {
            QueueMessage::FetchPersonPage { .. } => "FETCH_PERSON_PAGE",
            QueueMessage::ProcessPersonBatch { .. } => "PROCESS_PERSON_BATCH",
            QueueMessage::CompleteSync { .. } => "COMPLETE_SYNC",
            QueueMessage::PostCreateSetup { .. } => "POST_CREATE_SETUP",
            QueueMessage::LogSms { .. } => "LOG_SMS",
            QueueMessage::LogCall { .. } => "LOG_CALL",
        }
    }
}

//! Contact identity mapping between an upstream CRM contact and a
//! downstream telephony contact, keyed by phone number.

use serde::{Deserialize, Serialize};

use super::common::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMethod {
    Bulk,
    Upsert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingAction {
    Created,
    Updated,
}

/// Exactly one mapping exists per `phone_number`; upserts are last-writer-wins
/// on `last_synced_at`, which makes replayed batches produce no duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMapping {
    pub external_id: String,
    pub quo_contact_id: String,
    pub phone_number: String,
    pub entity_type: String,
    pub last_synced_at: Timestamp,
    pub sync_method: SyncMethod,
    pub action: MappingAction,
}

impl ContactMapping {
    pub fn new(
        external_id: impl Into<String>,
        quo_contact_id: impl Into<String>,
        phone_number: impl Into<String>,
        entity_type: impl Into<String>,
        sync_method: SyncMethod,
        action: MappingAction,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            quo_contact_id: quo_contact_id.into(),
            phone_number: phone_number.into(),
            entity_type: entity_type.into(),
            last_synced_at: Timestamp::now(),
            sync_method,
            action,
        }
    }
}

//! The upstream CRM adapter contract (§6, §9 "polymorphic adapters ->
//! capability interface"). Per-vendor adapters are out of scope; this
//! module only defines the five required operations (plus two optional
//! ones composed with a default fan-out) that any adapter must expose.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::Timestamp;
use crate::errors::SyncResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaginationType {
    PageBased,
    CursorBased,
}

/// Immutable per-adapter configuration, captured as a plain value at
/// construction (§9 "global static configuration -> value objects").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub pagination_type: PaginationType,
    pub supports_total: bool,
    pub return_full_records: bool,
    pub reverse_chronological: bool,
    pub initial_batch_size: u32,
    pub ongoing_batch_size: u32,
    pub poll_interval_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonObjectType {
    pub crm_object_name: String,
    pub quo_contact_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub max_workers: u32,
    pub provisioned: bool,
    pub max_concurrency: u32,
    pub batch_size: u32,
    pub timeout_seconds: u32,
}

/// A single page returned by `fetch_person_page`.
#[derive(Debug, Clone)]
pub struct PersonPage {
    pub data: Vec<PersonRecord>,
    /// Known only for PAGE_BASED adapters with `supports_total = true`.
    pub total: Option<u64>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// An upstream contact/lead/client record. The adapter's payload shape is
/// vendor-specific, so the core only needs a stable id plus an opaque blob
/// for the adapter's own transform step to interpret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct FetchPageParams {
    pub object_type: String,
    pub page: Option<u32>,
    pub cursor: Option<String>,
    pub limit: u32,
    pub modified_since: Option<Timestamp>,
    pub sort_desc: bool,
}

/// A contact translated into the shape the telephony platform expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoContactInput {
    pub external_id: String,
    pub entity_type: String,
    pub display_name: String,
    pub phone_number: Option<String>,
    pub fields: serde_json::Value,
}

/// Five required operations and two optional ones, per §9. Adapters may
/// override `fetch_persons_by_ids`/`transform_persons_to_quo` for batch
/// efficiency; the defaults compose the five required ops by fan-out.
#[async_trait]
pub trait CrmAdapter: Send + Sync {
    fn sync_config(&self) -> SyncConfig;
    fn person_object_types(&self) -> Vec<PersonObjectType>;
    fn queue_config(&self) -> QueueConfig;

    async fn fetch_person_page(&self, params: FetchPageParams) -> SyncResult<PersonPage>;

    async fn transform_person_to_quo(&self, person: &PersonRecord) -> SyncResult<QuoContactInput>;

    /// Optional: adapters with a batch-fetch endpoint override this for
    /// efficiency. The default fans individual ids out through
    /// `fetch_person_by_id`, which adapters without a batch endpoint
    /// implement instead.
    async fn fetch_persons_by_ids(&self, ids: &[String]) -> SyncResult<Vec<PersonRecord>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.push(self.fetch_person_by_id(id).await?);
        }
        Ok(out)
    }

    /// Single-record lookup. Only required when `fetch_persons_by_ids` is
    /// left at its default fan-out implementation.
    async fn fetch_person_by_id(&self, id: &str) -> SyncResult<PersonRecord> {
        let _ = id;
        Err(crate::errors::SyncError::internal(
            "adapter implements neither fetch_person_by_id nor fetch_persons_by_ids",
        ))
    }

    /// Optional: default implementation maps `transform_person_to_quo` over
    /// each record; adapters may override for batch transform optimization.
    async fn transform_persons_to_quo(
        &self,
        persons: &[PersonRecord],
    ) -> SyncResult<Vec<QuoContactInput>> {
        let mut out = Vec::with_capacity(persons.len());
        for person in persons {
            out.push(self.transform_person_to_quo(person).await?);
        }
        Ok(out)
    }

    async fn log_sms_to_activity(
        &self,
        external_id: &str,
        phone_number: &str,
        body: &str,
        occurred_at: Timestamp,
    ) -> SyncResult<()>;

    async fn log_call_to_activity(
        &self,
        external_id: &str,
        phone_number: &str,
        duration_seconds: u32,
        occurred_at: Timestamp,
    ) -> SyncResult<()>;
}

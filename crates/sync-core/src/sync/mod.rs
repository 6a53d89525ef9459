//! The sync orchestration pipeline: seeding a run (`orchestrator`), walking
//! pages (`pagination`, `page_based`, `cursor_based`), replicating contacts
//! downstream (`bulk_upsert`), keeping webhook subscriptions in sync
//! (`webhook_manager`), and the integration lifecycle hook that kicks the
//! first sync off (`lifecycle`).
//!
//! None of these modules hold a reference to "the integration" or "the
//! adapter" across an await point beyond a single call — every queue message
//! carries the ids needed to re-resolve state, per §9's guidance against an
//! owning graph between Process and adapter.

pub mod activity;
pub mod bulk_upsert;
pub mod cursor_based;
pub mod lifecycle;
pub mod orchestrator;
pub mod page_based;
pub mod pagination;
pub mod webhook_manager;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use crate::crm::CrmAdapter;
use crate::queue::DurableQueue;
use crate::store::{IntegrationConfigStore, MappingStore, ProcessStore};
use crate::telephony::TelephonyClient;

/// Bundles the collaborators every pipeline handler needs. Built once per
/// integration by the worker that dequeues a message (the adapter and
/// telephony client are resolved per-integration; the stores and queue are
/// shared across integrations), then passed by reference into whichever
/// handler the dequeued `QueueMessage` routes to.
#[derive(Clone)]
pub struct SyncContext {
    pub queue: Arc<dyn DurableQueue>,
    pub queue_url: String,
    pub process_store: Arc<dyn ProcessStore>,
    pub mapping_store: Arc<dyn MappingStore>,
    pub config_store: Arc<dyn IntegrationConfigStore>,
    pub crm: Arc<dyn CrmAdapter>,
    pub telephony: Arc<dyn TelephonyClient>,
}

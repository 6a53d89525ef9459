//! Resolves a `CrmAdapter` by integration id (§9 "polymorphic adapters").
//!
//! Per-vendor adapters are explicitly out of scope for this engine — their
//! API-specific code is uninteresting glue (§1). What belongs here is only
//! the seam: a registry a real deployment plugs a vendor adapter crate into.
//! [`ReferenceCrmAdapter`] is a trivial stand-in used for local development
//! and the test/demo deployment profile; it fetches nothing and logs
//! nothing to an activity timeline, which is deliberate — wiring a real CRM
//! means registering that vendor's adapter here instead.

use std::sync::Arc;

use async_trait::async_trait;

use sync_core::crm::{
    CrmAdapter, FetchPageParams, PaginationType, PersonObjectType, PersonPage, PersonRecord,
    QueueConfig, QuoContactInput, SyncConfig,
};
use sync_core::entities::{EntityId, Timestamp};
use sync_core::errors::SyncResult;

/// A capability interface over "the adapter for this integration"; real
/// deployments back this with a lookup keyed by vendor/tenant rather than
/// a single shared instance.
#[async_trait]
pub trait CrmAdapterRegistry: Send + Sync {
    async fn resolve(&self, integration_id: EntityId) -> SyncResult<Arc<dyn CrmAdapter>>;
}

/// Every integration resolves to the same adapter instance. Correct for a
/// single-tenant deployment with one vendor wired in; a multi-tenant
/// deployment replaces this with a registry keyed by integration id.
pub struct StaticAdapterRegistry {
    adapter: Arc<dyn CrmAdapter>,
}

impl StaticAdapterRegistry {
    pub fn new(adapter: Arc<dyn CrmAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl CrmAdapterRegistry for StaticAdapterRegistry {
    async fn resolve(&self, _integration_id: EntityId) -> SyncResult<Arc<dyn CrmAdapter>> {
        Ok(self.adapter.clone())
    }
}

/// Placeholder `CrmAdapter` with no upstream to call. Returns empty pages
/// and declines every activity-log write; sufficient to exercise the queue
/// and store plumbing without a vendor integration present.
pub struct ReferenceCrmAdapter {
    pub person_object_types: Vec<PersonObjectType>,
}

impl Default for ReferenceCrmAdapter {
    fn default() -> Self {
        Self {
            person_object_types: vec![PersonObjectType {
                crm_object_name: "Contact".to_string(),
                quo_contact_type: "contact".to_string(),
            }],
        }
    }
}

#[async_trait]
impl CrmAdapter for ReferenceCrmAdapter {
    fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            pagination_type: PaginationType::PageBased,
            supports_total: true,
            return_full_records: true,
            reverse_chronological: false,
            initial_batch_size: 100,
            ongoing_batch_size: 50,
            poll_interval_minutes: 15,
        }
    }

    fn person_object_types(&self) -> Vec<PersonObjectType> {
        self.person_object_types.clone()
    }

    fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            max_workers: 4,
            provisioned: false,
            max_concurrency: 10,
            batch_size: 10,
            timeout_seconds: 600,
        }
    }

    async fn fetch_person_page(&self, _params: FetchPageParams) -> SyncResult<PersonPage> {
        Ok(PersonPage {
            data: vec![],
            total: Some(0),
            next_cursor: None,
            has_more: false,
        })
    }

    async fn transform_person_to_quo(&self, person: &PersonRecord) -> SyncResult<QuoContactInput> {
        Ok(QuoContactInput {
            external_id: person.id.clone(),
            entity_type: "Contact".to_string(),
            display_name: person.id.clone(),
            phone_number: None,
            fields: serde_json::json!({}),
        })
    }

    async fn log_sms_to_activity(
        &self,
        _external_id: &str,
        _phone_number: &str,
        _body: &str,
        _occurred_at: Timestamp,
    ) -> SyncResult<()> {
        Ok(())
    }

    async fn log_call_to_activity(
        &self,
        _external_id: &str,
        _phone_number: &str,
        _duration_seconds: u32,
        _occurred_at: Timestamp,
    ) -> SyncResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_registry_resolves_to_configured_adapter() {
        let registry = StaticAdapterRegistry::new(Arc::new(ReferenceCrmAdapter::default()));
        let adapter = registry.resolve(EntityId::new()).await.unwrap();
        assert_eq!(adapter.person_object_types().len(), 1);
    }
}

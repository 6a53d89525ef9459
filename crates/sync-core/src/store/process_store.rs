//! The Process Store contract (§4.2). Implementations must make every
//! mutation atomic and monotonic: many queue workers may update the same
//! Process concurrently (§5), so counters are additive deltas rather than
//! read-modify-write on a value the caller already holds.

use async_trait::async_trait;

use crate::entities::process::{NewProcess, Process, ProcessState};
use crate::entities::EntityId;
use crate::errors::SyncResult;

/// An additive update to a Process's metrics. `success`/`errors` are added
/// to the running totals; `error_details` are appended (and the store
/// truncates to the last 100, per §3).
#[derive(Debug, Clone, Default)]
pub struct MetricsDelta {
    pub processed: u64,
    pub success: u64,
    pub errors: u64,
    pub error_details: Vec<(String, Option<String>)>,
}

#[async_trait]
pub trait ProcessStore: Send + Sync {
    async fn create(&self, data: NewProcess) -> SyncResult<Process>;

    async fn get_by_id(&self, id: EntityId) -> SyncResult<Process>;

    /// Rejects the transition (without mutating the record) if it is
    /// illegal per the state machine; a transition to the state the
    /// process is already in is a no-op success, tolerating redelivery.
    async fn update_state(&self, id: EntityId, new_state: ProcessState) -> SyncResult<Process>;

    /// Idempotent: always sets `total_records`/derived page count to the
    /// freshly fetched total, rather than adding to it, so redelivery of
    /// the page-0 fetch is safe (§5 "Timeouts").
    async fn update_total(
        &self,
        id: EntityId,
        total: u64,
        total_pages: u32,
    ) -> SyncResult<Process>;

    async fn update_metrics(&self, id: EntityId, delta: MetricsDelta) -> SyncResult<Process>;

    /// Merges `patch` into the free-form `metadata` object (shallow merge
    /// at the top level — cursor pagination only ever writes its own three
    /// keys, so deep merge isn't needed here as it is for IntegrationConfig).
    async fn update_metadata(&self, id: EntityId, patch: serde_json::Value) -> SyncResult<Process>;

    async fn get_metadata(&self, id: EntityId) -> SyncResult<serde_json::Value>;

    /// Moves the process to `Completed` and stamps `duration`/`recordsPerSecond`.
    async fn complete_process(&self, id: EntityId) -> SyncResult<Process>;

    /// The most recently completed process for this (integration, object type)
    /// pair, used by `startOngoingSync` to compute the `modifiedSince`
    /// watermark. `None` if this object type has never completed a sync.
    async fn find_latest_completed(
        &self,
        integration_id: EntityId,
        person_object_type: &str,
    ) -> SyncResult<Option<Process>>;

    /// Appends `message` to `errors`, increments `total_failed`. Transitions
    /// to `Failed` only when `fatal` is true; otherwise the state is left
    /// unchanged so the sync can continue on subsequent pages (§4.2).
    async fn handle_error(
        &self,
        id: EntityId,
        message: String,
        external_id: Option<String>,
        fatal: bool,
    ) -> SyncResult<Process>;
}


#[cfg(test)]
mod tests {
    use super::in_memory::InMemoryProcessStore;
    use super::*;
    use crate::entities::process::SyncType;

    fn new_process_data() -> NewProcess {
        NewProcess {
            integration_id: EntityId::new(),
            user_id: EntityId::new(),
            name: "contacts".into(),
            sync_type: SyncType::Initial,
            person_object_type: "Contact".into(),
            page_size: 100,
        }
    }

    #[tokio::test]
    async fn update_metrics_is_additive_across_deliveries() {
        let store = InMemoryProcessStore::new();
        let process = store.create(new_process_data()).await.unwrap();

        store
            .update_metrics(
                process.id,
                MetricsDelta {
                    processed: 100,
                    success: 98,
                    errors: 2,
                    error_details: vec![("bad phone".into(), Some("ext-1".into()))],
                },
            )
            .await
            .unwrap();
        let after_first = store.update_metrics(process.id, MetricsDelta::default()).await.unwrap();
        assert_eq!(after_first.aggregate_data.total_synced, 98);

        let after_second = store
            .update_metrics(
                process.id,
                MetricsDelta {
                    processed: 50,
                    success: 50,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(after_second.aggregate_data.total_synced, 148);
        assert_eq!(after_second.context.processed_records, 150);
    }

    #[tokio::test]
    async fn handle_error_is_non_fatal_by_default() {
        let store = InMemoryProcessStore::new();
        let process = store.create(new_process_data()).await.unwrap();
        store
            .update_state(process.id, ProcessState::FetchingTotal)
            .await
            .unwrap();
        let after = store
            .handle_error(process.id, "timeout".into(), None, false)
            .await
            .unwrap();
        assert_eq!(after.state, ProcessState::FetchingTotal);
        assert_eq!(after.aggregate_data.total_failed, 1);
    }

    #[tokio::test]
    async fn handle_error_fatal_moves_to_failed() {
        let store = InMemoryProcessStore::new();
        let process = store.create(new_process_data()).await.unwrap();
        let after = store
            .handle_error(process.id, "bad credentials".into(), None, true)
            .await
            .unwrap();
        assert_eq!(after.state, ProcessState::Failed);
    }

    #[tokio::test]
    async fn complete_process_stamps_duration() {
        let store = InMemoryProcessStore::new();
        let process = store.create(new_process_data()).await.unwrap();
        store
            .update_state(process.id, ProcessState::FetchingTotal)
            .await
            .unwrap();
        store
            .update_state(process.id, ProcessState::QueuingPages)
            .await
            .unwrap();
        store
            .update_state(process.id, ProcessState::ProcessingBatches)
            .await
            .unwrap();
        let completed = store.complete_process(process.id).await.unwrap();
        assert_eq!(completed.state, ProcessState::Completed);
        assert!(completed.aggregate_data.duration_ms.is_some());
    }
}

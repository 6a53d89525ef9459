//! Shared preamble for `FETCH_PERSON_PAGE`/`COMPLETE_SYNC` handling: select a
//! strategy from the adapter's static config (§4.4), and the `COMPLETE_SYNC`
//! handler both strategies funnel into.

use super::{cursor_based, page_based, SyncContext};
use crate::crm::PaginationType;
use crate::entities::{EntityId, QueueMessage, Timestamp};
use crate::errors::SyncResult;
use crate::queue::OutboundMessage;

/// Delay before a `COMPLETE_SYNC` that arrived too early (some fanned-out
/// page batches still in flight) re-enqueues itself, per §5 "Ordering".
pub const COMPLETE_SYNC_RETRY_DELAY_SECONDS: u32 = 5;

pub async fn handle_fetch_person_page(
    ctx: &SyncContext,
    process_id: EntityId,
    person_object_type: String,
    page: Option<u32>,
    cursor: Option<String>,
    limit: u32,
    modified_since: Option<Timestamp>,
    sort_desc: bool,
) -> SyncResult<()> {
    match ctx.crm.sync_config().pagination_type {
        PaginationType::PageBased => {
            let page = page.unwrap_or(0);
            page_based::handle_fetch_person_page(
                ctx,
                process_id,
                person_object_type,
                page,
                limit,
                modified_since,
                sort_desc,
            )
            .await
        }
        PaginationType::CursorBased => {
            cursor_based::handle_fetch_person_page(
                ctx,
                process_id,
                person_object_type,
                cursor,
                limit,
                modified_since,
                sort_desc,
            )
            .await
        }
    }
}

/// `COMPLETE_SYNC`: marks the process done, unless some fanned-out batches
/// are still outstanding (page-based, known total), in which case it
/// re-enqueues itself with a short delay rather than stamping completion
/// prematurely.
pub async fn handle_complete_sync(ctx: &SyncContext, process_id: EntityId) -> SyncResult<()> {
    let process = ctx.process_store.get_by_id(process_id).await?;
    if process.state.is_terminal() {
        return Ok(());
    }

    let total = process.context.total_records;
    let accounted_for = process.aggregate_data.total_synced + process.aggregate_data.total_failed;
    if total > 0 && accounted_for < total {
        ctx.queue
            .send(
                &ctx.queue_url,
                OutboundMessage::with_delay(
                    QueueMessage::CompleteSync { process_id },
                    COMPLETE_SYNC_RETRY_DELAY_SECONDS,
                ),
            )
            .await?;
        return Ok(());
    }

    ctx.process_store.complete_process(process_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entities::process::{NewProcess, ProcessState, SyncType};
    use crate::queue::InMemoryQueue;
    use crate::store::process_store::in_memory::InMemoryProcessStore;
    use crate::store::{MetricsDelta, ProcessStore};

    async fn ctx_with_process(total: u64) -> (Arc<InMemoryProcessStore>, Arc<InMemoryQueue>, EntityId) {
        let store = Arc::new(InMemoryProcessStore::new());
        let queue = Arc::new(InMemoryQueue::new());
        let process = store
            .create(NewProcess {
                integration_id: EntityId::new(),
                user_id: EntityId::new(),
                name: "contacts".into(),
                sync_type: SyncType::Initial,
                person_object_type: "Contact".into(),
                page_size: 100,
            })
            .await
            .unwrap();
        store
            .update_state(process.id, ProcessState::FetchingTotal)
            .await
            .unwrap();
        store.update_total(process.id, total, 1).await.unwrap();
        store
            .update_state(process.id, ProcessState::QueuingPages)
            .await
            .unwrap();
        store
            .update_state(process.id, ProcessState::ProcessingBatches)
            .await
            .unwrap();
        (store, queue, process.id)
    }

    fn stub_sync_ctx(
        process_store: Arc<InMemoryProcessStore>,
        queue: Arc<InMemoryQueue>,
    ) -> SyncContext {
        use crate::store::config_store::in_memory::InMemoryConfigStore;
        use crate::store::mapping_store::in_memory::InMemoryMappingStore;

        SyncContext {
            queue,
            queue_url: "https://queue.example/sync".into(),
            process_store,
            mapping_store: Arc::new(InMemoryMappingStore::new()),
            config_store: Arc::new(InMemoryConfigStore::new()),
            crm: Arc::new(super::super::test_support::noop_adapter()),
            telephony: Arc::new(super::super::test_support::noop_telephony()),
        }
    }

    #[tokio::test]
    async fn complete_sync_with_outstanding_work_reenqueues_with_delay() {
        let (store, queue, process_id) = ctx_with_process(100).await;
        store
            .update_metrics(
                process_id,
                MetricsDelta {
                    processed: 50,
                    success: 50,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let ctx = stub_sync_ctx(store.clone(), queue.clone());
        handle_complete_sync(&ctx, process_id).await.unwrap();

        let process = store.get_by_id(process_id).await.unwrap();
        assert_ne!(process.state, ProcessState::Completed);
        assert_eq!(queue.sent_count(), 1);
    }

    #[tokio::test]
    async fn complete_sync_with_all_work_accounted_for_completes() {
        let (store, queue, process_id) = ctx_with_process(100).await;
        store
            .update_metrics(
                process_id,
                MetricsDelta {
                    processed: 100,
                    success: 98,
                    errors: 2,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let ctx = stub_sync_ctx(store.clone(), queue.clone());
        handle_complete_sync(&ctx, process_id).await.unwrap();

        let process = store.get_by_id(process_id).await.unwrap();
        assert_eq!(process.state, ProcessState::Completed);
        assert_eq!(queue.sent_count(), 0);
    }

    #[tokio::test]
    async fn complete_sync_on_already_terminal_process_is_a_no_op() {
        let (store, queue, process_id) = ctx_with_process(0).await;
        store.complete_process(process_id).await.unwrap();
        let ctx = stub_sync_ctx(store.clone(), queue.clone());
        handle_complete_sync(&ctx, process_id).await.unwrap();
        assert_eq!(queue.sent_count(), 0);
    }
}

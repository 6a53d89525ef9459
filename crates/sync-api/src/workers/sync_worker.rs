//! The single background worker loop (§4.1, §5): long-polls the durable
//! queue, dispatches each message to its sync-core handler, and deletes
//! the message only after the handler returns `Ok` — a handler error is
//! left for the queue's own redelivery policy to retry.

use std::sync::Arc;
use std::time::Duration;

use sync_core::entities::QueueMessage;
use sync_core::sync::{activity, lifecycle, page_based, pagination};

use crate::services::SqsDurableQueue;
use crate::state::AppState;

pub struct SyncWorker {
    state: AppState,
    queue: Arc<SqsDurableQueue>,
}

impl SyncWorker {
    pub fn new(state: AppState, queue: Arc<SqsDurableQueue>) -> Self {
        Self { state, queue }
    }

    /// Runs until `shutdown` resolves. Each iteration long-polls for up to
    /// `QUEUE_MAX_CONCURRENCY` messages and dispatches them concurrently.
    pub async fn run(self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        let queue_url = self.state.config.queue.queue_url.clone();
        let poll_interval = Duration::from_millis(self.state.config.queue.poll_interval_ms);
        let max_messages = self.state.config.queue.max_concurrency.clamp(1, 10) as i32;

        loop {
            if shutdown.try_recv().is_ok() {
                tracing::info!("sync worker shutting down");
                return;
            }

            let received = match self.queue.receive(&queue_url, max_messages, 5).await {
                Ok(messages) => messages,
                Err(err) => {
                    tracing::error!(error = %err, "failed to poll queue");
                    tokio::time::sleep(poll_interval).await;
                    continue;
                }
            };

            if received.is_empty() {
                tokio::time::sleep(poll_interval).await;
                continue;
            }

            let mut handles = Vec::with_capacity(received.len());
            for (receipt_handle, message) in received {
                let state = self.state.clone();
                let queue = self.queue.clone();
                let queue_url = queue_url.clone();
                handles.push(tokio::spawn(async move {
                    let event = message.event_name();
                    let span = crate::queue_span!(event, receipt_handle);
                    let _entered = span.enter();

                    match dispatch(&state, message).await {
                        Ok(()) => {
                            if let Err(err) = queue.delete(&queue_url, &receipt_handle).await {
                                tracing::error!(error = %err, "failed to delete processed message");
                            }
                        }
                        Err(err) => {
                            tracing::error!(error = %err, event, "handler failed, leaving for redelivery");
                        }
                    }
                }));
            }
            for handle in handles {
                let _ = handle.await;
            }
        }
    }
}

async fn dispatch(state: &AppState, message: QueueMessage) -> sync_core::errors::SyncResult<()> {
    match message {
        QueueMessage::FetchPersonPage {
            process_id,
            person_object_type,
            page,
            cursor,
            limit,
            modified_since,
            sort_desc,
        } => {
            let ctx = state.sync_context_for_process(process_id).await?;
            pagination::handle_fetch_person_page(
                &ctx,
                process_id,
                person_object_type,
                page,
                cursor,
                limit,
                modified_since,
                sort_desc,
            )
            .await
        }
        QueueMessage::ProcessPersonBatch {
            process_id,
            crm_person_ids,
            ..
        } => {
            let ctx = state.sync_context_for_process(process_id).await?;
            page_based::handle_process_person_batch(&ctx, process_id, crm_person_ids).await
        }
        QueueMessage::CompleteSync { process_id } => {
            let ctx = state.sync_context_for_process(process_id).await?;
            pagination::handle_complete_sync(&ctx, process_id).await
        }
        QueueMessage::PostCreateSetup { integration_id } => {
            let ctx = state.sync_context(integration_id).await?;
            let person_object_types: Vec<String> = ctx
                .crm
                .person_object_types()
                .into_iter()
                .map(|t| t.crm_object_name)
                .collect();
            // Single-tenant deployment: the integration owner is the only
            // user, so its id stands in for `user_id` here.
            lifecycle::handle_post_create_setup(
                &ctx,
                integration_id,
                &state.config.webhook_url(),
                &person_object_types,
                integration_id,
            )
            .await
            .map(|_| ())
        }
        QueueMessage::LogSms {
            integration_id,
            phone_number,
            body,
            occurred_at,
        } => {
            let ctx = state.sync_context(integration_id).await?;
            activity::handle_log_sms(&ctx, integration_id, phone_number, body, occurred_at).await
        }
        QueueMessage::LogCall {
            integration_id,
            phone_number,
            duration_seconds,
            occurred_at,
        } => {
            let ctx = state.sync_context(integration_id).await?;
            activity::handle_log_call(
                &ctx,
                integration_id,
                phone_number,
                duration_seconds,
                occurred_at,
            )
            .await
        }
    }
}

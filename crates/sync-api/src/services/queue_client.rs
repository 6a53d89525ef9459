//! SQS-backed `DurableQueue` (§4.1): the concrete cloud-queue binding the
//! core's orchestration pipeline enqueues work onto.

use async_trait::async_trait;
use aws_sdk_sqs::types::SendMessageBatchRequestEntry;
use aws_sdk_sqs::Client;

use sync_core::entities::QueueMessage;
use sync_core::errors::{SyncError, SyncResult};
use sync_core::queue::{DurableQueue, OutboundMessage};

pub struct SqsDurableQueue {
    client: Client,
}

impl SqsDurableQueue {
    pub async fn from_region(region: &str) -> Self {
        let config = aws_config::from_env()
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: Client::new(&config),
        }
    }

    /// Long-polls for up to `max_messages` deliverable messages. Returns
    /// `(receipt_handle, QueueMessage)` pairs; the worker deletes each
    /// receipt handle only after its handler returns `Ok`, so a crash
    /// mid-dispatch redelivers rather than drops (at-least-once, §4.1).
    pub async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> SyncResult<Vec<(String, QueueMessage)>> {
        let response = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_messages.clamp(1, 10))
            .wait_time_seconds(wait_time_seconds.clamp(0, 20))
            .send()
            .await
            .map_err(|e| SyncError::transient_fetch("sqs", e.to_string()))?;

        let mut out = Vec::new();
        for message in response.messages.unwrap_or_default() {
            let (Some(receipt_handle), Some(body)) = (message.receipt_handle, message.body) else {
                continue;
            };
            match serde_json::from_str::<QueueMessage>(&body) {
                Ok(parsed) => out.push((receipt_handle, parsed)),
                Err(err) => {
                    tracing::error!(error = %err, body = %body, "dropping unparseable queue message");
                }
            }
        }
        Ok(out)
    }

    pub async fn delete(&self, queue_url: &str, receipt_handle: &str) -> SyncResult<()> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| SyncError::transient_fetch("sqs", e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl DurableQueue for SqsDurableQueue {
    async fn send(&self, queue_url: &str, message: OutboundMessage) -> SyncResult<()> {
        message.validate()?;
        let body = serde_json::to_string(&message.message)?;
        let mut request = self.client.send_message().queue_url(queue_url).message_body(body);
        if let Some(delay) = message.delay_seconds {
            request = request.delay_seconds(delay as i32);
        }
        request
            .send()
            .await
            .map_err(|e| SyncError::transient_fetch("sqs", e.to_string()))?;
        Ok(())
    }

    async fn send_batch_chunk(
        &self,
        queue_url: &str,
        chunk: Vec<OutboundMessage>,
    ) -> SyncResult<()> {
        let mut entries = Vec::with_capacity(chunk.len());
        for (idx, m) in chunk.iter().enumerate() {
            let body = serde_json::to_string(&m.message)?;
            let mut entry = SendMessageBatchRequestEntry::builder()
                .id(idx.to_string())
                .message_body(body);
            if let Some(delay) = m.delay_seconds {
                entry = entry.delay_seconds(delay as i32);
            }
            entries.push(
                entry
                    .build()
                    .map_err(|e| SyncError::internal(e.to_string()))?,
            );
        }

        let response = self
            .client
            .send_message_batch()
            .queue_url(queue_url)
            .set_entries(Some(entries))
            .send()
            .await
            .map_err(|e| SyncError::transient_fetch("sqs", e.to_string()))?;

        let failed = response.failed;
        if !failed.is_empty() {
            return Err(SyncError::transient_fetch(
                "sqs",
                format!("{} messages failed in batch submission", failed.len()),
            ));
        }
        Ok(())
    }
}

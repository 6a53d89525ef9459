//! The Durable Queue Client contract (§4.1): a thin wrapper over a cloud
//! message queue, responsible for reliable at-least-once enqueue. Dequeue
//! and message routing live with the worker that owns a concrete queue
//! backend (SQS, etc.), not here — this crate only defines what callers
//! need to enqueue work.

use async_trait::async_trait;

use crate::entities::QueueMessage;
use crate::errors::SyncResult;

/// Per-message delivery delay cap enforced by the queue contract (§6).
pub const MAX_DELAY_SECONDS: u32 = 900;
/// Maximum number of messages flushed in a single batch submission (§4.1).
pub const MAX_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub message: QueueMessage,
    pub delay_seconds: Option<u32>,
}

impl OutboundMessage {
    pub fn new(message: QueueMessage) -> Self {
        Self {
            message,
            delay_seconds: None,
        }
    }

    pub fn with_delay(message: QueueMessage, delay_seconds: u32) -> Self {
        Self {
            message,
            delay_seconds: Some(delay_seconds),
        }
    }

    pub fn validate(&self) -> SyncResult<()> {
        if let Some(delay) = self.delay_seconds {
            if delay > MAX_DELAY_SECONDS {
                return Err(crate::errors::SyncError::internal(format!(
                    "delaySeconds {delay} exceeds the queue's {MAX_DELAY_SECONDS}s cap"
                )));
            }
        }
        Ok(())
    }
}

/// At-least-once delivery is guaranteed; callers must tolerate duplicates.
/// No ordering guarantee is made across messages, within or across batches.
#[async_trait]
pub trait DurableQueue: Send + Sync {
    /// Single-shot enqueue.
    async fn send(&self, queue_url: &str, message: OutboundMessage) -> SyncResult<()>;

    /// Buffers `messages` and flushes them in groups of `MAX_BATCH_SIZE`.
    /// Returns only after every batch has been accepted by the backend; on
    /// failure of any batch the error propagates without retry — the caller
    /// decides whether to retry the whole call.
    async fn batch_send(&self, queue_url: &str, messages: Vec<OutboundMessage>) -> SyncResult<()> {
        for chunk in messages.chunks(MAX_BATCH_SIZE) {
            for m in chunk {
                m.validate()?;
            }
            self.send_batch_chunk(queue_url, chunk.to_vec()).await?;
        }
        Ok(())
    }

    /// Submits a single chunk of at most `MAX_BATCH_SIZE` messages as one
    /// backend batch request. `batch_send`'s default implementation drives
    /// this; backends that expose a native batch API override this method,
    /// backends that don't can implement it as a loop over `send`.
    async fn send_batch_chunk(
        &self,
        queue_url: &str,
        chunk: Vec<OutboundMessage>,
    ) -> SyncResult<()>;
}

#[cfg(test)]
pub mod in_memory {
    use super::*;
    use std::sync::Mutex;

    /// Reference queue implementation used by orchestrator and pagination
    /// engine tests: records every enqueued message in submission order
    /// without any backend round trip.
    #[derive(Default)]
    pub struct InMemoryQueue {
        sent: Mutex<Vec<(String, OutboundMessage)>>,
    }

    impl InMemoryQueue {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent_messages(&self) -> Vec<QueueMessage> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(_, m)| m.message.clone())
                .collect()
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl DurableQueue for InMemoryQueue {
        async fn send(&self, queue_url: &str, message: OutboundMessage) -> SyncResult<()> {
            message.validate()?;
            self.sent
                .lock()
                .unwrap()
                .push((queue_url.to_string(), message));
            Ok(())
        }

        async fn send_batch_chunk(
            &self,
            queue_url: &str,
            chunk: Vec<OutboundMessage>,
        ) -> SyncResult<()> {
            let mut sent = self.sent.lock().unwrap();
            for m in chunk {
                sent.push((queue_url.to_string(), m));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::in_memory::InMemoryQueue;
    use super::*;
    use crate::entities::EntityId;

    fn msg() -> QueueMessage {
        QueueMessage::CompleteSync {
            process_id: EntityId::new(),
        }
    }

    #[tokio::test]
    async fn rejects_delay_beyond_cap() {
        let out = OutboundMessage::with_delay(msg(), 1000);
        assert!(out.validate().is_err());
    }

    #[tokio::test]
    async fn batch_send_flushes_in_groups_of_ten() {
        let queue = InMemoryQueue::new();
        let messages: Vec<_> = (0..23).map(|_| OutboundMessage::new(msg())).collect();
        queue.batch_send("https://queue", messages).await.unwrap();
        assert_eq!(queue.sent_count(), 23);
    }
}

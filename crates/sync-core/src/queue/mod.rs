//! The Durable Queue Client (§4.1): reliable at-least-once enqueue onto a
//! cloud message queue.

pub mod durable_queue;

pub use durable_queue::{DurableQueue, OutboundMessage, MAX_BATCH_SIZE, MAX_DELAY_SECONDS};

#[cfg(test)]
pub use durable_queue::in_memory::InMemoryQueue;

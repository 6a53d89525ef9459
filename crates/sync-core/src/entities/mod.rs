//! Domain entities and value objects
//!
//! Framework-agnostic types representing the sync engine's durable state:
//! the Process record, contact mappings, integration config, and the
//! queue message union.

pub mod common;
pub mod config;
pub mod mapping;
pub mod process;
pub mod queue_message;

pub use common::{EntityId, Timestamp};
pub use queue_message::QueueMessage;

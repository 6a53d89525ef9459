//! Background worker: polls the durable queue and dispatches each message
//! to its sync-core handler (§4.1, §4.7).

pub mod sync_worker;

pub use sync_worker::SyncWorker;

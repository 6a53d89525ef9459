//! Persistence trait contracts consumed by the orchestrator and pagination
//! engine. Concrete implementations live in `sync-db`; keeping the traits
//! here (rather than beside the sea-orm backend) lets the engine depend on
//! an abstract store instead of a database crate, per §9 "process mutation
//! concurrency -> store-side atomicity".

pub mod config_store;
pub mod mapping_store;
pub mod process_store;

pub use config_store::IntegrationConfigStore;
pub use mapping_store::MappingStore;
pub use process_store::{MetricsDelta, ProcessStore};

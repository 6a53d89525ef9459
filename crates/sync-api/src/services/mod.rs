pub mod adapter_registry;
pub mod queue_client;

pub use adapter_registry::{CrmAdapterRegistry, ReferenceCrmAdapter, StaticAdapterRegistry};
pub use queue_client::SqsDurableQueue;

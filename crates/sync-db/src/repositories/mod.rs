//! SeaORM-backed implementations of the three store contracts sync-core
//! defines: `ProcessStore`, `MappingStore`, `IntegrationConfigStore`.

pub mod config_store;
pub mod mapping_store;
pub mod process_store;

pub use config_store::SeaOrmConfigStore;
pub use mapping_store::SeaOrmMappingStore;
pub use process_store::SeaOrmProcessStore;

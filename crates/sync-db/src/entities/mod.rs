//! SeaORM entity models backing the sync engine's three stores.

pub mod integration_config;
pub mod mapping;
pub mod process;

pub use sea_orm::entity::prelude::*;
pub use sea_orm::{NotSet, Set, Unchanged};
pub use serde::{Deserialize, Serialize};

/// Convert from domain entity ID to database UUID
pub fn entity_id_to_uuid(id: sync_core::entities::EntityId) -> Uuid {
    id.as_uuid()
}

/// Convert from database UUID to domain entity ID
pub fn uuid_to_entity_id(uuid: Uuid) -> sync_core::entities::EntityId {
    sync_core::entities::EntityId::from_uuid(uuid)
}

/// Convert from domain timestamp to database DateTime
pub fn timestamp_to_datetime(ts: sync_core::entities::Timestamp) -> chrono::DateTime<chrono::Utc> {
    ts.as_datetime()
}

/// Convert from database DateTime to domain timestamp
pub fn datetime_to_timestamp(dt: chrono::DateTime<chrono::Utc>) -> sync_core::entities::Timestamp {
    sync_core::entities::Timestamp::from_datetime(dt)
}

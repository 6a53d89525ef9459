//! The IntegrationConfig Store. Config updates must be serialized
//! per-integration (§5 "Shared state"); implementations enforce this with
//! a per-integration lock or optimistic versioning.

use async_trait::async_trait;

use crate::entities::config::IntegrationConfig;
use crate::entities::EntityId;
use crate::errors::SyncResult;

#[async_trait]
pub trait IntegrationConfigStore: Send + Sync {
    async fn get(&self, integration_id: EntityId) -> SyncResult<IntegrationConfig>;

    /// Replaces the persisted config wholesale. Callers are responsible for
    /// merging (§4.6 deep-merge PATCH semantics) before calling this.
    async fn save(&self, integration_id: EntityId, config: IntegrationConfig) -> SyncResult<()>;
}

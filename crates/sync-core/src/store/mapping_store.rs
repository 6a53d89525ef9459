//! The Mapping Store: key-conflict-tolerant upsert of `ContactMapping`
//! records keyed by phone number (§3, §4.5 idempotence).

use async_trait::async_trait;

use crate::entities::mapping::ContactMapping;
use crate::errors::SyncResult;

#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Last-writer-wins on `last_synced_at`; replaying the same upsert
    /// produces no duplicate and leaves exactly one mapping per phone number.
    async fn upsert_mapping(&self, phone_number: &str, mapping: ContactMapping) -> SyncResult<()>;

    async fn get_mapping(&self, phone_number: &str) -> SyncResult<Option<ContactMapping>>;
}

#[cfg(test)]
pub mod in_memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryMappingStore {
        mappings: Mutex<HashMap<String, ContactMapping>>,
    }

    impl InMemoryMappingStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn len(&self) -> usize {
            self.mappings.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MappingStore for InMemoryMappingStore {
        async fn upsert_mapping(
            &self,
            phone_number: &str,
            mapping: ContactMapping,
        ) -> SyncResult<()> {
            self.mappings
                .lock()
                .unwrap()
                .insert(phone_number.to_string(), mapping);
            Ok(())
        }

        async fn get_mapping(&self, phone_number: &str) -> SyncResult<Option<ContactMapping>> {
            Ok(self.mappings.lock().unwrap().get(phone_number).cloned())
        }
    }
}

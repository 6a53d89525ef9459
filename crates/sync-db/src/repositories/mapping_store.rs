//! SeaORM-backed `MappingStore`.

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};

use sync_core::entities::mapping::{ContactMapping, MappingAction, SyncMethod};
use sync_core::entities::Timestamp;
use sync_core::errors::SyncResult;
use sync_core::store::MappingStore;

use crate::entities::mapping::{ActiveModel, Column, Entity as MappingEntity, Model};
use crate::error::DatabaseError;

pub struct SeaOrmMappingStore {
    db: DatabaseConnection,
}

impl SeaOrmMappingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn sync_method_to_str(method: SyncMethod) -> &'static str {
    match method {
        SyncMethod::Bulk => "bulk",
        SyncMethod::Upsert => "upsert",
    }
}

fn sync_method_from_str(s: &str) -> SyncMethod {
    match s {
        "bulk" => SyncMethod::Bulk,
        _ => SyncMethod::Upsert,
    }
}

fn action_to_str(action: MappingAction) -> &'static str {
    match action {
        MappingAction::Created => "created",
        MappingAction::Updated => "updated",
    }
}

fn action_from_str(s: &str) -> MappingAction {
    match s {
        "created" => MappingAction::Created,
        _ => MappingAction::Updated,
    }
}

fn model_to_domain(model: Model) -> ContactMapping {
    ContactMapping {
        external_id: model.external_id,
        quo_contact_id: model.quo_contact_id,
        phone_number: model.phone_number,
        entity_type: model.entity_type,
        last_synced_at: Timestamp::from_datetime(model.last_synced_at),
        sync_method: sync_method_from_str(&model.sync_method),
        action: action_from_str(&model.action),
    }
}

#[async_trait]
impl MappingStore for SeaOrmMappingStore {
    async fn upsert_mapping(&self, phone_number: &str, mapping: ContactMapping) -> SyncResult<()> {
        let active = ActiveModel {
            phone_number: Set(phone_number.to_string()),
            external_id: Set(mapping.external_id),
            quo_contact_id: Set(mapping.quo_contact_id),
            entity_type: Set(mapping.entity_type),
            last_synced_at: Set(mapping.last_synced_at.as_datetime()),
            sync_method: Set(sync_method_to_str(mapping.sync_method).to_string()),
            action: Set(action_to_str(mapping.action).to_string()),
        };

        MappingEntity::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(Column::PhoneNumber)
                    .update_columns([
                        Column::ExternalId,
                        Column::QuoContactId,
                        Column::EntityType,
                        Column::LastSyncedAt,
                        Column::SyncMethod,
                        Column::Action,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn get_mapping(&self, phone_number: &str) -> SyncResult<Option<ContactMapping>> {
        let found = MappingEntity::find_by_id(phone_number.to_string())
            .one(&self.db)
            .await
            .map_err(DatabaseError::from)?;
        Ok(found.map(model_to_domain))
    }
}

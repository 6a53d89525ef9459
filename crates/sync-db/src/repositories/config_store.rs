//! SeaORM-backed `IntegrationConfigStore`.

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};
use std::collections::BTreeSet;

use sync_core::entities::config::IntegrationConfig;
use sync_core::entities::{EntityId, Timestamp};
use sync_core::errors::SyncResult;
use sync_core::store::IntegrationConfigStore;

use crate::entities::integration_config::{ActiveModel, Column, Entity as ConfigEntity, Model};
use crate::error::DatabaseError;

pub struct SeaOrmConfigStore {
    db: DatabaseConnection,
}

impl SeaOrmConfigStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(model: Model) -> Result<IntegrationConfig, DatabaseError> {
    let enabled_phone_ids: BTreeSet<String> =
        serde_json::from_value(model.enabled_phone_ids).map_err(DatabaseError::from)?;

    Ok(IntegrationConfig {
        enabled_phone_ids,
        phone_numbers_metadata: model.phone_numbers_metadata,
        phone_numbers_fetched_at: model.phone_numbers_fetched_at.map(Timestamp::from_datetime),
        quo_message_webhooks: serde_json::from_value(model.quo_message_webhooks)
            .map_err(DatabaseError::from)?,
        quo_call_webhooks: serde_json::from_value(model.quo_call_webhooks)
            .map_err(DatabaseError::from)?,
        quo_call_summary_webhooks: serde_json::from_value(model.quo_call_summary_webhooks)
            .map_err(DatabaseError::from)?,
        quo_webhooks_created_at: model.quo_webhooks_created_at.map(Timestamp::from_datetime),
        quo_message_webhook_id: model.quo_message_webhook_id,
        quo_message_webhook_key: model.quo_message_webhook_key,
        quo_call_webhook_id: model.quo_call_webhook_id,
        quo_call_webhook_key: model.quo_call_webhook_key,
        quo_call_summary_webhook_id: model.quo_call_summary_webhook_id,
        quo_call_summary_webhook_key: model.quo_call_summary_webhook_key,
    })
}

#[async_trait]
impl IntegrationConfigStore for SeaOrmConfigStore {
    async fn get(&self, integration_id: EntityId) -> SyncResult<IntegrationConfig> {
        let found = ConfigEntity::find_by_id(integration_id.as_uuid())
            .one(&self.db)
            .await
            .map_err(DatabaseError::from)?;

        match found {
            Some(model) => Ok(model_to_domain(model)?),
            None => Ok(IntegrationConfig::default()),
        }
    }

    async fn save(&self, integration_id: EntityId, config: IntegrationConfig) -> SyncResult<()> {
        let active = ActiveModel {
            integration_id: Set(integration_id.as_uuid()),
            enabled_phone_ids: Set(serde_json::to_value(&config.enabled_phone_ids)?),
            phone_numbers_metadata: Set(config.phone_numbers_metadata),
            phone_numbers_fetched_at: Set(config
                .phone_numbers_fetched_at
                .map(|t| t.as_datetime())),
            quo_message_webhooks: Set(serde_json::to_value(&config.quo_message_webhooks)?),
            quo_call_webhooks: Set(serde_json::to_value(&config.quo_call_webhooks)?),
            quo_call_summary_webhooks: Set(serde_json::to_value(
                &config.quo_call_summary_webhooks,
            )?),
            quo_webhooks_created_at: Set(config.quo_webhooks_created_at.map(|t| t.as_datetime())),
            quo_message_webhook_id: Set(config.quo_message_webhook_id),
            quo_message_webhook_key: Set(config.quo_message_webhook_key),
            quo_call_webhook_id: Set(config.quo_call_webhook_id),
            quo_call_webhook_key: Set(config.quo_call_webhook_key),
            quo_call_summary_webhook_id: Set(config.quo_call_summary_webhook_id),
            quo_call_summary_webhook_key: Set(config.quo_call_summary_webhook_key),
        };

        ConfigEntity::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(Column::IntegrationId)
                    .update_columns([
                        Column::EnabledPhoneIds,
                        Column::PhoneNumbersMetadata,
                        Column::PhoneNumbersFetchedAt,
                        Column::QuoMessageWebhooks,
                        Column::QuoCallWebhooks,
                        Column::QuoCallSummaryWebhooks,
                        Column::QuoWebhooksCreatedAt,
                        Column::QuoMessageWebhookId,
                        Column::QuoMessageWebhookKey,
                        Column::QuoCallWebhookId,
                        Column::QuoCallWebhookKey,
                        Column::QuoCallSummaryWebhookId,
                        Column::QuoCallSummaryWebhookKey,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(DatabaseError::from)?;

        Ok(())
    }
}

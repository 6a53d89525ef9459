//! SeaORM model for the `integration_configs` table, keyed by integration id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "integration_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub integration_id: Uuid,
    pub enabled_phone_ids: Json,
    pub phone_numbers_metadata: Json,
    pub phone_numbers_fetched_at: Option<DateTimeUtc>,
    pub quo_message_webhooks: Json,
    pub quo_call_webhooks: Json,
    pub quo_call_summary_webhooks: Json,
    pub quo_webhooks_created_at: Option<DateTimeUtc>,
    pub quo_message_webhook_id: Option<String>,
    pub quo_message_webhook_key: Option<String>,
    pub quo_call_webhook_id: Option<String>,
    pub quo_call_webhook_key: Option<String>,
    pub quo_call_summary_webhook_id: Option<String>,
    pub quo_call_summary_webhook_key: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

//! SeaORM model for the `sync_processes` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_processes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub integration_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub process_type: String,
    pub state: String,
    pub sync_type: String,
    pub person_object_type: String,
    pub total_records: i64,
    pub processed_records: i64,
    pub current_page: i32,
    pub pagination: Json,
    pub start_time: DateTimeUtc,
    pub total_synced: i64,
    pub total_failed: i64,
    pub duration_ms: Option<i64>,
    pub records_per_second: Option<f64>,
    pub errors: Json,
    pub metadata: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

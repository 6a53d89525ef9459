//! SeaORM-backed `ProcessStore`. Every mutation runs inside a transaction
//! that re-reads the row first, since many queue workers may update the
//! same process concurrently (§5 "Shared state").

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};

use sync_core::entities::process::{
    AggregateData, ErrorDetail, NewProcess, PaginationState, Process, ProcessContext,
    ProcessState, ProcessType, SyncType,
};
use sync_core::entities::{EntityId, Timestamp};
use sync_core::errors::{SyncError, SyncResult};
use sync_core::store::process_store::{MetricsDelta, ProcessStore};

use crate::entities::process::{ActiveModel, Column, Entity as ProcessEntity, Model};
use crate::error::DatabaseError;

pub struct SeaOrmProcessStore {
    db: DatabaseConnection,
}

impl SeaOrmProcessStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn enum_to_string<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => unreachable!("process enums always serialize to a JSON string"),
    }
}

fn enum_from_string<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(DatabaseError::from)
}

fn model_to_domain(model: Model) -> Result<Process, DatabaseError> {
    let pagination: PaginationState =
        serde_json::from_value(model.pagination).map_err(DatabaseError::from)?;
    let errors: Vec<ErrorDetail> = serde_json::from_value(model.errors).map_err(DatabaseError::from)?;

    Ok(Process {
        id: EntityId::from_uuid(model.id),
        integration_id: EntityId::from_uuid(model.integration_id),
        user_id: EntityId::from_uuid(model.user_id),
        name: model.name,
        process_type: enum_from_string::<ProcessType>(&model.process_type)?,
        state: enum_from_string::<ProcessState>(&model.state)?,
        context: ProcessContext {
            sync_type: enum_from_string::<SyncType>(&model.sync_type)?,
            person_object_type: model.person_object_type,
            total_records: model.total_records as u64,
            processed_records: model.processed_records as u64,
            current_page: model.current_page as u32,
            pagination,
            start_time: Timestamp::from_datetime(model.start_time),
        },
        aggregate_data: AggregateData {
            total_synced: model.total_synced as u64,
            total_failed: model.total_failed as u64,
            duration_ms: model.duration_ms.map(|d| d as u64),
            records_per_second: model.records_per_second,
            errors,
        },
        metadata: model.metadata,
        created_at: Timestamp::from_datetime(model.created_at),
        updated_at: Timestamp::from_datetime(model.updated_at),
    })
}

fn domain_to_active(process: &Process) -> Result<ActiveModel, DatabaseError> {
    Ok(ActiveModel {
        id: Set(process.id.as_uuid()),
        integration_id: Set(process.integration_id.as_uuid()),
        user_id: Set(process.user_id.as_uuid()),
        name: Set(process.name.clone()),
        process_type: Set(enum_to_string(&process.process_type)),
        state: Set(enum_to_string(&process.state)),
        sync_type: Set(enum_to_string(&process.context.sync_type)),
        person_object_type: Set(process.context.person_object_type.clone()),
        total_records: Set(process.context.total_records as i64),
        processed_records: Set(process.context.processed_records as i64),
        current_page: Set(process.context.current_page as i32),
        pagination: Set(serde_json::to_value(&process.context.pagination)?),
        start_time: Set(process.context.start_time.as_datetime()),
        total_synced: Set(process.aggregate_data.total_synced as i64),
        total_failed: Set(process.aggregate_data.total_failed as i64),
        duration_ms: Set(process.aggregate_data.duration_ms.map(|d| d as i64)),
        records_per_second: Set(process.aggregate_data.records_per_second),
        errors: Set(serde_json::to_value(&process.aggregate_data.errors)?),
        metadata: Set(process.metadata.clone()),
        created_at: Set(process.created_at.as_datetime()),
        updated_at: Set(process.updated_at.as_datetime()),
    })
}

async fn load(txn: &impl sea_orm::ConnectionTrait, id: EntityId) -> Result<Process, DbErrOrSync> {
    let model = ProcessEntity::find_by_id(id.as_uuid())
        .one(txn)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| DbErrOrSync::Sync(SyncError::not_found("process", id.to_string())))?;
    Ok(model_to_domain(model).map_err(DbErrOrSync::from)?)
}

/// A transaction closure can fail for a database reason or a domain reason
/// (illegal transition, not found); both need to roll back and surface as
/// a `SyncError` to the caller.
enum DbErrOrSync {
    Db(DbErr),
    Sync(SyncError),
}

impl From<DbErr> for DbErrOrSync {
    fn from(e: DbErr) -> Self {
        DbErrOrSync::Db(e)
    }
}

impl From<DatabaseError> for DbErrOrSync {
    fn from(e: DatabaseError) -> Self {
        DbErrOrSync::Sync(e.into())
    }
}

impl From<SyncError> for DbErrOrSync {
    fn from(e: SyncError) -> Self {
        DbErrOrSync::Sync(e)
    }
}

impl std::fmt::Display for DbErrOrSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbErrOrSync::Db(e) => write!(f, "{e}"),
            DbErrOrSync::Sync(e) => write!(f, "{e}"),
        }
    }
}
impl std::fmt::Debug for DbErrOrSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
impl std::error::Error for DbErrOrSync {}

fn unwrap_txn_err(err: sea_orm::TransactionError<DbErrOrSync>) -> SyncError {
    match err {
        sea_orm::TransactionError::Connection(db_err) => DatabaseError::from(db_err).into(),
        sea_orm::TransactionError::Transaction(DbErrOrSync::Db(db_err)) => {
            DatabaseError::from(db_err).into()
        }
        sea_orm::TransactionError::Transaction(DbErrOrSync::Sync(sync_err)) => sync_err,
    }
}

#[async_trait]
impl ProcessStore for SeaOrmProcessStore {
    async fn create(&self, data: NewProcess) -> SyncResult<Process> {
        let process = Process::new(data);
        let active = domain_to_active(&process).map_err(Into::<SyncError>::into)?;
        ProcessEntity::insert(active)
            .exec(&self.db)
            .await
            .map_err(DatabaseError::from)?;
        Ok(process)
    }

    async fn get_by_id(&self, id: EntityId) -> SyncResult<Process> {
        let model = ProcessEntity::find_by_id(id.as_uuid())
            .one(&self.db)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| SyncError::not_found("process", id.to_string()))?;
        Ok(model_to_domain(model).map_err(Into::<SyncError>::into)?)
    }

    async fn update_state(&self, id: EntityId, new_state: ProcessState) -> SyncResult<Process> {
        self.db
            .transaction::<_, Process, DbErrOrSync>(|txn| {
                Box::pin(async move {
                    let mut process = load(txn, id).await?;
                    process.try_transition(new_state)?;
                    let active = domain_to_active(&process)?;
                    active.update(txn).await?;
                    Ok(process)
                })
            })
            .await
            .map_err(unwrap_txn_err)
    }

    async fn update_total(&self, id: EntityId, total: u64, total_pages: u32) -> SyncResult<Process> {
        self.db
            .transaction::<_, Process, DbErrOrSync>(|txn| {
                Box::pin(async move {
                    let mut process = load(txn, id).await?;
                    process.context.total_records = total;
                    process.context.pagination.next_page = Some(total_pages);
                    process.updated_at = Timestamp::now();
                    let active = domain_to_active(&process)?;
                    active.update(txn).await?;
                    Ok(process)
                })
            })
            .await
            .map_err(unwrap_txn_err)
    }

    async fn update_metrics(&self, id: EntityId, delta: MetricsDelta) -> SyncResult<Process> {
        self.db
            .transaction::<_, Process, DbErrOrSync>(|txn| {
                Box::pin(async move {
                    let mut process = load(txn, id).await?;
                    process.context.processed_records += delta.processed;
                    process.aggregate_data.total_synced += delta.success;
                    process.aggregate_data.total_failed += delta.errors;
                    for (error, external_id) in delta.error_details {
                        process.push_error(error, external_id);
                    }
                    process.updated_at = Timestamp::now();
                    let active = domain_to_active(&process)?;
                    active.update(txn).await?;
                    Ok(process)
                })
            })
            .await
            .map_err(unwrap_txn_err)
    }

    async fn update_metadata(&self, id: EntityId, patch: serde_json::Value) -> SyncResult<Process> {
        self.db
            .transaction::<_, Process, DbErrOrSync>(|txn| {
                Box::pin(async move {
                    let mut process = load(txn, id).await?;
                    if let (Some(existing), Some(patch_obj)) =
                        (process.metadata.as_object_mut(), patch.as_object())
                    {
                        for (k, v) in patch_obj {
                            existing.insert(k.clone(), v.clone());
                        }
                    } else {
                        process.metadata = patch;
                    }
                    process.updated_at = Timestamp::now();
                    let active = domain_to_active(&process)?;
                    active.update(txn).await?;
                    Ok(process)
                })
            })
            .await
            .map_err(unwrap_txn_err)
    }

    async fn get_metadata(&self, id: EntityId) -> SyncResult<serde_json::Value> {
        let model = ProcessEntity::find_by_id(id.as_uuid())
            .one(&self.db)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| SyncError::not_found("process", id.to_string()))?;
        Ok(model.metadata)
    }

    async fn complete_process(&self, id: EntityId) -> SyncResult<Process> {
        self.db
            .transaction::<_, Process, DbErrOrSync>(|txn| {
                Box::pin(async move {
                    let mut process = load(txn, id).await?;
                    let start = process.context.start_time.as_datetime();
                    let now = Timestamp::now();
                    let duration_ms = (now.as_datetime() - start).num_milliseconds().max(0) as u64;
                    process.try_transition(ProcessState::Completing)?;
                    process.try_transition(ProcessState::Completed)?;
                    process.aggregate_data.duration_ms = Some(duration_ms);
                    process.aggregate_data.records_per_second = if duration_ms > 0 {
                        let total = process.aggregate_data.total_synced
                            + process.aggregate_data.total_failed;
                        Some(total as f64 / (duration_ms as f64 / 1000.0))
                    } else {
                        None
                    };
                    process.updated_at = now;
                    let active = domain_to_active(&process)?;
                    active.update(txn).await?;
                    Ok(process)
                })
            })
            .await
            .map_err(unwrap_txn_err)
    }

    async fn find_latest_completed(
        &self,
        integration_id: EntityId,
        person_object_type: &str,
    ) -> SyncResult<Option<Process>> {
        let model = ProcessEntity::find()
            .filter(Column::IntegrationId.eq(integration_id.as_uuid()))
            .filter(Column::PersonObjectType.eq(person_object_type))
            .filter(Column::State.eq(enum_to_string(&ProcessState::Completed)))
            .order_by_desc(Column::UpdatedAt)
            .one(&self.db)
            .await
            .map_err(DatabaseError::from)?;

        match model {
            Some(m) => Ok(Some(model_to_domain(m).map_err(Into::<SyncError>::into)?)),
            None => Ok(None),
        }
    }

    async fn handle_error(
        &self,
        id: EntityId,
        message: String,
        external_id: Option<String>,
        fatal: bool,
    ) -> SyncResult<Process> {
        self.db
            .transaction::<_, Process, DbErrOrSync>(|txn| {
                Box::pin(async move {
                    let mut process = load(txn, id).await?;
                    process.push_error(message, external_id);
                    process.aggregate_data.total_failed += 1;
                    if fatal {
                        process.try_transition(ProcessState::Failed)?;
                    }
                    process.updated_at = Timestamp::now();
                    let active = domain_to_active(&process)?;
                    active.update(txn).await?;
                    Ok(process)
                })
            })
            .await
            .map_err(unwrap_txn_err)
    }
}

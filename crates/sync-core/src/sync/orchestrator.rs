//! The Sync Orchestrator (§4.3): seeds a run. Creates one Process per person
//! object type and enqueues its first `FETCH_PERSON_PAGE` message. Never
//! fetches data itself.

use chrono::Duration;

use super::SyncContext;
use crate::crm::PaginationType;
use crate::entities::process::{NewProcess, SyncType};
use crate::entities::{EntityId, QueueMessage, Timestamp};
use crate::errors::SyncResult;
use crate::queue::OutboundMessage;

/// First-ever delta sync has no prior `COMPLETED` process to read a watermark
/// from. §9 leaves the default open provided it's deterministic; this
/// implementation bounds it to the last 24h, matching the fallback named in
/// §4.3's own text.
pub const DEFAULT_DELTA_LOOKBACK_HOURS: i64 = 24;

fn seed_message(
    pagination_type: PaginationType,
    process_id: EntityId,
    person_object_type: &str,
    limit: u32,
    modified_since: Option<Timestamp>,
    sort_desc: bool,
) -> QueueMessage {
    QueueMessage::FetchPersonPage {
        process_id,
        person_object_type: person_object_type.to_string(),
        page: matches!(pagination_type, PaginationType::PageBased).then_some(0),
        cursor: None,
        limit,
        modified_since,
        sort_desc,
    }
}

async fn start_sync(
    ctx: &SyncContext,
    integration_id: EntityId,
    user_id: EntityId,
    person_object_types: &[String],
    sync_type: SyncType,
    batch_size: u32,
    modified_since_for: impl Fn(&str) -> Option<Timestamp>,
) -> SyncResult<Vec<EntityId>> {
    let sync_config = ctx.crm.sync_config();
    let mut process_ids = Vec::with_capacity(person_object_types.len());
    let mut outbound = Vec::with_capacity(person_object_types.len());

    for object_type in person_object_types {
        let process = ctx
            .process_store
            .create(NewProcess {
                integration_id,
                user_id,
                name: object_type.clone(),
                sync_type,
                person_object_type: object_type.clone(),
                page_size: batch_size,
            })
            .await?;
        process_ids.push(process.id);

        outbound.push(OutboundMessage::new(seed_message(
            sync_config.pagination_type,
            process.id,
            object_type,
            batch_size,
            modified_since_for(object_type),
            sync_config.reverse_chronological,
        )));
    }

    ctx.queue.batch_send(&ctx.queue_url, outbound).await?;
    Ok(process_ids)
}

/// `startInitialSync`: one Process per object type, `syncType = INITIAL`,
/// `pageSize = initialBatchSize`, no `modifiedSince` filter.
pub async fn start_initial_sync(
    ctx: &SyncContext,
    integration_id: EntityId,
    user_id: EntityId,
    person_object_types: &[String],
) -> SyncResult<Vec<EntityId>> {
    let batch_size = ctx.crm.sync_config().initial_batch_size;
    start_sync(
        ctx,
        integration_id,
        user_id,
        person_object_types,
        SyncType::Initial,
        batch_size,
        |_| None,
    )
    .await
}

/// `startOngoingSync`: `syncType = DELTA`, `pageSize = ongoingBatchSize`, and
/// `modifiedSince` computed per object type from the most recent `COMPLETED`
/// process for that (integration, type) pair; falls back to a 24h lookback
/// when no prior completed run exists.
pub async fn start_ongoing_sync(
    ctx: &SyncContext,
    integration_id: EntityId,
    user_id: EntityId,
    person_object_types: &[String],
) -> SyncResult<Vec<EntityId>> {
    let batch_size = ctx.crm.sync_config().ongoing_batch_size;

    let mut watermarks = std::collections::HashMap::new();
    for object_type in person_object_types {
        let watermark = match ctx
            .process_store
            .find_latest_completed(integration_id, object_type)
            .await?
        {
            Some(prior) => prior.updated_at,
            None => Timestamp::from_datetime(
                Timestamp::now().as_datetime() - Duration::hours(DEFAULT_DELTA_LOOKBACK_HOURS),
            ),
        };
        watermarks.insert(object_type.clone(), watermark);
    }

    start_sync(
        ctx,
        integration_id,
        user_id,
        person_object_types,
        SyncType::Delta,
        batch_size,
        |object_type| watermarks.get(object_type).copied(),
    )
    .await
}

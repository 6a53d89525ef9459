//! CURSOR_BASED pagination strategy (§4.4.2): the adapter has no upfront
//! total, so the engine walks pages one at a time and processes each one
//! inline rather than fanning out a batch message — cursor advancement is
//! serialized by construction since each page depends on the previous one.

use super::{bulk_upsert, SyncContext};
use crate::crm::FetchPageParams;
use crate::entities::process::ProcessState;
use crate::entities::{EntityId, QueueMessage, Timestamp};
use crate::errors::SyncResult;
use crate::queue::OutboundMessage;
use crate::store::MetricsDelta;

pub async fn handle_fetch_person_page(
    ctx: &SyncContext,
    process_id: EntityId,
    person_object_type: String,
    cursor: Option<String>,
    limit: u32,
    modified_since: Option<Timestamp>,
    sort_desc: bool,
) -> SyncResult<()> {
    if let Err(err) = walk_page(
        ctx,
        process_id,
        &person_object_type,
        cursor,
        limit,
        modified_since,
        sort_desc,
    )
    .await
    {
        ctx.process_store
            .handle_error(process_id, err.to_string(), None, err.is_critical())
            .await?;
        return Err(err);
    }
    Ok(())
}

async fn walk_page(
    ctx: &SyncContext,
    process_id: EntityId,
    person_object_type: &str,
    cursor: Option<String>,
    limit: u32,
    modified_since: Option<Timestamp>,
    sort_desc: bool,
) -> SyncResult<()> {
    let is_first_page = cursor.is_none();
    if is_first_page {
        // Only the seed call is in `INITIALIZING`; once the walk reaches
        // `PROCESSING_BATCHES` it stays there for every subsequent page.
        ctx.process_store
            .update_state(process_id, ProcessState::FetchingPage)
            .await?;
    }

    let page = ctx
        .crm
        .fetch_person_page(FetchPageParams {
            object_type: person_object_type.to_string(),
            page: None,
            cursor: cursor.clone(),
            limit,
            modified_since,
            sort_desc,
        })
        .await?;

    if is_first_page && page.data.is_empty() {
        ctx.process_store.update_total(process_id, 0, 0).await?;
        ctx.queue
            .send(
                &ctx.queue_url,
                OutboundMessage::new(QueueMessage::CompleteSync { process_id }),
            )
            .await?;
        return Ok(());
    }

    let metadata = ctx.process_store.get_metadata(process_id).await?;
    let total_fetched = metadata
        .get("totalFetched")
        .and_then(|v| v.as_u64())
        .unwrap_or(0)
        + page.data.len() as u64;
    let page_count = metadata.get("pageCount").and_then(|v| v.as_u64()).unwrap_or(0) + 1;
    ctx.process_store
        .update_metadata(
            process_id,
            serde_json::json!({
                "totalFetched": total_fetched,
                "pageCount": page_count,
                "lastCursor": page.next_cursor,
            }),
        )
        .await?;

    if is_first_page {
        ctx.process_store
            .update_total(process_id, total_fetched, 1)
            .await?;
        ctx.process_store
            .update_state(process_id, ProcessState::ProcessingBatches)
            .await?;
    } else {
        ctx.process_store
            .update_total(process_id, total_fetched, page_count as u32)
            .await?;
    }

    let batch_size = page.data.len();
    if batch_size > 0 {
        // If the adapter returns full payloads, use them directly instead
        // of re-fetching by id (§4.4.2 step 6) — unlike PAGE_BASED's fanned
        // out batches, a page here is already processed inline.
        let batch = if ctx.crm.sync_config().return_full_records {
            bulk_upsert::PersonBatch::Records(page.data)
        } else {
            bulk_upsert::PersonBatch::Ids(page.data.iter().map(|p| p.id.clone()).collect())
        };

        match bulk_upsert::process_and_upsert(ctx, batch).await {
            Ok(result) => {
                ctx.process_store
                    .update_metrics(process_id, result.into())
                    .await?;
            }
            Err(err) => {
                // Processing errors are recorded but MUST NOT abort the
                // cursor walk (§4.4.2 step 6) — iteration continues.
                ctx.process_store
                    .update_metrics(
                        process_id,
                        MetricsDelta {
                            processed: batch_size as u64,
                            errors: batch_size as u64,
                            error_details: vec![(err.to_string(), None)],
                            ..Default::default()
                        },
                    )
                    .await?;
            }
        }
    }

    if page.has_more && page.next_cursor.is_some() {
        ctx.queue
            .send(
                &ctx.queue_url,
                OutboundMessage::new(QueueMessage::FetchPersonPage {
                    process_id,
                    person_object_type: person_object_type.to_string(),
                    page: None,
                    cursor: page.next_cursor,
                    limit,
                    modified_since,
                    sort_desc,
                }),
            )
            .await?;
    } else {
        ctx.queue
            .send(
                &ctx.queue_url,
                OutboundMessage::new(QueueMessage::CompleteSync { process_id }),
            )
            .await?;
    }

    Ok(())
}

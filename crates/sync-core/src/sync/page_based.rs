//! PAGE_BASED pagination strategy (§4.4.1): the adapter knows the total
//! record count up front, so page 0's fetch fans out every remaining page
//! in one shot rather than walking them one at a time.

use super::{bulk_upsert, SyncContext};
use crate::crm::FetchPageParams;
use crate::entities::process::ProcessState;
use crate::entities::{EntityId, QueueMessage, Timestamp};
use crate::errors::SyncResult;
use crate::queue::OutboundMessage;

pub async fn handle_fetch_person_page(
    ctx: &SyncContext,
    process_id: EntityId,
    person_object_type: String,
    page: u32,
    limit: u32,
    modified_since: Option<Timestamp>,
    sort_desc: bool,
) -> SyncResult<()> {
    if let Err(err) = fetch_page(
        ctx,
        process_id,
        &person_object_type,
        page,
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

async fn fetch_page(
    ctx: &SyncContext,
    process_id: EntityId,
    person_object_type: &str,
    page: u32,
    limit: u32,
    modified_since: Option<Timestamp>,
    sort_desc: bool,
) -> SyncResult<()> {
    ctx.process_store
        .update_state(process_id, ProcessState::FetchingTotal)
        .await?;

    let result = ctx
        .crm
        .fetch_person_page(FetchPageParams {
            object_type: person_object_type.to_string(),
            page: Some(page),
            cursor: None,
            limit,
            modified_since,
            sort_desc,
        })
        .await?;

    if page == 0 {
        if let Some(total) = result.total.filter(|t| *t > 0) {
            let total_pages = total.div_ceil(limit as u64) as u32;
            ctx.process_store
                .update_total(process_id, total, total_pages)
                .await?;

            // Guard against a redelivered page-0 fetch re-fanning-out the
            // same pages: only the delivery that actually observes
            // FETCHING_TOTAL drives the transition and fan-out (§5 "Timeouts").
            let current = ctx.process_store.get_by_id(process_id).await?;
            if current.state == ProcessState::FetchingTotal {
                ctx.process_store
                    .update_state(process_id, ProcessState::QueuingPages)
                    .await?;

                if total_pages > 1 {
                    let fan_out = (1..total_pages)
                        .map(|p| {
                            OutboundMessage::new(QueueMessage::FetchPersonPage {
                                process_id,
                                person_object_type: person_object_type.to_string(),
                                page: Some(p),
                                cursor: None,
                                limit,
                                modified_since,
                                sort_desc,
                            })
                        })
                        .collect();
                    ctx.queue.batch_send(&ctx.queue_url, fan_out).await?;
                }

                ctx.process_store
                    .update_state(process_id, ProcessState::ProcessingBatches)
                    .await?;
            }
        } else if result.data.is_empty() {
            ctx.queue
                .send(
                    &ctx.queue_url,
                    OutboundMessage::new(QueueMessage::CompleteSync { process_id }),
                )
                .await?;
            return Ok(());
        }
    }

    if !result.data.is_empty() {
        let ids = result.data.iter().map(|p| p.id.clone()).collect();
        ctx.queue
            .send(
                &ctx.queue_url,
                OutboundMessage::new(QueueMessage::ProcessPersonBatch {
                    process_id,
                    crm_person_ids: ids,
                    page: Some(page),
                    total_in_page: Some(result.data.len() as u32),
                    is_webhook: false,
                }),
            )
            .await?;
    }

    // No known total: the walk ends when a non-first page comes back short.
    if page > 0 && result.total.is_none() && (result.data.len() as u32) < limit {
        ctx.queue
            .send(
                &ctx.queue_url,
                OutboundMessage::new(QueueMessage::CompleteSync { process_id }),
            )
            .await?;
    }

    Ok(())
}

/// `PROCESS_PERSON_BATCH` handler: the downstream half of each fanned-out
/// page. Enqueues `COMPLETE_SYNC` once every record the process knows
/// about has been accounted for, so the last batch to land triggers
/// completion regardless of arrival order.
pub async fn handle_process_person_batch(
    ctx: &SyncContext,
    process_id: EntityId,
    crm_person_ids: Vec<String>,
) -> SyncResult<()> {
    let result = bulk_upsert::process_and_upsert(ctx, bulk_upsert::PersonBatch::Ids(crm_person_ids)).await?;
    let total_records = result.success_count + result.error_count;
    let _ = total_records; // bookkeeping only; metrics delta below is authoritative
    let updated = ctx
        .process_store
        .update_metrics(process_id, result.into())
        .await?;

    let accounted_for = updated.aggregate_data.total_synced + updated.aggregate_data.total_failed;
    if updated.context.total_records > 0 && accounted_for >= updated.context.total_records {
        ctx.queue
            .send(
                &ctx.queue_url,
                OutboundMessage::new(QueueMessage::CompleteSync { process_id }),
            )
            .await?;
    }
    Ok(())
}

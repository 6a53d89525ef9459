//! Inbound activity logging (§4.6): a telephony-side SMS or call event is
//! resolved back to its CRM contact via the phone-number mapping table and
//! written onto that contact's activity timeline.
//!
//! Unlike the sync pipeline's other handlers, these never touch `Process` —
//! an individual SMS or call event isn't part of a batch run, it's a single
//! fire-and-forget side effect of a webhook delivery.

use super::SyncContext;
use crate::entities::{EntityId, Timestamp};
use crate::errors::{SyncError, SyncResult};

/// `LOG_SMS`: looks up the contact mapping for `phone_number` and forwards
/// the message body to the adapter's activity log. A phone number with no
/// mapping yet (the CRM side was never synced) is a no-op, not an error —
/// the webhook still fired for a number sync hasn't caught up to.
pub async fn handle_log_sms(
    ctx: &SyncContext,
    integration_id: EntityId,
    phone_number: String,
    body: String,
    occurred_at: Timestamp,
) -> SyncResult<()> {
    let _ = integration_id;
    match ctx.mapping_store.get_mapping(&phone_number).await? {
        Some(mapping) => {
            ctx.crm
                .log_sms_to_activity(&mapping.external_id, &phone_number, &body, occurred_at)
                .await
        }
        None => {
            tracing::debug!(phone_number = %phone_number, "no contact mapping for inbound SMS, skipping");
            Ok(())
        }
    }
}

/// `LOG_CALL`: same resolution as `handle_log_sms`, logging call duration
/// instead of a message body.
pub async fn handle_log_call(
    ctx: &SyncContext,
    integration_id: EntityId,
    phone_number: String,
    duration_seconds: u32,
    occurred_at: Timestamp,
) -> SyncResult<()> {
    let _ = integration_id;
    match ctx.mapping_store.get_mapping(&phone_number).await? {
        Some(mapping) => {
            ctx.crm
                .log_call_to_activity(&mapping.external_id, &phone_number, duration_seconds, occurred_at)
                .await
        }
        None => {
            tracing::debug!(phone_number = %phone_number, "no contact mapping for inbound call, skipping");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::mapping::{ContactMapping, MappingAction, SyncMethod};
    use crate::queue::in_memory::InMemoryQueue;
    use crate::store::config_store::in_memory::InMemoryConfigStore;
    use crate::store::mapping_store::in_memory::InMemoryMappingStore;
    use crate::store::process_store::in_memory::InMemoryProcessStore;
    use crate::sync::test_support::{noop_adapter, noop_telephony};
    use std::sync::Arc;

    fn ctx() -> SyncContext {
        SyncContext {
            queue: Arc::new(InMemoryQueue::new()),
            queue_url: "https://queue.example/sync".into(),
            process_store: Arc::new(InMemoryProcessStore::new()),
            mapping_store: Arc::new(InMemoryMappingStore::new()),
            config_store: Arc::new(InMemoryConfigStore::new()),
            crm: Arc::new(noop_adapter()),
            telephony: Arc::new(noop_telephony()),
        }
    }

    #[tokio::test]
    async fn logs_sms_when_mapping_exists() {
        let ctx = ctx();
        ctx.mapping_store
            .upsert_mapping(
                "+15551234",
                ContactMapping::new(
                    "ext-1",
                    "quo-1",
                    "+15551234",
                    "contact",
                    SyncMethod::Bulk,
                    MappingAction::Created,
                ),
            )
            .await
            .unwrap();

        handle_log_sms(
            &ctx,
            EntityId::new(),
            "+15551234".to_string(),
            "hello".to_string(),
            Timestamp::now(),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn skips_sms_with_no_mapping() {
        let ctx = ctx();
        handle_log_sms(
            &ctx,
            EntityId::new(),
            "+15559999".to_string(),
            "hello".to_string(),
            Timestamp::now(),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn logs_call_when_mapping_exists() {
        let ctx = ctx();
        ctx.mapping_store
            .upsert_mapping(
                "+15551234",
                ContactMapping::new(
                    "ext-1",
                    "quo-1",
                    "+15551234",
                    "contact",
                    SyncMethod::Bulk,
                    MappingAction::Created,
                ),
            )
            .await
            .unwrap();

        handle_log_call(&ctx, EntityId::new(), "+15551234".to_string(), 42, Timestamp::now())
            .await
            .unwrap();
    }
}

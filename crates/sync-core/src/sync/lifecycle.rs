//! Integration Lifecycle (§4.7): the hook fired when an integration is
//! created, and the delayed follow-up that actually wires up webhooks and
//! kicks off the first sync.

use serde::Serialize;

use super::{orchestrator, webhook_manager, SyncContext};
use crate::entities::{EntityId, QueueMessage};
use crate::errors::SyncResult;
use crate::queue::OutboundMessage;

/// Delay before `POST_CREATE_SETUP` runs, giving the downstream platform
/// time to finish propagating freshly issued credentials (§4.7, §9).
pub const ON_CREATE_DELAY_SECONDS: u32 = 35;

#[derive(Debug, Serialize)]
pub struct SubStepResult {
    pub status: &'static str,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostCreateSetupResult {
    pub webhooks: Option<SubStepResult>,
    pub initial_sync: Option<SubStepResult>,
}

/// `onCreate`: if the integration still needs configuration (no phone ids
/// enabled yet), mark it as such and stop rather than scheduling setup
/// work that would immediately no-op.
pub async fn on_create(
    ctx: &SyncContext,
    integration_id: EntityId,
) -> SyncResult<bool> {
    let config = ctx.config_store.get(integration_id).await?;
    if config.enabled_phone_ids.is_empty() {
        return Ok(false);
    }

    ctx.queue
        .send(
            &ctx.queue_url,
            OutboundMessage::with_delay(
                QueueMessage::PostCreateSetup { integration_id },
                ON_CREATE_DELAY_SECONDS,
            ),
        )
        .await?;
    Ok(true)
}

/// `POST_CREATE_SETUP` handler: webhook setup is attempted but its failure
/// is non-fatal — the initial sync still runs, and both outcomes are
/// reported in the structured result rather than raised as an error.
pub async fn handle_post_create_setup(
    ctx: &SyncContext,
    integration_id: EntityId,
    webhook_url: &str,
    person_object_types: &[String],
    user_id: EntityId,
) -> SyncResult<PostCreateSetupResult> {
    let config = ctx.config_store.get(integration_id).await?;
    let phone_ids: Vec<String> = config.enabled_phone_ids.iter().cloned().collect();

    let webhooks = if phone_ids.is_empty() {
        None
    } else {
        match webhook_manager::create_all(ctx, webhook_url, &phone_ids).await {
            Ok(lists) => {
                let mut updated = config.clone();
                updated.quo_message_webhooks = lists.message;
                updated.quo_call_webhooks = lists.call;
                updated.quo_call_summary_webhooks = lists.call_summary;
                updated.quo_webhooks_created_at = Some(crate::entities::Timestamp::now());
                ctx.config_store.save(integration_id, updated).await?;
                Some(SubStepResult {
                    status: "created",
                    error: None,
                })
            }
            Err(err) => Some(SubStepResult {
                status: "failed",
                error: Some(err.to_string()),
            }),
        }
    };

    let initial_sync = match orchestrator::start_initial_sync(
        ctx,
        integration_id,
        user_id,
        person_object_types,
    )
    .await
    {
        Ok(_) => Some(SubStepResult {
            status: "started",
            error: None,
        }),
        Err(err) => Some(SubStepResult {
            status: "failed",
            error: Some(err.to_string()),
        }),
    };

    Ok(PostCreateSetupResult {
        webhooks,
        initial_sync,
    })
}

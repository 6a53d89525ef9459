//! Webhook Subscription Manager (§4.6): keeps the three downstream webhook
//! lists (messages, calls, call-summaries) in sync with the set of phone
//! numbers an integration has enabled, respecting the 10-resource-id cap
//! per subscription.

use crate::entities::config::{IntegrationConfig, WebhookSubscription};
use crate::entities::EntityId;
use crate::entities::Timestamp;
use crate::errors::{SyncError, SyncResult};
use crate::telephony::WebhookCreateRequest;

use super::SyncContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WebhookKind {
    Message,
    Call,
    CallSummary,
}

impl WebhookKind {
    const ALL: [WebhookKind; 3] = [WebhookKind::Message, WebhookKind::Call, WebhookKind::CallSummary];

    fn label(self) -> &'static str {
        match self {
            WebhookKind::Message => "Quo message sync",
            WebhookKind::Call => "Quo call sync",
            WebhookKind::CallSummary => "Quo call summary sync",
        }
    }

    fn events(self) -> Vec<String> {
        match self {
            WebhookKind::Message => vec!["message.created".into()],
            WebhookKind::Call => vec!["call.created".into()],
            WebhookKind::CallSummary => vec!["call.summary.created".into()],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThreeWebhookLists {
    pub message: Vec<WebhookSubscription>,
    pub call: Vec<WebhookSubscription>,
    pub call_summary: Vec<WebhookSubscription>,
}

impl ThreeWebhookLists {
    fn push(&mut self, kind: WebhookKind, sub: WebhookSubscription) {
        match kind {
            WebhookKind::Message => self.message.push(sub),
            WebhookKind::Call => self.call.push(sub),
            WebhookKind::CallSummary => self.call_summary.push(sub),
        }
    }
}

/// `createAll`: chunk `phone_ids` into groups of
/// [`crate::telephony::WEBHOOK_RESOURCE_IDS_MAX`], create one subscription
/// per type per chunk. All-or-nothing: any failure deletes everything this
/// call created so far and surfaces the original error.
pub async fn create_all(
    ctx: &SyncContext,
    webhook_url: &str,
    phone_ids: &[String],
) -> SyncResult<ThreeWebhookLists> {
    if phone_ids.is_empty() {
        return Ok(ThreeWebhookLists::default());
    }

    let chunks: Vec<Vec<String>> = phone_ids
        .chunks(crate::telephony::WEBHOOK_RESOURCE_IDS_MAX)
        .map(|c| c.to_vec())
        .collect();
    let multi_batch = chunks.len() > 1;

    let mut lists = ThreeWebhookLists::default();
    let mut created_ids: Vec<String> = Vec::new();

    for kind in WebhookKind::ALL {
        for (i, chunk) in chunks.iter().enumerate() {
            let label = if multi_batch {
                format!("{} (batch {})", kind.label(), i + 1)
            } else {
                kind.label().to_string()
            };
            let request = WebhookCreateRequest {
                url: webhook_url.to_string(),
                events: kind.events(),
                label,
                resource_ids: chunk.clone(),
            };
            let result = match kind {
                WebhookKind::Message => ctx.telephony.create_message_webhook(request).await,
                WebhookKind::Call => ctx.telephony.create_call_webhook(request).await,
                WebhookKind::CallSummary => ctx.telephony.create_call_summary_webhook(request).await,
            };
            match result {
                Ok(webhook) => {
                    created_ids.push(webhook.id.clone());
                    lists.push(
                        kind,
                        WebhookSubscription {
                            id: webhook.id,
                            key: webhook.key,
                            resource_ids: chunk.clone(),
                        },
                    );
                }
                Err(err) => {
                    for id in &created_ids {
                        let _ = ctx.telephony.delete_webhook(id).await;
                    }
                    return Err(err);
                }
            }
        }
    }

    Ok(lists)
}

async fn delete_existing(ctx: &SyncContext, config: &IntegrationConfig) {
    for sub in config
        .quo_message_webhooks
        .iter()
        .chain(config.quo_call_webhooks.iter())
        .chain(config.quo_call_summary_webhooks.iter())
    {
        let _ = ctx.telephony.delete_webhook(&sub.id).await;
    }
    for legacy_id in [
        &config.quo_message_webhook_id,
        &config.quo_call_webhook_id,
        &config.quo_call_summary_webhook_id,
    ]
    .into_iter()
    .flatten()
    {
        let _ = ctx.telephony.delete_webhook(legacy_id).await;
    }
}

/// `recreateAll`: create the new subscriptions before deleting the old
/// ones, minimizing the gap with no live webhook coverage. Deletion
/// failures are logged (best effort) but never fail the call.
pub async fn recreate_all(
    ctx: &SyncContext,
    existing: &IntegrationConfig,
    webhook_url: &str,
    new_phone_ids: &[String],
) -> SyncResult<ThreeWebhookLists> {
    let created = create_all(ctx, webhook_url, new_phone_ids).await?;
    delete_existing(ctx, existing).await;
    Ok(created)
}

/// `fetchPhoneMetadataForIds`: a single `listPhoneNumbers` call, filtered
/// locally to the requested ids.
pub async fn fetch_phone_metadata_for_ids(
    ctx: &SyncContext,
    ids: &[String],
) -> SyncResult<serde_json::Value> {
    let all = ctx.telephony.list_phone_numbers().await?;
    let found: Vec<_> = all.into_iter().filter(|p| ids.contains(&p.id)).collect();
    if found.len() < ids.len() {
        let found_ids: std::collections::HashSet<&String> = found.iter().map(|p| &p.id).collect();
        let missing: Vec<&String> = ids.iter().filter(|id| !found_ids.contains(id)).collect();
        tracing::warn!(?missing, "phone ids not found on downstream platform");
    }
    crate::utils::to_json_value(&found)
}

/// `onUpdate`: apply a (possibly partial) config patch. `patch` may carry
/// `resourceIds` (external name), translated here to the config's
/// `enabled_phone_ids` field before the deep-merge. No-ops against the
/// downstream webhook API when the enabled set doesn't change (§8 invariant 5).
pub async fn on_update(
    ctx: &SyncContext,
    integration_id: EntityId,
    webhook_url: &str,
    mut patch: serde_json::Value,
) -> SyncResult<IntegrationConfig> {
    if let Some(obj) = patch.as_object_mut() {
        if let Some(resource_ids) = obj.remove("resourceIds") {
            obj.insert("enabled_phone_ids".to_string(), resource_ids);
        }
    }

    let existing = ctx.config_store.get(integration_id).await?;
    let mut merged_value = crate::utils::to_json_value(&existing)?;
    crate::utils::deep_merge_json_objects(&mut merged_value, patch);
    let mut merged: IntegrationConfig = crate::utils::from_json_value(merged_value)?;

    if merged.enabled_phone_ids == existing.enabled_phone_ids {
        ctx.config_store.save(integration_id, merged.clone()).await?;
        return Ok(merged);
    }

    let new_phone_ids: Vec<String> = merged.enabled_phone_ids.iter().cloned().collect();
    let metadata = fetch_phone_metadata_for_ids(ctx, &new_phone_ids).await?;

    let lists = recreate_all(ctx, &existing, webhook_url, &new_phone_ids)
        .await
        .map_err(|err| SyncError::config_update(err.to_string()))?;

    merged.phone_numbers_metadata = metadata;
    merged.phone_numbers_fetched_at = Some(Timestamp::now());
    merged.quo_message_webhooks = lists.message;
    merged.quo_call_webhooks = lists.call;
    merged.quo_call_summary_webhooks = lists.call_summary;
    merged.quo_webhooks_created_at = Some(Timestamp::now());
    merged.strip_legacy_fields();

    ctx.config_store.save(integration_id, merged.clone()).await?;
    Ok(merged)
}

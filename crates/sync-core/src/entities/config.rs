//! Per-integration persisted configuration: which phone resources to
//! subscribe to, the cached phone metadata, and the three webhook
//! subscription lists (plus their legacy single-value shape).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::common::Timestamp;

/// One downstream webhook subscription. `resource_ids` never exceeds 10
/// entries (§3 invariant); `label` is suffixed `(batch i+1)` when a type
/// needed more than one subscription to cover all resource ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookSubscription {
    pub id: String,
    pub key: String,
    pub resource_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntegrationConfig {
    pub enabled_phone_ids: BTreeSet<String>,

    #[serde(default)]
    pub phone_numbers_metadata: serde_json::Value,
    pub phone_numbers_fetched_at: Option<Timestamp>,

    #[serde(default)]
    pub quo_message_webhooks: Vec<WebhookSubscription>,
    #[serde(default)]
    pub quo_call_webhooks: Vec<WebhookSubscription>,
    #[serde(default)]
    pub quo_call_summary_webhooks: Vec<WebhookSubscription>,
    pub quo_webhooks_created_at: Option<Timestamp>,

    // Legacy single-subscription shape. Tolerated on read, stripped on the
    // first write that touches the webhook lists (migration-only path).
    #[serde(default)]
    pub quo_message_webhook_id: Option<String>,
    #[serde(default)]
    pub quo_message_webhook_key: Option<String>,
    #[serde(default)]
    pub quo_call_webhook_id: Option<String>,
    #[serde(default)]
    pub quo_call_webhook_key: Option<String>,
    #[serde(default)]
    pub quo_call_summary_webhook_id: Option<String>,
    #[serde(default)]
    pub quo_call_summary_webhook_key: Option<String>,
}

impl IntegrationConfig {
    pub fn has_legacy_fields(&self) -> bool {
        self.quo_message_webhook_id.is_some()
            || self.quo_message_webhook_key.is_some()
            || self.quo_call_webhook_id.is_some()
            || self.quo_call_webhook_key.is_some()
            || self.quo_call_summary_webhook_id.is_some()
            || self.quo_call_summary_webhook_key.is_some()
    }

    /// Removes the legacy single-subscription fields. Called on the first
    /// config write after migrating to the list-based shape.
    pub fn strip_legacy_fields(&mut self) {
        self.quo_message_webhook_id = None;
        self.quo_message_webhook_key = None;
        self.quo_call_webhook_id = None;
        self.quo_call_webhook_key = None;
        self.quo_call_summary_webhook_id = None;
        self.quo_call_summary_webhook_key = None;
    }

    /// All resource ids currently covered by a given webhook list, as a set.
    pub fn covered_resource_ids(list: &[WebhookSubscription]) -> BTreeSet<String> {
        list.iter().flat_map(|s| s.resource_ids.iter().cloned()).collect()
    }
}

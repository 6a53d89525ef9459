//! The downstream telephony platform, treated as a set of opaque RPCs
//! (§2, §6). The concrete HTTP client lives in `sync-telephony`; this
//! module only defines the contract the sync engine calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::crm::QuoContactInput;
use crate::errors::SyncResult;

/// `listContacts.maxResults` filter-parameter cap (§6).
pub const LIST_CONTACTS_MAX_RESULTS: usize = 20;
/// `listPhoneNumbers.maxResults` cap (§6).
pub const LIST_PHONE_NUMBERS_MAX_RESULTS: usize = 100;
/// Webhook `resourceIds` cap per subscription (§3, §4.6).
pub const WEBHOOK_RESOURCE_IDS_MAX: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedContact {
    pub quo_contact_id: String,
    pub external_id: String,
    pub primary_phone_number: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListContactsParams {
    pub external_ids: Vec<String>,
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneNumberRecord {
    pub id: String,
    pub e164: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WebhookCreateRequest {
    pub url: String,
    pub events: Vec<String>,
    pub label: String,
    pub resource_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedWebhook {
    pub id: String,
    pub key: String,
}

/// Opaque RPCs consumed by the Bulk Upsert / Reconciliation loop and the
/// Webhook Subscription Manager. Implementations wrap the downstream
/// platform's HTTP surface; no retry policy is implied here — callers
/// decide how to react to a failure.
#[async_trait]
pub trait TelephonyClient: Send + Sync {
    async fn bulk_create_contacts(&self, contacts: &[QuoContactInput]) -> SyncResult<()>;

    async fn list_contacts(&self, params: ListContactsParams) -> SyncResult<Vec<CreatedContact>>;

    async fn create_frigg_contact(&self, contact: &QuoContactInput) -> SyncResult<String>;

    async fn update_frigg_contact(
        &self,
        quo_contact_id: &str,
        contact: &QuoContactInput,
    ) -> SyncResult<()>;

    async fn list_phone_numbers(&self) -> SyncResult<Vec<PhoneNumberRecord>>;

    async fn create_message_webhook(
        &self,
        request: WebhookCreateRequest,
    ) -> SyncResult<CreatedWebhook>;

    async fn create_call_webhook(&self, request: WebhookCreateRequest) -> SyncResult<CreatedWebhook>;

    async fn create_call_summary_webhook(
        &self,
        request: WebhookCreateRequest,
    ) -> SyncResult<CreatedWebhook>;

    async fn delete_webhook(&self, webhook_id: &str) -> SyncResult<()>;
}

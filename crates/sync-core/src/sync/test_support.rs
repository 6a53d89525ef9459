//! Shared stand-ins for `CrmAdapter`/`TelephonyClient` used across this
//! module's test suites, so each test file doesn't hand-roll its own.

use async_trait::async_trait;

use crate::crm::{
    CrmAdapter, FetchPageParams, PaginationType, PersonObjectType, PersonPage, PersonRecord,
    QueueConfig, QuoContactInput, SyncConfig,
};
use crate::entities::Timestamp;
use crate::errors::SyncResult;
use crate::telephony::{
    CreatedContact, CreatedWebhook, ListContactsParams, PhoneNumberRecord, TelephonyClient,
    WebhookCreateRequest,
};

pub struct NoopAdapter {
    pub pagination_type: PaginationType,
    pub supports_total: bool,
    pub return_full_records: bool,
}

pub fn noop_adapter() -> NoopAdapter {
    NoopAdapter {
        pagination_type: PaginationType::PageBased,
        supports_total: true,
        return_full_records: true,
    }
}

#[async_trait]
impl CrmAdapter for NoopAdapter {
    fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            pagination_type: self.pagination_type,
            supports_total: self.supports_total,
            return_full_records: self.return_full_records,
            reverse_chronological: false,
            initial_batch_size: 100,
            ongoing_batch_size: 50,
            poll_interval_minutes: 15,
        }
    }

    fn person_object_types(&self) -> Vec<PersonObjectType> {
        vec![PersonObjectType {
            crm_object_name: "Contact".into(),
            quo_contact_type: "contact".into(),
        }]
    }

    fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            max_workers: 4,
            provisioned: false,
            max_concurrency: 10,
            batch_size: 10,
            timeout_seconds: 600,
        }
    }

    async fn fetch_person_page(&self, _params: FetchPageParams) -> SyncResult<PersonPage> {
        Ok(PersonPage {
            data: vec![],
            total: Some(0),
            next_cursor: None,
            has_more: false,
        })
    }

    async fn transform_person_to_quo(&self, person: &PersonRecord) -> SyncResult<QuoContactInput> {
        Ok(QuoContactInput {
            external_id: person.id.clone(),
            entity_type: "Contact".into(),
            display_name: String::new(),
            phone_number: None,
            fields: serde_json::json!({}),
        })
    }

    async fn log_sms_to_activity(&self, _: &str, _: &str, _: &str, _: Timestamp) -> SyncResult<()> {
        Ok(())
    }

    async fn log_call_to_activity(&self, _: &str, _: &str, _: u32, _: Timestamp) -> SyncResult<()> {
        Ok(())
    }
}

pub struct NoopTelephony;

pub fn noop_telephony() -> NoopTelephony {
    NoopTelephony
}

#[async_trait]
impl TelephonyClient for NoopTelephony {
    async fn bulk_create_contacts(&self, _: &[QuoContactInput]) -> SyncResult<()> {
        Ok(())
    }
    async fn list_contacts(&self, _: ListContactsParams) -> SyncResult<Vec<CreatedContact>> {
        Ok(vec![])
    }
    async fn create_frigg_contact(&self, _: &QuoContactInput) -> SyncResult<String> {
        Ok("quo-1".into())
    }
    async fn update_frigg_contact(&self, _: &str, _: &QuoContactInput) -> SyncResult<()> {
        Ok(())
    }
    async fn list_phone_numbers(&self) -> SyncResult<Vec<PhoneNumberRecord>> {
        Ok(vec![])
    }
    async fn create_message_webhook(&self, _: WebhookCreateRequest) -> SyncResult<CreatedWebhook> {
        Ok(CreatedWebhook { id: "w".into(), key: "k".into() })
    }
    async fn create_call_webhook(&self, _: WebhookCreateRequest) -> SyncResult<CreatedWebhook> {
        Ok(CreatedWebhook { id: "w".into(), key: "k".into() })
    }
    async fn create_call_summary_webhook(
        &self,
        _: WebhookCreateRequest,
    ) -> SyncResult<CreatedWebhook> {
        Ok(CreatedWebhook { id: "w".into(), key: "k".into() })
    }
    async fn delete_webhook(&self, _: &str) -> SyncResult<()> {
        Ok(())
    }
}

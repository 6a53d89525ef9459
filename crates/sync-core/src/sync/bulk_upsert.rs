//! Bulk Upsert & Reconciliation (§4.5): push a batch of transformed
//! contacts downstream, then read them back to learn their assigned phone
//! numbers and stitch together the `ContactMapping` table.

use std::collections::HashMap;
use std::time::Duration;

use tokio::task::JoinSet;

use super::SyncContext;
use crate::crm::QuoContactInput;
use crate::entities::mapping::{ContactMapping, MappingAction, SyncMethod};
use crate::errors::SyncResult;
use crate::store::MetricsDelta;
use crate::telephony::{CreatedContact, ListContactsParams, LIST_CONTACTS_MAX_RESULTS};

/// Gap left for the downstream platform to finish indexing a
/// `bulkCreateContacts` call before a read-back can see it (§4.5, §9).
pub const READ_BACK_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct UpsertError {
    pub error: String,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BulkUpsertResult {
    pub success_count: u64,
    pub error_count: u64,
    pub errors: Vec<UpsertError>,
}

impl From<BulkUpsertResult> for MetricsDelta {
    fn from(result: BulkUpsertResult) -> Self {
        MetricsDelta {
            processed: result.success_count + result.error_count,
            success: result.success_count,
            errors: result.error_count,
            error_details: result
                .errors
                .into_iter()
                .map(|e| (e.error, e.external_id))
                .collect(),
        }
    }
}

/// `bulkUpsertToQuo`: push `contacts` downstream, wait out the indexing
/// delay, then read every contact back in parallel chunks of
/// [`LIST_CONTACTS_MAX_RESULTS`] to learn assigned phone numbers.
pub async fn bulk_upsert_to_quo(
    ctx: &SyncContext,
    contacts: &[QuoContactInput],
) -> SyncResult<BulkUpsertResult> {
    if contacts.is_empty() {
        return Ok(BulkUpsertResult::default());
    }

    if let Err(err) = ctx.telephony.bulk_create_contacts(contacts).await {
        return Ok(BulkUpsertResult {
            success_count: 0,
            error_count: contacts.len() as u64,
            errors: vec![UpsertError {
                error: err.to_string(),
                external_id: None,
            }],
        });
    }

    crate::utils::sleep(chrono::Duration::from_std(READ_BACK_DELAY).unwrap()).await;

    let external_ids: Vec<String> = contacts.iter().map(|c| c.external_id.clone()).collect();
    let mut created_by_external_id: HashMap<String, CreatedContact> = HashMap::new();
    let mut joins = JoinSet::new();
    for chunk in external_ids.chunks(LIST_CONTACTS_MAX_RESULTS) {
        let telephony = ctx.telephony.clone();
        let chunk = chunk.to_vec();
        joins.spawn(async move {
            telephony
                .list_contacts(ListContactsParams {
                    external_ids: chunk,
                    max_results: LIST_CONTACTS_MAX_RESULTS,
                })
                .await
        });
    }
    while let Some(joined) = joins.join_next().await {
        let chunk_result = joined.map_err(|e| crate::errors::SyncError::internal(e.to_string()))??;
        for created in chunk_result {
            created_by_external_id.insert(created.external_id.clone(), created);
        }
    }

    let mut result = BulkUpsertResult::default();
    for external_id in &external_ids {
        let Some(created) = created_by_external_id.get(external_id) else {
            result.error_count += 1;
            result.errors.push(UpsertError {
                error: "Contact not found after bulk create".into(),
                external_id: Some(external_id.clone()),
            });
            continue;
        };

        let Some(phone) = &created.primary_phone_number else {
            result.error_count += 1;
            result.errors.push(UpsertError {
                error: "No phone number available".into(),
                external_id: Some(external_id.clone()),
            });
            continue;
        };

        let mapping = ContactMapping::new(
            created.external_id.clone(),
            created.quo_contact_id.clone(),
            phone.clone(),
            "Contact",
            SyncMethod::Bulk,
            MappingAction::Created,
        );
        match ctx.mapping_store.upsert_mapping(phone, mapping).await {
            Ok(()) => result.success_count += 1,
            Err(err) => {
                result.error_count += 1;
                result.errors.push(UpsertError {
                    error: err.to_string(),
                    external_id: Some(external_id.clone()),
                });
            }
        }
    }

    Ok(result)
}

#[derive(Debug, Clone)]
pub struct SingleUpsertResult {
    pub action: MappingAction,
    pub quo_contact_id: String,
    pub external_id: String,
}

/// `upsertContactToQuo`: the single-contact counterpart used by the
/// webhook-triggered update path, rather than the bulk sync pipeline.
pub async fn upsert_contact_to_quo(
    ctx: &SyncContext,
    contact: &QuoContactInput,
) -> SyncResult<SingleUpsertResult> {
    let existing = ctx
        .telephony
        .list_contacts(ListContactsParams {
            external_ids: vec![contact.external_id.clone()],
            max_results: 1,
        })
        .await?;

    let (action, quo_contact_id) = match existing.into_iter().next() {
        Some(found) => {
            ctx.telephony
                .update_frigg_contact(&found.quo_contact_id, contact)
                .await?;
            (MappingAction::Updated, found.quo_contact_id)
        }
        None => {
            let quo_contact_id = ctx.telephony.create_frigg_contact(contact).await?;
            (MappingAction::Created, quo_contact_id)
        }
    };

    if let Some(phone) = &contact.phone_number {
        let mapping = ContactMapping::new(
            contact.external_id.clone(),
            quo_contact_id.clone(),
            phone.clone(),
            contact.entity_type.clone(),
            SyncMethod::Upsert,
            action,
        );
        ctx.mapping_store.upsert_mapping(phone, mapping).await?;
    }

    Ok(SingleUpsertResult {
        action,
        quo_contact_id,
        external_id: contact.external_id.clone(),
    })
}

/// What `process_and_upsert` has in hand for a batch of persons.
pub enum PersonBatch {
    /// Bare ids — `PROCESS_PERSON_BATCH` only ever carries ids (full
    /// payloads would bloat the queue message), so this is what
    /// `page_based`'s fanned-out batch handler always supplies.
    Ids(Vec<String>),
    /// Full records already in hand from the page fetch — `cursor_based`
    /// processes each page inline with no queue serialization in between,
    /// so when the adapter's `return_full_records` is set there is nothing
    /// to gain from discarding the payload and re-fetching it.
    Records(Vec<crate::crm::PersonRecord>),
}

/// Shared tail of both pagination strategies: fetch full records if all
/// the caller has is ids, transform, and bulk-upsert. Used by
/// `page_based`'s batch handler and `cursor_based`'s inline processing.
pub async fn process_and_upsert(
    ctx: &SyncContext,
    batch: PersonBatch,
) -> SyncResult<BulkUpsertResult> {
    let persons = match batch {
        PersonBatch::Records(persons) => persons,
        PersonBatch::Ids(ids) => ctx.crm.fetch_persons_by_ids(&ids).await?,
    };
    let quo_contacts = ctx.crm.transform_persons_to_quo(&persons).await?;
    bulk_upsert_to_quo(ctx, &quo_contacts).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::sync::test_support::{noop_adapter, noop_telephony, NoopTelephony};
    use crate::store::config_store::in_memory::InMemoryConfigStore;
    use crate::store::mapping_store::in_memory::InMemoryMappingStore;
    use crate::store::process_store::in_memory::InMemoryProcessStore;
    use crate::telephony::TelephonyClient;

    fn contact(external_id: &str) -> QuoContactInput {
        QuoContactInput {
            external_id: external_id.into(),
            entity_type: "Contact".into(),
            display_name: external_id.into(),
            phone_number: None,
            fields: serde_json::json!({}),
        }
    }

    struct PartialReadBackTelephony;

    #[async_trait]
    impl TelephonyClient for PartialReadBackTelephony {
        async fn bulk_create_contacts(&self, _: &[QuoContactInput]) -> SyncResult<()> {
            Ok(())
        }
        async fn list_contacts(
            &self,
            _params: ListContactsParams,
        ) -> SyncResult<Vec<CreatedContact>> {
            Ok(vec![CreatedContact {
                quo_contact_id: "quo-a".into(),
                external_id: "a".into(),
                primary_phone_number: Some("+15551111111".into()),
            }])
        }
        async fn create_frigg_contact(&self, _: &QuoContactInput) -> SyncResult<String> {
            Ok("quo-1".into())
        }
        async fn update_frigg_contact(&self, _: &str, _: &QuoContactInput) -> SyncResult<()> {
            Ok(())
        }
        async fn list_phone_numbers(&self) -> SyncResult<Vec<crate::telephony::PhoneNumberRecord>> {
            Ok(vec![])
        }
        async fn create_message_webhook(
            &self,
            _: crate::telephony::WebhookCreateRequest,
        ) -> SyncResult<crate::telephony::CreatedWebhook> {
            unimplemented!()
        }
        async fn create_call_webhook(
            &self,
            _: crate::telephony::WebhookCreateRequest,
        ) -> SyncResult<crate::telephony::CreatedWebhook> {
            unimplemented!()
        }
        async fn create_call_summary_webhook(
            &self,
            _: crate::telephony::WebhookCreateRequest,
        ) -> SyncResult<crate::telephony::CreatedWebhook> {
            unimplemented!()
        }
        async fn delete_webhook(&self, _: &str) -> SyncResult<()> {
            Ok(())
        }
    }

    fn ctx_with_telephony(telephony: Arc<dyn TelephonyClient>) -> SyncContext {
        SyncContext {
            queue: Arc::new(crate::queue::InMemoryQueue::new()),
            queue_url: "https://queue.example/sync".into(),
            process_store: Arc::new(InMemoryProcessStore::new()),
            mapping_store: Arc::new(InMemoryMappingStore::new()),
            config_store: Arc::new(InMemoryConfigStore::new()),
            crm: Arc::new(noop_adapter()),
            telephony,
        }
    }

    #[tokio::test]
    async fn empty_input_is_a_no_op() {
        let ctx = ctx_with_telephony(Arc::new(noop_telephony()));
        let result = bulk_upsert_to_quo(&ctx, &[]).await.unwrap();
        assert_eq!(result.success_count, 0);
        assert_eq!(result.error_count, 0);
    }

    #[tokio::test]
    async fn partial_read_back_accounts_missing_contacts_as_errors() {
        let ctx = ctx_with_telephony(Arc::new(PartialReadBackTelephony));
        let contacts = vec![contact("a"), contact("b"), contact("c")];
        let result = bulk_upsert_to_quo(&ctx, &contacts).await.unwrap();

        assert_eq!(result.success_count, 1);
        assert_eq!(result.error_count, 2);
        let missing: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.error == "Contact not found after bulk create")
            .map(|e| e.external_id.clone().unwrap())
            .collect();
        assert_eq!(missing.len(), 2);
        assert!(missing.contains(&"b".to_string()));
        assert!(missing.contains(&"c".to_string()));

        let mapping = ctx
            .mapping_store
            .get_mapping("+15551111111")
            .await
            .unwrap();
        assert!(mapping.is_some());
    }

    struct FailingBulkCreate;

    #[async_trait]
    impl TelephonyClient for FailingBulkCreate {
        async fn bulk_create_contacts(&self, _: &[QuoContactInput]) -> SyncResult<()> {
            Err(crate::errors::SyncError::transient_fetch("quo", "timeout"))
        }
        async fn list_contacts(&self, _: ListContactsParams) -> SyncResult<Vec<CreatedContact>> {
            Ok(vec![])
        }
        async fn create_frigg_contact(&self, _: &QuoContactInput) -> SyncResult<String> {
            unimplemented!()
        }
        async fn update_frigg_contact(&self, _: &str, _: &QuoContactInput) -> SyncResult<()> {
            unimplemented!()
        }
        async fn list_phone_numbers(&self) -> SyncResult<Vec<crate::telephony::PhoneNumberRecord>> {
            Ok(vec![])
        }
        async fn create_message_webhook(
            &self,
            _: crate::telephony::WebhookCreateRequest,
        ) -> SyncResult<crate::telephony::CreatedWebhook> {
            unimplemented!()
        }
        async fn create_call_webhook(
            &self,
            _: crate::telephony::WebhookCreateRequest,
        ) -> SyncResult<crate::telephony::CreatedWebhook> {
            unimplemented!()
        }
        async fn create_call_summary_webhook(
            &self,
            _: crate::telephony::WebhookCreateRequest,
        ) -> SyncResult<crate::telephony::CreatedWebhook> {
            unimplemented!()
        }
        async fn delete_webhook(&self, _: &str) -> SyncResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn bulk_create_contacts_failure_fails_every_contact() {
        let ctx = ctx_with_telephony(Arc::new(FailingBulkCreate));
        let contacts = vec![contact("a"), contact("b")];
        let result = bulk_upsert_to_quo(&ctx, &contacts).await.unwrap();
        assert_eq!(result.success_count, 0);
        assert_eq!(result.error_count, 2);
        assert_eq!(result.errors.len(), 1);
    }

    #[tokio::test]
    async fn single_upsert_creates_when_not_found() {
        let ctx = ctx_with_telephony(Arc::new(NoopTelephony));
        let mut c = contact("new-1");
        c.phone_number = Some("+15552222222".into());
        let result = upsert_contact_to_quo(&ctx, &c).await.unwrap();
        assert_eq!(result.action, MappingAction::Created);
        assert!(ctx
            .mapping_store
            .get_mapping("+15552222222")
            .await
            .unwrap()
            .is_some());
    }
}

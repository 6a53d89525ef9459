use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use sync_core::crm::QuoContactInput;
use sync_core::errors::SyncResult;
use sync_core::telephony::{
    CreatedContact, CreatedWebhook, ListContactsParams, PhoneNumberRecord, TelephonyClient,
    WebhookCreateRequest, LIST_CONTACTS_MAX_RESULTS, LIST_PHONE_NUMBERS_MAX_RESULTS,
    WEBHOOK_RESOURCE_IDS_MAX,
};

use crate::error::QuoApiError;
use crate::types::{
    ApiErrorBody, BulkCreateContactsRequest, BulkCreateContactsResponse, ContactInputDto,
    CreateContactRequest, CreateContactResponse, CreateWebhookRequest, CreateWebhookResponse,
    ListContactsResponse, ListPhoneNumbersResponse,
};

/// Configuration for the telephony platform's HTTP surface.
#[derive(Debug, Clone)]
pub struct QuoClientConfig {
    pub api_key: String,
    /// Base URL for the platform API (default: `https://api.quo.example/v1`)
    pub base_url: String,
}

impl Default for QuoClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.quo.example/v1".to_string(),
        }
    }
}

/// HTTP client for the downstream telephony platform's opaque RPC surface.
#[derive(Debug)]
pub struct QuoClient {
    config: QuoClientConfig,
    http_client: HttpClient,
}

impl QuoClient {
    pub fn new(config: QuoClientConfig) -> Result<Self, QuoApiError> {
        let http_client = HttpClient::builder()
            .user_agent("sync-telephony/0.1.0")
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn handle_response<T>(&self, response: Response) -> Result<T, QuoApiError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response.text().await?;

        debug!(status = %status, "telephony API response");

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| QuoApiError::Decode(e.to_string()))
        } else {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| body.clone());
            error!(status = %status, %message, "telephony API error");
            Err(QuoApiError::Http {
                status: status.as_u16(),
                body: message,
            })
        }
    }

    fn to_dto(contact: &QuoContactInput) -> ContactInputDto {
        ContactInputDto {
            external_id: contact.external_id.clone(),
            entity_type: contact.entity_type.clone(),
            display_name: contact.display_name.clone(),
            phone_number: contact.phone_number.clone(),
            fields: contact.fields.clone(),
        }
    }
}

#[async_trait]
impl TelephonyClient for QuoClient {
    async fn bulk_create_contacts(&self, contacts: &[QuoContactInput]) -> SyncResult<()> {
        let request = BulkCreateContactsRequest {
            contacts: contacts.iter().map(Self::to_dto).collect(),
        };

        debug!(count = contacts.len(), "bulk creating contacts");

        let response = self
            .http_client
            .post(self.url("/contacts/bulk"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(QuoApiError::from)?;

        let _: BulkCreateContactsResponse = self.handle_response(response).await?;
        Ok(())
    }

    async fn list_contacts(&self, params: ListContactsParams) -> SyncResult<Vec<CreatedContact>> {
        if params.max_results > LIST_CONTACTS_MAX_RESULTS {
            return Err(QuoApiError::LimitExceeded {
                field: "maxResults",
                limit: LIST_CONTACTS_MAX_RESULTS,
                actual: params.max_results,
            }
            .into());
        }

        let response = self
            .http_client
            .get(self.url("/contacts"))
            .bearer_auth(&self.config.api_key)
            .query(&[("maxResults", params.max_results.to_string())])
            .query(&[("externalIds", params.external_ids.join(","))])
            .send()
            .await
            .map_err(QuoApiError::from)?;

        let body: ListContactsResponse = self.handle_response(response).await?;
        Ok(body
            .contacts
            .into_iter()
            .map(|c| CreatedContact {
                quo_contact_id: c.id,
                external_id: c.external_id,
                primary_phone_number: c.primary_phone_number,
            })
            .collect())
    }

    async fn create_frigg_contact(&self, contact: &QuoContactInput) -> SyncResult<String> {
        let request = CreateContactRequest {
            contact: Self::to_dto(contact),
        };

        let response = self
            .http_client
            .post(self.url("/contacts"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(QuoApiError::from)?;

        let body: CreateContactResponse = self.handle_response(response).await?;
        Ok(body.id)
    }

    async fn update_frigg_contact(
        &self,
        quo_contact_id: &str,
        contact: &QuoContactInput,
    ) -> SyncResult<()> {
        let request = CreateContactRequest {
            contact: Self::to_dto(contact),
        };

        let response = self
            .http_client
            .put(self.url(&format!("/contacts/{quo_contact_id}")))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(QuoApiError::from)?;

        let _: serde_json::Value = self.handle_response(response).await?;
        Ok(())
    }

    async fn list_phone_numbers(&self) -> SyncResult<Vec<PhoneNumberRecord>> {
        let response = self
            .http_client
            .get(self.url("/phone-numbers"))
            .bearer_auth(&self.config.api_key)
            .query(&[("maxResults", LIST_PHONE_NUMBERS_MAX_RESULTS.to_string())])
            .send()
            .await
            .map_err(QuoApiError::from)?;

        let body: ListPhoneNumbersResponse = self.handle_response(response).await?;
        Ok(body
            .phone_numbers
            .into_iter()
            .map(|p| PhoneNumberRecord {
                id: p.id,
                e164: p.e164,
                display_name: p.display_name,
            })
            .collect())
    }

    async fn create_message_webhook(
        &self,
        request: WebhookCreateRequest,
    ) -> SyncResult<CreatedWebhook> {
        self.create_webhook("/webhooks/messages", request).await
    }

    async fn create_call_webhook(&self, request: WebhookCreateRequest) -> SyncResult<CreatedWebhook> {
        self.create_webhook("/webhooks/calls", request).await
    }

    async fn create_call_summary_webhook(
        &self,
        request: WebhookCreateRequest,
    ) -> SyncResult<CreatedWebhook> {
        self.create_webhook("/webhooks/call-summaries", request).await
    }

    async fn delete_webhook(&self, webhook_id: &str) -> SyncResult<()> {
        let response = self
            .http_client
            .delete(self.url(&format!("/webhooks/{webhook_id}")))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(QuoApiError::from)?;

        if response.status().is_success() || response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(())
        } else {
            let _: serde_json::Value = self.handle_response(response).await?;
            Ok(())
        }
    }
}

impl QuoClient {
    async fn create_webhook(
        &self,
        path: &str,
        request: WebhookCreateRequest,
    ) -> SyncResult<CreatedWebhook> {
        if request.resource_ids.len() > WEBHOOK_RESOURCE_IDS_MAX {
            return Err(QuoApiError::LimitExceeded {
                field: "resourceIds",
                limit: WEBHOOK_RESOURCE_IDS_MAX,
                actual: request.resource_ids.len(),
            }
            .into());
        }

        let body = CreateWebhookRequest {
            url: request.url,
            events: request.events,
            label: request.label,
            resource_ids: request.resource_ids,
        };

        let response = self
            .http_client
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(QuoApiError::from)?;

        let created: CreateWebhookResponse = self.handle_response(response).await?;
        Ok(CreatedWebhook {
            id: created.id,
            key: created.key,
        })
    }
}

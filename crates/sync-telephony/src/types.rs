//! Wire DTOs for the telephony platform's JSON surface. Kept separate from
//! `sync_core::telephony`'s domain types so a field rename or casing change
//! on the wire never has to touch the engine's contract.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ContactInputDto {
    #[serde(rename = "externalId")]
    pub external_id: String,
    #[serde(rename = "entityType")]
    pub entity_type: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "phoneNumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub fields: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkCreateContactsRequest {
    pub contacts: Vec<ContactInputDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkCreateContactsResponse {
    #[serde(default)]
    pub accepted: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactDto {
    pub id: String,
    #[serde(rename = "externalId")]
    pub external_id: String,
    #[serde(rename = "primaryPhoneNumber")]
    pub primary_phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListContactsResponse {
    #[serde(default)]
    pub contacts: Vec<ContactDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateContactRequest {
    #[serde(flatten)]
    pub contact: ContactInputDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContactResponse {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhoneNumberDto {
    pub id: String,
    pub e164: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListPhoneNumbersResponse {
    #[serde(default, rename = "phoneNumbers")]
    pub phone_numbers: Vec<PhoneNumberDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateWebhookRequest {
    pub url: String,
    pub events: Vec<String>,
    pub label: String,
    #[serde(rename = "resourceIds")]
    pub resource_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWebhookResponse {
    pub id: String,
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

//! Shapes of the IAM v2 responses the proxies read back.
//!
//! Only the fields the proxies use are modelled, anything else the API returns is ignored.
//!
//! ```json
//! {
//!   "id": "sa-12345",
//!   "display_name": "svc-a",
//!   "description": "Svc-A",
//!   "metadata": { "self": "https://api.confluent.cloud/iam/v2/service-accounts/sa-12345" }
//! }
//! ```
//!
//! API keys nest their attributes under `spec`, and `secret` is only there in the response to
//! the creation:
//!
//! ```json
//! {
//!   "id": "ABCDEFGH",
//!   "metadata": { "self": "https://api.confluent.cloud/iam/v2/api-keys/ABCDEFGH" },
//!   "spec": {
//!     "owner": { "id": "sa-12345" },
//!     "resource": { "id": "lkc-67890" },
//!     "display_name": "sa-12345::lkc-67890",
//!     "description": "Sa-12345 Lkc-67890",
//!     "secret": "..."
//!   }
//! }
//! ```
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObjectMetadata {
    #[serde(rename = "self")]
    pub self_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Reference to another object by id.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObjectReference {
    pub id: String,
}

/// Collection responses wrap their entries in `data`.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct Collection<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceAccountData {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub metadata: ObjectMetadata,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct ApiKeySpec {
    pub owner: ObjectReference,
    /// Cloud API keys are not scoped to a resource.
    #[serde(default)]
    pub resource: Option<ObjectReference>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
}

/// Entry of the API keys listing.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct ApiKeySummary {
    pub id: String,
    pub spec: ApiKeySpec,
}

/// Full API key as returned on creation.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct ApiKeyData {
    pub id: String,
    pub metadata: ObjectMetadata,
    pub spec: ApiKeySpec,
}

use serde_json::{Value, json};
use std::fmt;
use tracing::debug;

use crate::transport::{ApiResponse, Transport};

use super::{
    API_KEYS_PATH, IamError, IamObject, Resource,
    model::ApiKeyData,
    read_back, resolve, resolve_required, title_case,
};

/// Proxy of an API key granting its owner access to a resource.
pub struct ApiKey<'a, T>
where
    T: Transport,
{
    transport: &'a T,
    resource: Resource,
    owner_id: Option<String>,
    resource_id: Option<String>,
    /// Only known right after creation, the API never returns it again.
    secret: Option<String>,
}

/// Attributes of a key about to be created, once defaults are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKeyCreation {
    pub owner_id: String,
    pub resource_id: String,
    pub display_name: String,
    pub description: String,
}

impl ApiKeyCreation {
    pub fn payload(&self) -> Value {
        json!({
            "spec": {
                "owner": { "id": self.owner_id },
                "resource": { "id": self.resource_id },
                "display_name": self.display_name,
                "description": self.description,
            }
        })
    }
}

impl<'a, T> ApiKey<'a, T>
where
    T: Transport,
{
    pub fn new(transport: &'a T) -> Self {
        Self {
            transport,
            resource: Resource::new(Some(API_KEYS_PATH)),
            owner_id: None,
            resource_id: None,
            secret: None,
        }
    }

    pub(crate) fn imported(
        transport: &'a T,
        id: String,
        owner_id: String,
        resource_id: Option<String>,
    ) -> Self {
        Self {
            owner_id: Some(owner_id),
            resource_id,
            ..Self::new(transport).with_id(id)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.resource.id = Some(id.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.resource.display_name = Some(display_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.resource.description = Some(description.into());
        self
    }

    pub fn with_owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// Applies the creation defaults: every attribute is taken from the argument, else from the
    /// key itself. Owner and resource are required; the display name defaults to
    /// `<owner>::<resource>` and the description to the title cased display name with `::`
    /// replaced by a space.
    pub fn resolve_creation(
        &self,
        owner_id: Option<&str>,
        resource_id: Option<&str>,
        display_name: Option<&str>,
        description: Option<&str>,
    ) -> Result<ApiKeyCreation, IamError> {
        let owner_id = resolve_required(owner_id, self.owner_id(), "owner_id")?;
        let resource_id = resolve_required(resource_id, self.resource_id(), "resource_id")?;
        let display_name = resolve(display_name, self.display_name(), || {
            format!("{owner_id}::{resource_id}")
        });
        let description = resolve(description, self.description(), || {
            title_case(&display_name.replace("::", " "))
        });
        Ok(ApiKeyCreation {
            owner_id,
            resource_id,
            display_name,
            description,
        })
    }

    /// Creates the key. On success the id, link, owner and resource are taken from the
    /// response, which is also the only time the secret is available.
    pub fn create(
        &mut self,
        owner_id: Option<&str>,
        resource_id: Option<&str>,
        display_name: Option<&str>,
        description: Option<&str>,
    ) -> Result<ApiResponse, IamError> {
        let creation = self.resolve_creation(owner_id, resource_id, display_name, description)?;
        let url = format!("{}{}", self.transport.base_url(), API_KEYS_PATH);
        let response = self.transport.post(&url, &creation.payload())?;

        let created: ApiKeyData = read_back(&response)?;
        debug!(
            "api key {} created for owner {}",
            created.id, created.spec.owner.id
        );
        let spec = created.spec;
        self.resource.id = Some(created.id);
        self.resource.self_link = Some(created.metadata.self_link);
        self.resource.display_name = Some(spec.display_name.unwrap_or(creation.display_name));
        self.resource.description = Some(spec.description.unwrap_or(creation.description));
        self.owner_id = Some(spec.owner.id);
        self.resource_id = spec.resource.map(|r| r.id);
        self.secret = spec.secret;
        Ok(response)
    }
}

impl<T> IamObject for ApiKey<'_, T>
where
    T: Transport,
{
    type Transport = T;

    fn transport(&self) -> &T {
        self.transport
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}

impl<T> fmt::Debug for ApiKey<'_, T>
where
    T: Transport,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("resource", &self.resource)
            .field("owner_id", &self.owner_id)
            .field("resource_id", &self.resource_id)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

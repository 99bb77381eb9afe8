use serde_json::Value;

use crate::iam::{ApiKey, IamObject};
use crate::parameters::ApiKeyCommands;
use crate::transport::Transport;

use super::CommandError;

pub struct ApiKeyCommand<'a, T>
where
    T: Transport,
{
    transport: &'a T,
}

impl<'a, T> ApiKeyCommand<'a, T>
where
    T: Transport,
{
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Runs the command and returns the body of the API response.
    pub fn run(&self, command: ApiKeyCommands) -> Result<Value, CommandError> {
        let response = match command {
            ApiKeyCommands::Create {
                owner_id,
                resource_id,
                display_name,
                description,
            } => ApiKey::new(self.transport).create(
                Some(&owner_id),
                Some(&resource_id),
                display_name.as_deref(),
                description.as_deref(),
            )?,
            ApiKeyCommands::Get { id } => ApiKey::new(self.transport).with_id(id).read()?,
            ApiKeyCommands::Update { id, description } => ApiKey::new(self.transport)
                .with_id(id)
                .update(&description)?,
            ApiKeyCommands::Delete { id } => ApiKey::new(self.transport).with_id(id).delete()?,
        };
        Ok(response.json()?)
    }
}

use serde_json::{Value, json};

use crate::iam::{ApiKey, IamObject, ServiceAccount};
use crate::parameters::ServiceAccountCommands;
use crate::transport::Transport;

use super::CommandError;

pub struct ServiceAccountCommand<'a, T>
where
    T: Transport,
{
    transport: &'a T,
}

impl<'a, T> ServiceAccountCommand<'a, T>
where
    T: Transport,
{
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Runs the command and returns what should be shown to the user.
    pub fn run(&self, command: ServiceAccountCommands) -> Result<Value, CommandError> {
        match command {
            ServiceAccountCommands::Create {
                display_name,
                description,
            } => {
                let mut account =
                    ServiceAccount::new(self.transport).with_display_name(display_name);
                if let Some(description) = description {
                    account = account.with_description(description);
                }
                Ok(account.create()?.json()?)
            }
            ServiceAccountCommands::Get { id, display_name } => {
                let mut account = ServiceAccount::new(self.transport);
                account.set_from_read(display_name.as_deref(), id.as_deref())?;
                if account.id().is_none() {
                    return Err(CommandError::NotFound(display_name.unwrap_or_default()));
                }
                Ok(json!({
                    "id": account.id(),
                    "display_name": account.display_name(),
                    "description": account.description(),
                    "self": account.href()?,
                }))
            }
            ServiceAccountCommands::List => {
                let account = ServiceAccount::new(self.transport);
                match account.list()? {
                    Some(response) => Ok(response.json()?),
                    None => Ok(Value::Null),
                }
            }
            ServiceAccountCommands::Update { id, description } => {
                let account = ServiceAccount::new(self.transport).with_id(id);
                Ok(account.update(&description)?.json()?)
            }
            ServiceAccountCommands::Delete { id } => {
                let account = ServiceAccount::new(self.transport).with_id(id);
                Ok(account.delete()?.json()?)
            }
            ServiceAccountCommands::ApiKeys { id } => {
                let mut account = ServiceAccount::new(self.transport).with_id(id);
                account.import_api_keys()?;
                Ok(account.api_keys().iter().map(key_summary).collect())
            }
        }
    }
}

fn key_summary<T: Transport>(key: &ApiKey<'_, T>) -> Value {
    json!({
        "id": key.id(),
        "owner_id": key.owner_id(),
        "resource_id": key.resource_id(),
    })
}

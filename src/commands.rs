pub mod api_key;
pub mod service_account;

use thiserror::Error;

use crate::iam::IamError;
use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("iam error: `{0}`")]
    Iam(#[from] IamError),
    #[error("no service account named `{0}`")]
    NotFound(String),
}

impl From<TransportError> for CommandError {
    fn from(err: TransportError) -> Self {
        CommandError::Iam(err.into())
    }
}

use thiserror::Error;

use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum IamError {
    /// Raised before any call when an attribute the operation needs has no value.
    #[error("missing required attribute: `{0}`")]
    MissingAttribute(&'static str),
    #[error("cannot resolve the object link: no self link and no id set")]
    UnresolvableLink,
    /// A successful response that lacks the fields read back from it.
    #[error("unexpected response payload: `{0}`")]
    Decoder(String),
    #[error("transport error: `{0}`")]
    Transport(#[from] TransportError),
}

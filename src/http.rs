//! Concrete HTTP stack used by the CLI and by library consumers that do not bring their own
//! [crate::http_client::HttpClient].

pub mod client;
pub mod config;

//! Client side proxies for the Confluent Cloud IAM v2 API: service accounts and API keys.
//!
//! The proxies in [iam] are written against the [transport::Transport] trait. The crate ships
//! [transport::HttpTransport], which runs on any [http_client::HttpClient] such as the
//! reqwest based [http::client::HttpClient].

pub mod commands;
pub mod http;
pub mod http_client;
pub mod iam;
pub mod parameters;
pub mod transport;

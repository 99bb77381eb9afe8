//! The transport the IAM proxies talk through.
//!
//! [Transport] is the seam the proxies are written against: four verbs plus the base url
//! links are built from. [HttpTransport] implements it on top of any [HttpClient],
//! authenticating every request with a Cloud API key.

use base64::{Engine, engine::general_purpose};
use http::{
    HeaderValue, Method, Request, StatusCode, Uri,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::http_client::{HttpClient, HttpClientError};

pub const DEFAULT_API_URL: &str = "https://api.confluent.cloud";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("http client error: `{0}`")]
    Http(#[from] HttpClientError),
    #[error("error encoding the request: `{0}`")]
    Encoder(String),
    #[error("error decoding the response payload: `{0}`")]
    Decoder(String),
    #[error("unsuccessful HTTP response: Status code: `{0}`, Body: `{1}`")]
    UnsuccessfulResponse(u16, String),
}

/// Response of a successful call, kept raw so callers can inspect it as they need.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Deserializes the body. An empty body decodes as JSON `null`, which is what a
    /// `204 No Content` to a DELETE looks like.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        let body: &[u8] = if self.body.is_empty() {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|e| {
            TransportError::Decoder(format!(
                "{e}. Response body: {}",
                String::from_utf8_lossy(&self.body)
            ))
        })
    }
}

/// The calls the IAM proxies need from the outside world.
///
/// Implementations report any failure (unsuccessful status included) as a [TransportError].
pub trait Transport {
    /// Url every API path is appended to, without trailing slash.
    fn base_url(&self) -> &str;
    fn get(&self, url: &str) -> Result<ApiResponse, TransportError>;
    fn post(&self, url: &str, body: &Value) -> Result<ApiResponse, TransportError>;
    fn patch(&self, url: &str, body: &Value) -> Result<ApiResponse, TransportError>;
    fn delete(&self, url: &str) -> Result<ApiResponse, TransportError>;
}

/// Cloud API key used for HTTP basic authentication.
#[derive(Clone, PartialEq)]
pub struct ApiCredentials {
    key: String,
    secret: String,
}

impl ApiCredentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn basic_auth_header(&self) -> Result<HeaderValue, TransportError> {
        let encoded = general_purpose::STANDARD.encode(format!("{}:{}", self.key, self.secret));
        let mut header = HeaderValue::from_str(&format!("Basic {encoded}")).map_err(|_| {
            TransportError::Encoder("invalid HTTP header value set for Authorization".to_string())
        })?;
        header.set_sensitive(true);
        Ok(header)
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum TransportConfigError {
    #[error("invalid api url `{0}`: `{1}`")]
    InvalidUrl(String, String),
}

/// Where and as whom [HttpTransport] talks to the API.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    base_url: String,
    credentials: ApiCredentials,
}

impl TransportConfig {
    pub fn new(base_url: &str, credentials: ApiCredentials) -> Result<Self, TransportConfigError> {
        let uri = base_url
            .parse::<Uri>()
            .map_err(|e| TransportConfigError::InvalidUrl(base_url.to_string(), e.to_string()))?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return Err(TransportConfigError::InvalidUrl(
                base_url.to_string(),
                "an absolute url with scheme and host is required".to_string(),
            ));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &ApiCredentials {
        &self.credentials
    }
}

/// [Transport] implementation over a generic [HttpClient].
pub struct HttpTransport<C>
where
    C: HttpClient,
{
    http_client: C,
    config: TransportConfig,
}

impl<C> HttpTransport<C>
where
    C: HttpClient,
{
    pub fn new(http_client: C, config: TransportConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    fn build_request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Request<Vec<u8>>, TransportError> {
        let builder = http::Request::builder()
            .uri(url)
            .method(method)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, self.config.credentials.basic_auth_header()?);

        let request = match body {
            Some(body) => {
                let json_body = serde_json::to_vec(body)
                    .map_err(|e| TransportError::Encoder(format!("Failed to encode JSON: {e}")))?;
                builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(json_body)
            }
            None => builder.body(Vec::new()),
        };

        request.map_err(|e| TransportError::Encoder(format!("Failed to build request: {e}")))
    }

    fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, TransportError> {
        debug!("{method} {url}");
        let request = self.build_request(method, url, body)?;
        let response = self.http_client.send(request)?;
        let status = response.status();
        let body = response.into_body();
        if !status.is_success() {
            debug!("unsuccessful response: {status}");
            return Err(TransportError::UnsuccessfulResponse(
                status.as_u16(),
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }
        Ok(ApiResponse::new(status, body))
    }
}

impl<C> Transport for HttpTransport<C>
where
    C: HttpClient,
{
    fn base_url(&self) -> &str {
        self.config.base_url()
    }

    fn get(&self, url: &str) -> Result<ApiResponse, TransportError> {
        self.execute(Method::GET, url, None)
    }

    fn post(&self, url: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        self.execute(Method::POST, url, Some(body))
    }

    fn patch(&self, url: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        self.execute(Method::PATCH, url, Some(body))
    }

    fn delete(&self, url: &str) -> Result<ApiResponse, TransportError> {
        self.execute(Method::DELETE, url, None)
    }
}

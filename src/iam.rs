//! Client side proxies for the objects of the IAM v2 API.
//!
//! Each proxy holds the local view of one remote object and borrows the [Transport] its calls
//! go through. The operations shared by every object kind (list, read, update, delete and
//! link resolution) are provided by the [IamObject] trait; the kinds only add their own
//! attributes and the way they are created.

pub mod api_key;
pub mod error;
pub mod model;
pub mod service_account;

pub use api_key::ApiKey;
pub use error::IamError;
pub use service_account::ServiceAccount;

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::transport::{ApiResponse, Transport, TransportError};

pub const API_KEYS_PATH: &str = "/iam/v2/api-keys";
pub const SERVICE_ACCOUNTS_PATH: &str = "/iam/v2/service-accounts";

/// State every IAM object carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    pub(crate) id: Option<String>,
    pub(crate) display_name: Option<String>,
    pub(crate) description: Option<String>,
    /// Link set explicitly or adopted from the server. Takes precedence over the derived one.
    pub(crate) self_link: Option<String>,
    pub(crate) api_path: Option<&'static str>,
}

impl Resource {
    pub fn new(api_path: Option<&'static str>) -> Self {
        Self {
            api_path,
            ..Default::default()
        }
    }

    /// Url of the collection the object belongs to, if it has one.
    pub fn collection_url(&self, base_url: &str) -> Option<String> {
        self.api_path.map(|path| format!("{base_url}{path}"))
    }

    pub fn href(&self, base_url: &str) -> Result<String, IamError> {
        if let Some(link) = non_empty(self.self_link.as_deref()) {
            return Ok(link.to_string());
        }
        match (self.collection_url(base_url), non_empty(self.id.as_deref())) {
            (Some(collection), Some(id)) => Ok(format!("{collection}/{id}")),
            _ => Err(IamError::UnresolvableLink),
        }
    }
}

/// Operations common to every IAM object.
///
/// Implementors only expose their transport and state; the provided methods map onto the
/// HTTP calls. None of them modify the local state: the server is the source of truth and
/// callers refresh explicitly.
pub trait IamObject {
    type Transport: Transport;

    fn transport(&self) -> &Self::Transport;
    fn resource(&self) -> &Resource;
    fn resource_mut(&mut self) -> &mut Resource;

    fn id(&self) -> Option<&str> {
        self.resource().id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.resource_mut().id = Some(id);
    }

    fn display_name(&self) -> Option<&str> {
        self.resource().display_name.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.resource().description.as_deref()
    }

    /// Pins the link of the object, overriding the one derived from its id.
    fn set_href(&mut self, url: String) {
        self.resource_mut().self_link = Some(url);
    }

    fn href(&self) -> Result<String, IamError> {
        self.resource().href(self.transport().base_url())
    }

    /// Lists the collection the object belongs to. `None` when it has no collection.
    fn list(&self) -> Result<Option<ApiResponse>, IamError> {
        let Some(url) = self.resource().collection_url(self.transport().base_url()) else {
            return Ok(None);
        };
        Ok(Some(self.transport().get(&url)?))
    }

    fn read(&self) -> Result<ApiResponse, IamError> {
        Ok(self.transport().get(&self.href()?)?)
    }

    fn update(&self, description: &str) -> Result<ApiResponse, IamError> {
        let body = json!({ "description": description });
        Ok(self.transport().patch(&self.href()?, &body)?)
    }

    fn delete(&self) -> Result<ApiResponse, IamError> {
        Ok(self.transport().delete(&self.href()?)?)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Decodes the attributes a proxy adopts from a successful response.
fn read_back<D: DeserializeOwned>(response: &ApiResponse) -> Result<D, IamError> {
    response.json().map_err(|err| match err {
        TransportError::Decoder(msg) => IamError::Decoder(msg),
        other => IamError::Transport(other),
    })
}

/// Picks `explicit`, else `stored`, else computes `default`. Empty strings count as unset.
pub fn resolve<F>(explicit: Option<&str>, stored: Option<&str>, default: F) -> String
where
    F: FnOnce() -> String,
{
    non_empty(explicit)
        .or(non_empty(stored))
        .map_or_else(default, str::to_string)
}

/// Like [resolve] for attributes that have no default.
pub fn resolve_required(
    explicit: Option<&str>,
    stored: Option<&str>,
    attribute: &'static str,
) -> Result<String, IamError> {
    non_empty(explicit)
        .or(non_empty(stored))
        .map(str::to_string)
        .ok_or(IamError::MissingAttribute(attribute))
}

/// Title cases `value` the way Python's `str.title` does: a character following a cased one
/// is lower cased, any other is title cased. Uncased characters (digits, punctuation, CJK)
/// break words, so `svc-a` becomes `Svc-A`.
///
/// Title case forms that do not map to a single character (ligatures such as `ﬀ`) are
/// upper cased instead.
pub fn title_case(value: &str) -> String {
    let mut titled = String::with_capacity(value.len());
    let mut previous_is_cased = false;
    for c in value.chars() {
        if previous_is_cased {
            titled.extend(c.to_lowercase());
        } else {
            match to_titlecase(c) {
                Some(t) => titled.push(t),
                None => titled.extend(c.to_uppercase()),
            }
        }
        previous_is_cased = is_cased(c);
    }
    titled
}

fn is_cased(c: char) -> bool {
    c.is_lowercase() || c.is_uppercase() || to_titlecase(c) == Some(c)
}

/// Single character title case mappings that differ from the upper case one.
fn to_titlecase(c: char) -> Option<char> {
    let titled = match c {
        '\u{01C4}'..='\u{01C6}' => '\u{01C5}',
        '\u{01C7}'..='\u{01C9}' => '\u{01C8}',
        '\u{01CA}'..='\u{01CC}' => '\u{01CB}',
        '\u{01F1}'..='\u{01F3}' => '\u{01F2}',
        // Greek letters with ypogegrammeni: each block of eight maps onto its title cased half.
        '\u{1F80}'..='\u{1F87}' | '\u{1F90}'..='\u{1F97}' | '\u{1FA0}'..='\u{1FA7}' => {
            char::from_u32(c as u32 + 8)?
        }
        '\u{1F88}'..='\u{1F8F}' | '\u{1F98}'..='\u{1F9F}' | '\u{1FA8}'..='\u{1FAF}' => c,
        '\u{1FB3}' | '\u{1FBC}' => '\u{1FBC}',
        '\u{1FC3}' | '\u{1FCC}' => '\u{1FCC}',
        '\u{1FF3}' | '\u{1FFC}' => '\u{1FFC}',
        _ => return None,
    };
    Some(titled)
}

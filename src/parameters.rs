use clap::error::ErrorKind;
use clap::{Args, Error, Subcommand, ValueEnum};
use std::time::Duration;

use crate::http::config::{DEFAULT_CONN_TIMEOUT, HttpConfig, ProxyConfig};
use crate::transport::{ApiCredentials, DEFAULT_API_URL, TransportConfig};

/// Options shared by every command to reach the API.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Cloud API key used to authenticate
    #[arg(long, required = true)]
    api_key: String,

    /// Secret of the Cloud API key
    #[arg(long, required = true)]
    api_secret: String,

    /// Base url of the API
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Proxy url. When empty HTTPS_PROXY and HTTP_PROXY are honored
    #[arg(long, default_value = "")]
    proxy_url: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Manage service accounts.
    #[command(subcommand)]
    ServiceAccount(ServiceAccountCommands),
    /// Manage API keys.
    #[command(subcommand)]
    ApiKey(ApiKeyCommands),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ServiceAccountCommands {
    /// Creates a service account. The description defaults to the title cased name.
    Create {
        #[arg(long, short)]
        display_name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Looks a service account up by id, or by exact display name.
    Get {
        #[arg(long, required_unless_present = "display_name")]
        id: Option<String>,
        #[arg(long, short, conflicts_with = "id")]
        display_name: Option<String>,
    },
    /// Lists every service account.
    List,
    /// Changes the description of a service account.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        description: String,
    },
    /// Deletes a service account.
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Lists the API keys owned by a service account.
    ApiKeys {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ApiKeyCommands {
    /// Creates an API key. Its secret is only shown in this output.
    Create {
        /// Service account owning the key
        #[arg(long)]
        owner_id: String,
        /// Resource the key grants access to, e.g. a Kafka cluster id
        #[arg(long)]
        resource_id: String,
        /// Defaults to `<owner-id>::<resource-id>`
        #[arg(long, short)]
        display_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Reads an API key.
    Get {
        #[arg(long)]
        id: String,
    },
    /// Changes the description of an API key.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        description: String,
    },
    /// Deletes an API key.
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// Indented JSON
    #[value(name = "pretty")]
    Pretty,
    /// JSON on a single line
    #[value(name = "compact")]
    Compact,
}

pub fn build_http_config(args: &ConnectionArgs) -> Result<HttpConfig, Error> {
    let proxy = ProxyConfig::new(&args.proxy_url)
        .and_then(ProxyConfig::try_with_url_from_env)
        .map_err(|e| Error::raw(ErrorKind::InvalidValue, format!("{e}\n")))?;
    Ok(HttpConfig::new(
        Duration::from_secs(args.timeout),
        DEFAULT_CONN_TIMEOUT.min(Duration::from_secs(args.timeout)),
        proxy,
    ))
}

pub fn build_transport_config(args: &ConnectionArgs) -> Result<TransportConfig, Error> {
    let credentials = ApiCredentials::new(args.api_key.as_str(), args.api_secret.as_str());
    TransportConfig::new(&args.api_url, credentials)
        .map_err(|e| Error::raw(ErrorKind::InvalidValue, format!("{e}\n")))
}

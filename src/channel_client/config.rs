//! Configuration structures consumed by [`ChannelClient`](super::ChannelClient).
//!
//! `ChannelClientBuilder` constructs these values, validates them, and hands
//! them to the client, which keeps them read-only for its whole lifetime.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::url_encoding::url_encode;

/// Base URL of the public ingestion API.
pub const DEFAULT_BASE_URL: &str = "https://api.thingspeak.com";
/// Default request timeout for bulk and single updates.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);
/// Default connection timeout applied when establishing HTTP connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Payload encoding used for bulk updates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// JSON body posted to `bulk_update.json`.
    Json,
    /// Form body carrying the service's delimited bulk CSV format.
    #[default]
    Form,
}

impl Encoding {
    /// `Content-Type` header value for bodies in this encoding.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Form => "application/x-www-form-urlencoded",
        }
    }

    /// Name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Form => "form",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "form" | "plain" | "url_encoded" => Ok(Self::Form),
            other => Err(format!("unknown encoding {other:?}")),
        }
    }
}

/// Configuration object describing how to construct a
/// [`ChannelClient`](super::ChannelClient).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Channel receiving the feeds.
    pub channel_id: String,
    /// Write API key for the channel.
    pub api_key: String,
    /// Scheme and host of the ingestion API, without a trailing slash.
    pub base_url: String,
    /// Bulk update encoding.
    pub encoding: Encoding,
    /// Request timeout, also the default for single updates.
    pub timeout: Duration,
    /// Timeout for establishing connections.
    pub connect_timeout: Duration,
    /// Additional HTTP headers to include in requests.
    pub headers: HashMap<String, String>,
}

impl ClientConfig {
    /// Configuration for `channel_id` with every other setting defaulted.
    pub fn new(channel_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            channel_id: String::new(),
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            encoding: Encoding::default(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            headers: HashMap::new(),
        }
    }
}

/// Endpoint URLs derived once from a [`ClientConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// `POST` target for JSON bulk updates.
    pub json_bulk: String,
    /// `POST` target for form bulk updates.
    pub plain_bulk: String,
    /// `GET` base for single updates, already carrying `api_key`.
    pub single: String,
}

impl Endpoints {
    /// Derive the endpoints for the configured channel.
    pub fn new(config: &ClientConfig) -> Self {
        let base = config.base_url.trim_end_matches('/');
        let channel = url_encode(&config.channel_id);
        Self {
            json_bulk: format!("{base}/channels/{channel}/bulk_update.json"),
            plain_bulk: format!("{base}/channels/{channel}/bulk_update"),
            single: format!("{base}/update?api_key={}", url_encode(&config.api_key)),
        }
    }

    /// Bulk endpoint for `encoding`.
    pub fn bulk(&self, encoding: Encoding) -> &str {
        match encoding {
            Encoding::Json => &self.json_bulk,
            Encoding::Form => &self.plain_bulk,
        }
    }
}

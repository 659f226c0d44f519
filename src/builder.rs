//! Builder for [`ChannelClient`](crate::ChannelClient).
//!
//! Exposes channel credentials, the service base URL, the bulk encoding,
//! timeouts and extra headers. Settings left unset fall back to the
//! [`ClientConfig`] defaults.

use std::{collections::HashMap, time::Duration};

use crate::channel_client::{BuildError, ChannelClient, ClientConfig, Encoding};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(BuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`ChannelClient`] instances.
#[derive(Clone, Debug, Default)]
pub struct ChannelClientBuilder {
    channel_id: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    encoding: Encoding,
    headers: HashMap<String, String>,
    timeout_ms: Option<u64>,
    connect_timeout_ms: Option<u64>,
}

impl ChannelClientBuilder {
    /// Create a new builder with no channel configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the channel receiving feeds (required).
    pub fn with_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Set the channel's write API key (required).
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Point the client at another deployment of the API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Select the bulk update encoding. Defaults to [`Encoding::Form`].
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Post bulk updates as JSON.
    pub fn with_json_format(self) -> Self {
        self.with_encoding(Encoding::Json)
    }

    /// Add a single custom HTTP header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    option_setter!(
        #[doc = "Set the request timeout in milliseconds."]
        with_timeout_ms,
        timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the connect timeout in milliseconds."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );

    fn validate(&self) -> Result<(), BuildError> {
        require_non_empty(self.channel_id.as_deref(), "channel_id")?;
        require_non_empty(self.api_key.as_deref(), "api_key")?;
        self.validate_base_url()?;
        self.validate_timeouts()?;
        Ok(())
    }

    fn validate_base_url(&self) -> Result<(), BuildError> {
        match &self.base_url {
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                Err(BuildError::InvalidConfig(format!(
                    "base_url must use http:// or https://, got {url:?}"
                )))
            }
            _ => Ok(()),
        }
    }

    fn validate_timeouts(&self) -> Result<(), BuildError> {
        if let Some(timeout) = self.timeout_ms {
            ensure_positive!(timeout, "timeout_ms")?;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        Ok(())
    }

    /// Validate the settings and produce the client configuration.
    pub fn build_config(&self) -> Result<ClientConfig, BuildError> {
        self.validate()?;

        let defaults = ClientConfig::default();
        Ok(ClientConfig {
            channel_id: self.channel_id.clone().unwrap_or_default(),
            api_key: self.api_key.clone().unwrap_or_default(),
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            encoding: self.encoding,
            timeout: self
                .timeout_ms
                .map_or(defaults.timeout, Duration::from_millis),
            connect_timeout: self
                .connect_timeout_ms
                .map_or(defaults.connect_timeout, Duration::from_millis),
            headers: self.headers.clone(),
        })
    }

    /// Validate the settings and construct the client.
    pub fn build(&self) -> Result<ChannelClient, BuildError> {
        ChannelClient::with_config(self.build_config()?)
    }
}

fn require_non_empty(value: Option<&str>, field: &str) -> Result<(), BuildError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        Some(_) => Err(BuildError::InvalidConfig(format!("{field} must not be empty"))),
        None => Err(BuildError::InvalidConfig(format!("{field} is required"))),
    }
}

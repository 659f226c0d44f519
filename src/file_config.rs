//! INI configuration for channel clients.
//!
//! A section names one channel:
//!
//! ```ini
//! [weather-station]
//! channel_id = 12345
//! api_key = ABCD1234EFGH5678
//! encoding = json
//! timeout_ms = 2000
//! ```
//!
//! `base_url` and `connect_timeout_ms` are also accepted. Any other key is an
//! error so typos do not silently fall back to defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use encoding_rs::Encoding as TextEncoding;
use ini::Ini;

use crate::builder::ChannelClientBuilder;
use crate::channel_client::{BuildError, Encoding};

impl ChannelClientBuilder {
    /// Load builder settings from `section` of the INI file at `path`.
    ///
    /// `encoding` is a WHATWG label such as `utf-8` or `latin1`; UTF-8 is
    /// assumed when it is `None`.
    pub fn from_ini_file(
        path: impl AsRef<Path>,
        section: &str,
        encoding: Option<&str>,
    ) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let bytes = read_file_bytes(path)?;
        if bytes.is_empty() {
            return Err(BuildError::Ini(format!(
                "{} is an empty file",
                path.display()
            )));
        }
        let text = decode_with_encoding(&bytes, encoding.unwrap_or("utf-8"))?;
        Self::from_ini_str(&text, section)
    }

    /// Load builder settings from `section` of INI text.
    pub fn from_ini_str(text: &str, section: &str) -> Result<Self, BuildError> {
        let ini = Ini::load_from_str(text)
            .map_err(|err| BuildError::Ini(err.to_string()))?;
        let props = ini
            .section(Some(section))
            .ok_or_else(|| BuildError::Ini(format!("missing section [{section}]")))?;
        props
            .iter()
            .try_fold(Self::new(), |builder, (key, value)| {
                apply_key(builder, key, value)
            })
    }
}

fn apply_key(
    builder: ChannelClientBuilder,
    key: &str,
    value: &str,
) -> Result<ChannelClientBuilder, BuildError> {
    let value = value.trim();
    Ok(match key {
        "channel_id" => builder.with_channel_id(value),
        "api_key" => builder.with_api_key(value),
        "base_url" => builder.with_base_url(value),
        "encoding" => builder.with_encoding(value.parse::<Encoding>().map_err(BuildError::Ini)?),
        "timeout_ms" => builder.with_timeout_ms(parse_millis(key, value)?),
        "connect_timeout_ms" => builder.with_connect_timeout_ms(parse_millis(key, value)?),
        other => return Err(BuildError::Ini(format!("unknown key {other:?}"))),
    })
}

fn parse_millis(key: &str, value: &str) -> Result<u64, BuildError> {
    value
        .parse()
        .map_err(|_| BuildError::Ini(format!("{key} must be an integer, got {value:?}")))
}

fn read_file_bytes(path: &Path) -> Result<Vec<u8>, BuildError> {
    fs::read(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => BuildError::Ini(format!("{} doesn't exist", path.display())),
        _ => BuildError::Io(err),
    })
}

fn decode_with_encoding(bytes: &[u8], label: &str) -> Result<String, BuildError> {
    let normalized_label = label.trim().to_ascii_lowercase();
    let encoding = TextEncoding::for_label(normalized_label.as_bytes())
        .ok_or_else(|| BuildError::Ini(format!("unknown encoding {label}")))?;
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(BuildError::Ini(format!(
            "configuration is not valid {}",
            encoding.name()
        )));
    }
    Ok(decoded.into_owned())
}

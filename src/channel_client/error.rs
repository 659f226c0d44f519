//! Error types for building clients and posting feeds.

use std::io;

use thiserror::Error;

/// Why a post was not accepted.
///
/// [`ChannelClient::post_batch`](super::ChannelClient::post_batch) and
/// [`ChannelClient::post_single`](super::ChannelClient::post_single) collapse
/// every variant to `false`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PostError {
    /// Connection, DNS or TLS failure, or an unreadable response.
    #[error("network error: {0}")]
    Network(String),
    /// The request did not complete within its timeout.
    #[error("request timed out")]
    Timeout,
    /// The service answered with a non-2xx status.
    #[error("service responded with HTTP status {0}")]
    HttpStatus(u16),
    /// The payload could not be encoded.
    ///
    /// Reserved for encoder failures. The bundled encoders serialise only
    /// strings and finite numbers, so posting never produces it today.
    #[error("failed to encode payload: {0}")]
    Encode(String),
}

impl PostError {
    /// Status code returned by the service, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// Errors that may occur while building a client.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Invalid user supplied configuration.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
    /// The TLS connector could not be created.
    #[error("failed to initialise TLS: {0}")]
    Tls(#[from] native_tls::Error),
    /// Configuration file could not be read or parsed.
    #[error("invalid configuration file: {0}")]
    Ini(String),
    /// Underlying I/O error whilst reading configuration.
    #[error(transparent)]
    Io(#[from] io::Error),
}

//! Blocking client posting feeds to a channel.

use std::{error::Error as _, io, sync::Arc, time::Duration};

use log::{debug, info, warn};
use native_tls::TlsConnector;
use ureq::{Agent, AgentBuilder};

use crate::feed::Feed;

use super::{
    config::{ClientConfig, Encoding, Endpoints},
    error::{BuildError, PostError},
    serialise::{serialise_form_bulk, serialise_json_bulk, single_update_query},
};

/// Client for one channel.
///
/// Holds only read-only configuration; every request builds its own
/// [`Agent`], so a client can be shared between threads freely.
pub struct ChannelClient {
    config: ClientConfig,
    endpoints: Endpoints,
    tls: Arc<TlsConnector>,
}

impl ChannelClient {
    /// Client for `channel_id` using default settings.
    pub fn new(
        channel_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, BuildError> {
        Self::with_config(ClientConfig::new(channel_id, api_key))
    }

    /// Construct the client from a configuration object.
    ///
    /// Derives the endpoint URLs and the TLS connector; no network I/O
    /// happens here.
    pub fn with_config(config: ClientConfig) -> Result<Self, BuildError> {
        let endpoints = Endpoints::new(&config);
        let tls = Arc::new(TlsConnector::new()?);
        Ok(Self {
            config,
            endpoints,
            tls,
        })
    }

    /// Configuration the client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Endpoint URLs derived at construction.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Encode `feeds` with the client's encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn encode_batch(&self, feeds: &[Feed]) -> io::Result<String> {
        match self.config.encoding {
            Encoding::Json => serialise_json_bulk(&self.config.api_key, feeds),
            Encoding::Form => Ok(serialise_form_bulk(&self.config.api_key, feeds)),
        }
    }

    /// Full single-update URL for `feed`.
    pub fn single_update_url(&self, feed: &Feed) -> String {
        format!("{}{}", self.endpoints.single, single_update_query(feed))
    }

    /// Post `feeds` as one bulk update.
    ///
    /// # Errors
    ///
    /// Returns [`PostError`] describing why the service did not accept the
    /// update. No retry is attempted.
    pub fn send_batch(&self, feeds: &[Feed]) -> Result<(), PostError> {
        let encoding = self.config.encoding;
        let body = self
            .encode_batch(feeds)
            .map_err(|err| PostError::Encode(err.to_string()))?;
        let url = self.endpoints.bulk(encoding);
        info!(
            "channel {}: posting {} feeds to {url}",
            self.config.channel_id,
            feeds.len()
        );
        debug!("bulk update body: {body}");

        let request = self
            .request(self.agent(self.config.timeout).post(url))
            .set("Content-Type", encoding.content_type());
        let result = finish(request.send_string(&body).map_err(Box::new));
        self.log_result(&result);
        result
    }

    /// Post `feeds`, reporting only whether the service accepted them.
    pub fn post_batch(&self, feeds: &[Feed]) -> bool {
        self.send_batch(feeds).is_ok()
    }

    /// Post one feed as a single update.
    ///
    /// `timeout` defaults to the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`PostError`] describing why the service did not accept the
    /// update. No retry is attempted.
    pub fn send_single(&self, feed: &Feed, timeout: Option<Duration>) -> Result<(), PostError> {
        let url = self.single_update_url(feed);
        info!(
            "channel {}: posting single update with {} fields",
            self.config.channel_id,
            feed.fields().len()
        );
        debug!("single update url: {url}");

        let timeout = timeout.unwrap_or(self.config.timeout);
        let request = self.request(self.agent(timeout).get(&url));
        let result = finish(request.call().map_err(Box::new));
        self.log_result(&result);
        result
    }

    /// Post one feed, reporting only whether the service accepted it.
    pub fn post_single(&self, feed: &Feed, timeout: Option<Duration>) -> bool {
        self.send_single(feed, timeout).is_ok()
    }

    fn agent(&self, timeout: Duration) -> Agent {
        AgentBuilder::new()
            .timeout_connect(self.config.connect_timeout)
            .timeout(timeout)
            .tls_connector(Arc::clone(&self.tls))
            .build()
    }

    fn request(&self, mut req: ureq::Request) -> ureq::Request {
        for (key, value) in &self.config.headers {
            req = req.set(key, value);
        }
        req
    }

    fn log_result(&self, result: &Result<(), PostError>) {
        match result {
            Ok(()) => info!("channel {}: update accepted", self.config.channel_id),
            Err(err) => warn!("channel {}: update failed: {err}", self.config.channel_id),
        }
    }
}

impl std::fmt::Debug for ChannelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelClient")
            .field("channel_id", &self.config.channel_id)
            .field("encoding", &self.config.encoding)
            .field("json_bulk", &self.endpoints.json_bulk)
            .field("plain_bulk", &self.endpoints.plain_bulk)
            .finish()
    }
}

fn finish(result: Result<ureq::Response, Box<ureq::Error>>) -> Result<(), PostError> {
    match result {
        Ok(response) => check_status(response.status()),
        Err(err) => match *err {
            ureq::Error::Status(code, _) => check_status(code),
            ureq::Error::Transport(transport) => Err(classify_transport(&transport)),
        },
    }
}

/// Accept any 2xx status.
pub(crate) fn check_status(status: u16) -> Result<(), PostError> {
    match status {
        200..=299 => Ok(()),
        code => Err(PostError::HttpStatus(code)),
    }
}

fn classify_transport(err: &ureq::Transport) -> PostError {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>()
            && matches!(
                io_err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            )
        {
            return PostError::Timeout;
        }
        source = cause.source();
    }
    PostError::Network(err.to_string())
}

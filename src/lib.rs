//! Blocking client for the ThingSpeak channel update API.
//!
//! Build [`Feed`] values, then post them through a [`ChannelClient`] either
//! one at a time or as a single bulk update:
//!
//! ```no_run
//! use thingspeak_rs::{ChannelClientBuilder, Feed};
//!
//! let client = ChannelClientBuilder::new()
//!     .with_channel_id("12345")
//!     .with_api_key("ABCD1234EFGH5678")
//!     .build()?;
//! let feeds = [Feed::new().with_field(1, 21.5).with_field(2, 40.0)];
//! if !client.post_batch(&feeds) {
//!     eprintln!("update rejected");
//! }
//! # Ok::<(), thingspeak_rs::BuildError>(())
//! ```

pub mod builder;
pub mod channel_client;
pub mod feed;
mod file_config;

pub use builder::ChannelClientBuilder;
pub use channel_client::{
    BuildError, ChannelClient, ClientConfig, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_TIMEOUT, Encoding, Endpoints, FORM_FIELD_SLOTS, PostError, serialise_form_bulk,
    serialise_form_record, serialise_json_bulk, serialise_json_single, single_update_query,
};
pub use feed::{Feed, FieldValue, TIMESTAMP_FORMAT, format_timestamp, timestamp_now};

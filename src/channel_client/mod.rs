//! Blocking channel client.
//!
//! This module defines [`ChannelClient`], which encodes [`Feed`](crate::Feed)
//! values and posts them to the ingestion API. Each call issues exactly one
//! HTTP request on the calling thread and returns once the service answers or
//! the timeout expires.
//!
//! # Request shapes
//!
//! - **Bulk form** (default): `POST /channels/<id>/bulk_update` with an
//!   `application/x-www-form-urlencoded` body in the service's delimited
//!   bulk format.
//! - **Bulk JSON**: `POST /channels/<id>/bulk_update.json` with an
//!   `application/json` body.
//! - **Single**: `GET /update?api_key=<key>&created_at=...&field<N>=...`.
//!
//! # Outcomes
//!
//! - **2xx**: accepted.
//! - **Anything else**: [`PostError::HttpStatus`].
//! - **Transport failures**: [`PostError::Timeout`] or [`PostError::Network`].
//!
//! Nothing is retried; `post_*` methods collapse the outcome to a `bool`.

mod client;
mod config;
mod error;
mod record;
mod serialise;
mod url_encoding;

#[cfg(test)]
mod tests;

pub use client::ChannelClient;
pub use config::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT, Encoding, Endpoints,
};
pub use error::{BuildError, PostError};
pub use serialise::{
    FORM_FIELD_SLOTS, serialise_form_bulk, serialise_form_record, serialise_json_bulk,
    serialise_json_single, single_update_query,
};

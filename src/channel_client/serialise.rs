//! Payload encoders for the three request shapes.
//!
//! The form encoding produces the service's legacy bulk CSV layout: for every
//! feed a timestamp, eight field slots, three reserved location slots and an
//! empty status slot, closed by `|`. The JSON encodings carry the same data
//! as objects keyed `field<N>`.

use std::fmt::Write as _;
use std::io;

use super::record::{JsonBulkPayload, JsonSinglePayload};
use super::url_encoding::{form_value_encode, url_encode};
use crate::feed::Feed;

/// Number of field slots in a form bulk record.
pub const FORM_FIELD_SLOTS: u32 = 8;
/// Latitude, longitude and elevation slots, always left blank.
const FORM_RESERVED_SLOTS: usize = 3;

/// Serialise one feed as a form bulk record.
///
/// Indices outside `1..=8` have no slot and are dropped. Characters in
/// `created_at` that form decoding would alter (`+`, space, `&`, `=`, `%`)
/// are percent-encoded.
pub fn serialise_form_record(feed: &Feed) -> String {
    let mut out = String::with_capacity(feed.created_at().len() + 32);
    push_form_record(&mut out, feed);
    out
}

fn push_form_record(out: &mut String, feed: &Feed) {
    out.push_str(&form_value_encode(feed.created_at()));
    out.push(',');
    for slot in 1..=FORM_FIELD_SLOTS {
        if let Some((_, value)) = feed.finite_fields().find(|(index, _)| *index == slot) {
            // Writing into a String cannot fail.
            let _ = write!(out, "{value}");
        }
        out.push(',');
    }
    for _ in 0..FORM_RESERVED_SLOTS {
        out.push(',');
    }
    // Status slot stays empty.
    out.push('|');
}

/// Serialise `feeds` as the body of `POST /channels/<id>/bulk_update`.
pub fn serialise_form_bulk(write_api_key: &str, feeds: &[Feed]) -> String {
    let mut out = format!(
        "write_api_key={}&time_format=absolute&updates=",
        url_encode(write_api_key)
    );
    for feed in feeds {
        push_form_record(&mut out, feed);
    }
    out
}

/// Serialise `feeds` as the body of `POST /channels/<id>/bulk_update.json`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn serialise_json_bulk(write_api_key: &str, feeds: &[Feed]) -> io::Result<String> {
    serde_json::to_string(&JsonBulkPayload::new(write_api_key, feeds)).map_err(io::Error::other)
}

/// Serialise one feed as a standalone JSON update carrying `api_key`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn serialise_json_single(api_key: &str, feed: &Feed) -> io::Result<String> {
    serde_json::to_string(&JsonSinglePayload { api_key, feed }).map_err(io::Error::other)
}

/// Query suffix for a single update: `&created_at=...&field<N>=...`.
///
/// Appended to a base URL that already carries `api_key`.
pub fn single_update_query(feed: &Feed) -> String {
    let mut query = format!("&created_at={}", url_encode(feed.created_at()));
    for (index, value) in feed.finite_fields() {
        let _ = write!(query, "&field{index}={value}");
    }
    query
}

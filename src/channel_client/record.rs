//! Borrowing serializable views of feeds for JSON payloads.
//!
//! Field keys are dynamic (`field1`, `field7`, ...) so the records implement
//! `Serialize` by hand as maps, preserving the feed's insertion order.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::feed::Feed;

fn field_key(index: u32) -> String {
    format!("field{index}")
}

/// One element of the `updates` array in a JSON bulk update.
pub(super) struct JsonFeedRecord<'a> {
    pub(super) feed: &'a Feed,
}

impl Serialize for JsonFeedRecord<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("created_at", self.feed.created_at())?;
        for (index, value) in self.feed.finite_fields() {
            map.serialize_entry(&field_key(index), &value)?;
        }
        map.end()
    }
}

/// Body of `POST /channels/<id>/bulk_update.json`.
#[derive(Serialize)]
pub(super) struct JsonBulkPayload<'a> {
    pub(super) write_api_key: &'a str,
    pub(super) updates: Vec<JsonFeedRecord<'a>>,
}

impl<'a> JsonBulkPayload<'a> {
    pub(super) fn new(write_api_key: &'a str, feeds: &'a [Feed]) -> Self {
        Self {
            write_api_key,
            updates: feeds.iter().map(|feed| JsonFeedRecord { feed }).collect(),
        }
    }
}

/// Body of a JSON single update: key, timestamp and fields in one object.
pub(super) struct JsonSinglePayload<'a> {
    pub(super) api_key: &'a str,
    pub(super) feed: &'a Feed,
}

impl Serialize for JsonSinglePayload<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("api_key", self.api_key)?;
        map.serialize_entry("created_at", self.feed.created_at())?;
        for (index, value) in self.feed.finite_fields() {
            map.serialize_entry(&field_key(index), &value)?;
        }
        map.end()
    }
}

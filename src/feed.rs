//! Channel feed records.
//!
//! A [`Feed`] is a single timestamped observation: a small ordered set of
//! numbered field values plus the `created_at` instant the service should
//! record for them. Feeds are built by the caller immediately before they are
//! handed to a [`ChannelClient`](crate::ChannelClient) and are not modified
//! afterwards.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// `strftime` pattern for feed timestamps (ISO-8601, UTC, milliseconds).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Largest magnitude emitted as a JSON integer without losing precision.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Format `at` as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current UTC time formatted with [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

/// One observation posted to a channel.
///
/// Each field index appears at most once. [`Feed::with_field`] overwrites an
/// existing index in place so the original insertion order is kept.
#[derive(Clone, Debug, PartialEq)]
pub struct Feed {
    fields: Vec<(u32, f64)>,
    created_at: String,
}

impl Feed {
    /// Create an empty feed stamped with the current time.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            created_at: timestamp_now(),
        }
    }

    /// Create a feed from `(index, value)` pairs stamped with the current time.
    ///
    /// Later duplicates of an index overwrite earlier ones.
    pub fn from_fields<I, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (u32, V)>,
        V: Into<f64>,
    {
        fields
            .into_iter()
            .fold(Self::new(), |feed, (index, value)| {
                feed.with_field(index, value)
            })
    }

    /// Set the value of field `index`.
    pub fn with_field(mut self, index: u32, value: impl Into<f64>) -> Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(i, _)| *i == index) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((index, value)),
        }
        self
    }

    /// Replace the timestamp with a preformatted `created_at` string.
    pub fn at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }

    /// Replace the timestamp with `at`, formatted with [`TIMESTAMP_FORMAT`].
    pub fn at_time(self, at: DateTime<Utc>) -> Self {
        self.at(format_timestamp(at))
    }

    /// Field pairs in insertion order.
    pub fn fields(&self) -> &[(u32, f64)] {
        &self.fields
    }

    /// Value stored for `index`, if any.
    pub fn field(&self, index: u32) -> Option<f64> {
        self.fields
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, value)| *value)
    }

    /// Field pairs the service can represent.
    ///
    /// NaN and infinities have no textual form the service accepts, so every
    /// encoder treats them as absent.
    pub fn finite_fields(&self) -> impl Iterator<Item = (u32, FieldValue)> + '_ {
        self.fields
            .iter()
            .filter(|(_, value)| value.is_finite())
            .map(|(index, value)| (*index, FieldValue(*value)))
    }

    /// Timestamp sent as `created_at`.
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Whether the feed carries no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric field value with the service's text and JSON representations.
///
/// Text uses `f64`'s `Display`: the shortest decimal that round-trips, never
/// in exponent form, and without a trailing `.0` for integral values. JSON
/// emits integral values as integers for the same reason.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldValue(pub f64);

impl FieldValue {
    fn as_exact_integer(self) -> Option<i64> {
        let v = self.0;
        if v.is_finite() && v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER {
            Some(v as i64)
        } else {
            None
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_exact_integer() {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_f64(self.0),
        }
    }
}

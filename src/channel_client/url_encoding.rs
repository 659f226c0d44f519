//! Percent-encoding for query parameters and form values.
//!
//! Channel ids, API keys and timestamps are normally plain ASCII, but a
//! caller-supplied `created_at` always carries `:` and may carry `+` or a
//! space around a UTC offset. Both request shapes escape it: the query string
//! fully, the form bulk body only where form decoding would alter it.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped in query values. Space is handled by [`url_encode`].
///
/// Unreserved characters (alphanumeric, `-`, `_`, `.`, `~`) pass through
/// unchanged per RFC 3986.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'\'');

/// Characters escaped inside the form `updates` value.
///
/// `,` and `|` delimit the bulk records and `:` separates time components, so
/// they stay literal.
const FORM_UPDATES_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'=');

/// Percent-encode `s` for use as a query or form value, mapping space to `+`.
pub(crate) fn url_encode(s: &str) -> String {
    s.split(' ')
        .map(|chunk| utf8_percent_encode(chunk, QUERY_VALUE).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Escape `s` for embedding in the form `updates` value.
pub(crate) fn form_value_encode(s: &str) -> String {
    utf8_percent_encode(s, FORM_UPDATES_VALUE).to_string()
}

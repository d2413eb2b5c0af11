//! Utility functions.
//!
//! Identifier and timestamp generation plus client-side ordering helpers.

use std::cmp::Ordering;

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::database::Document;

/// Fresh opaque document id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current UTC time as ISO-8601 with milliseconds, e.g. `2026-01-01T10:00:00.000Z`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Sort documents by a timestamp field, oldest first.
///
/// Documents missing `primary` fall back to `fallback` (typically a
/// client-supplied timestamp written before the store stamped its own).
/// Documents with neither sort last, keeping their relative order.
pub fn sort_by_timestamp(docs: &mut [Document], primary: &str, fallback: &str) {
    docs.sort_by(|a, b| {
        let ka = sort_key(a, primary, fallback);
        let kb = sort_key(b, primary, fallback);
        match (ka, kb) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

fn sort_key<'a>(doc: &'a Document, primary: &str, fallback: &str) -> Option<&'a str> {
    doc.get_str(primary).or_else(|| doc.get_str(fallback))
}

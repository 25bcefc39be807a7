//! The `[TRIPMETA:k1=v1,k2=v2]` prefix line.
//!
//! Values must not contain `,` or `=`. Only identifiers and RFC 3339
//! timestamps are stored, so this is not checked at runtime.

use super::token::{self, LineToken, META_CLOSE, META_OPEN};
use crate::models::TripStatus;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

pub const STATUS: &str = "status";
pub const STARTED_AT: &str = "startedAt";
pub const COMPLETED_AT: &str = "completedAt";

/// Ordered key/value record carried by the prefix line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripMeta {
    fields: Vec<(String, String)>,
}

impl TripMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrites in place when the key exists, appends otherwise.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn status(&self) -> Option<TripStatus> {
        self.get(STATUS).and_then(TripStatus::parse)
    }

    pub fn set_status(&mut self, status: TripStatus) {
        self.set(STATUS, status.as_str());
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp(STARTED_AT)
    }

    pub fn set_started_at(&mut self, at: DateTime<Utc>) {
        self.set(STARTED_AT, format_timestamp(at));
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp(COMPLETED_AT)
    }

    pub fn set_completed_at(&mut self, at: DateTime<Utc>) {
        self.set(COMPLETED_AT, format_timestamp(at));
    }

    fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.get(key)?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(t) => Some(t.with_timezone(&Utc)),
            Err(e) => {
                debug!("Ignoring unparsable {} '{}': {}", key, raw, e);
                None
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TripMeta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut meta = TripMeta::new();
        for (k, v) in iter {
            meta.set(k, v);
        }
        meta
    }
}

/// Millisecond precision, `Z` suffix: `2024-01-01T08:00:00.000Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn encode(meta: &TripMeta) -> String {
    let body = meta
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}{}{}", META_OPEN, body, META_CLOSE)
}

/// Reads the prefix from the first line only. Anything absent or malformed
/// yields an empty record.
pub fn decode(notes: &str) -> TripMeta {
    let Some(first) = token::lines(notes).next() else {
        return TripMeta::new();
    };
    let LineToken::Meta(body) = token::classify(first) else {
        return TripMeta::new();
    };
    if body.is_empty() {
        return TripMeta::new();
    }

    let mut meta = TripMeta::new();
    for pair in body.split(',') {
        match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => meta.set(key, value),
            _ => {
                debug!("Malformed trip metadata pair '{}', ignoring prefix", pair);
                return TripMeta::new();
            }
        }
    }
    meta
}

/// Removes the leading prefix line and its line break. Consecutive prefix
/// lines at the head are all removed, so stripping twice changes nothing.
pub fn strip(notes: &str) -> String {
    let mut rest = notes;
    loop {
        let (first, tail) = match rest.split_once('\n') {
            Some((first, tail)) => (first, tail),
            None => (rest, ""),
        };
        if !matches!(token::classify(first), LineToken::Meta(_)) {
            return rest.to_string();
        }
        rest = tail;
    }
}

/// Replaces (or inserts) the prefix line, keeping the rest of the text verbatim.
pub fn replace(notes: &str, meta: &TripMeta) -> String {
    let rest = strip(notes);
    if rest.is_empty() {
        encode(meta)
    } else {
        format!("{}\n{}", encode(meta), rest)
    }
}

//! Field lookup helpers for loosely shaped backend JSON
//!
//! Each helper takes the candidate keys in precedence order and returns the
//! first usable value.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// First non-empty string (numbers are stringified)
pub(crate) fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn first_bool(value: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| match value.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_u64().map(|n| n != 0),
        _ => None,
    })
}

/// Unsigned integer from a number or numeric string (Drive sends sizes as strings)
pub(crate) fn first_u64(value: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| match value.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Timestamp from RFC 3339 text or epoch milliseconds
pub(crate) fn first_datetime(value: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().find_map(|key| match value.get(key)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    })
}

/// Strings from the first key holding an array
pub(crate) fn first_str_list(value: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|key| value.get(key)?.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Items of a list response: a bare array, or an array under one of `keys`
pub(crate) fn list_items<'a>(value: &'a Value, keys: &[&str]) -> &'a [Value] {
    if let Some(items) = value.as_array() {
        return items;
    }
    keys.iter()
        .chain(["data", "items", "results"].iter())
        .find_map(|key| value.get(key)?.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// A single-record response, possibly wrapped under one of `keys`
pub(crate) fn record<'a>(value: &'a Value, keys: &[&str]) -> &'a Value {
    keys.iter()
        .chain(["data"].iter())
        .find_map(|key| value.get(key).filter(|v| v.is_object()))
        .unwrap_or(value)
}

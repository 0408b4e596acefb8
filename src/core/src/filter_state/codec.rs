//! Query-string codec for [`FilterState`].
//!
//! `decode` and `encode` are near-inverses: decoding an encoded state gives
//! back every field that was set. Decoding never fails. Unknown keys are
//! ignored and malformed values decode to "unset".

use log::debug;
use url::form_urlencoded;

use super::types::{CorrelationMode, FilterState, TimeRange};

pub const SERVICE_FILTER_KEY: &str = "service";
pub const TEXT_FILTER_KEY: &str = "text";
pub const START_FILTER_KEY: &str = "from";
pub const END_FILTER_KEY: &str = "to";
pub const CORRELATION_MODE_KEY: &str = "correlation";
pub const TAG_FILTER_KEY: &str = "tag";

fn parse_timestamp(key: &str, value: &str) -> Option<i64> {
    match value.trim().parse::<i64>() {
        Ok(ts) => Some(ts),
        Err(_) => {
            debug!("Ignoring malformed {} bound '{}'", key, value);
            None
        }
    }
}

/// Decodes a query string (with or without the leading `?`).
///
/// For scalar keys the first occurrence wins.
pub fn decode(query: &str) -> FilterState {
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut service: Option<String> = None;
    let mut text: Option<String> = None;
    let mut from: Option<Option<i64>> = None;
    let mut to: Option<Option<i64>> = None;
    let mut mode: Option<CorrelationMode> = None;
    let mut tags: Vec<String> = Vec::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match &*key {
            SERVICE_FILTER_KEY => {
                service.get_or_insert_with(|| value.into_owned());
            }
            TEXT_FILTER_KEY => {
                text.get_or_insert_with(|| value.into_owned());
            }
            START_FILTER_KEY => {
                from.get_or_insert_with(|| parse_timestamp(START_FILTER_KEY, &value));
            }
            END_FILTER_KEY => {
                to.get_or_insert_with(|| parse_timestamp(END_FILTER_KEY, &value));
            }
            CORRELATION_MODE_KEY => {
                mode.get_or_insert_with(|| {
                    value.parse().unwrap_or_else(|e| {
                        debug!("{}, falling back to default", e);
                        CorrelationMode::default()
                    })
                });
            }
            TAG_FILTER_KEY => tags.push(value.into_owned()),
            _ => {}
        }
    }

    FilterState::default()
        .with_service(service)
        .with_text(text)
        .with_time_range(TimeRange {
            from: from.flatten(),
            to: to.flatten(),
        })
        .with_tags(tags)
        .with_mode(mode.unwrap_or_default())
}

/// Encodes a state into a query string without the leading `?`.
///
/// Keys are written in a fixed order and tags sorted, so equal states give
/// equal URLs. The correlation mode is always written.
pub fn encode(state: &FilterState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    if let Some(service) = state.service() {
        serializer.append_pair(SERVICE_FILTER_KEY, service);
    }
    if let Some(text) = state.text() {
        serializer.append_pair(TEXT_FILTER_KEY, text);
    }
    let range = state.time_range();
    if let Some(from) = range.from {
        serializer.append_pair(START_FILTER_KEY, &from.to_string());
    }
    if let Some(to) = range.to {
        serializer.append_pair(END_FILTER_KEY, &to.to_string());
    }
    for tag in state.tags() {
        serializer.append_pair(TAG_FILTER_KEY, tag);
    }
    serializer.append_pair(CORRELATION_MODE_KEY, state.mode().as_str());

    serializer.finish()
}

/// First value of `key` in a query string, if any.
pub fn query_value(query: &str, key: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.into_owned())
}

use serde::Deserialize;

use crate::aggregation::{BucketPolicy, DEFAULT_BUCKET_TAG, DEFAULT_WINDOW_SIZE};
use crate::filter_state::TagMatch;

/// Where flows come from.
///
/// Exactly one of `base_url` (a running flow store) and `dump` (a JSON file
/// of flows served from memory) must be set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlowStoreConfig {
    pub base_url: Option<String>,
    pub dump: Option<String>,
    /// Per request timeout, in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for FlowStoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            dump: None,
            request_timeout_ms: 10_000,
        }
    }
}

/// Behaviour of correlation views.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Quiet period of the text filter, in milliseconds
    pub debounce_ms: u64,
    /// Width of a tag bucket, in milliseconds
    pub window_size: i64,
    /// Tag counted by the tags correlation
    pub bucket_tag: String,
    pub bucket_policy: BucketPolicy,
    pub tag_match: TagMatch,
    /// Polling refresh period of watched views. `0` disables it
    pub refresh_interval_secs: u64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            window_size: DEFAULT_WINDOW_SIZE,
            bucket_tag: DEFAULT_BUCKET_TAG.to_string(),
            bucket_policy: BucketPolicy::default(),
            tag_match: TagMatch::default(),
            refresh_interval_secs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 3000,
        }
    }
}

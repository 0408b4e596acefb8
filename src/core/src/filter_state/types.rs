use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Which scalar, or aggregate, is charted against time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMode {
    /// Flow duration per flow.
    #[default]
    Time,
    /// Packet count per flow.
    Packets,
    /// Tagged-flow count per time window.
    Tags,
}

impl CorrelationMode {
    pub const ALL: [CorrelationMode; 3] = [
        CorrelationMode::Time,
        CorrelationMode::Packets,
        CorrelationMode::Tags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationMode::Time => "time",
            CorrelationMode::Packets => "packets",
            CorrelationMode::Tags => "tags",
        }
    }
}

impl fmt::Display for CorrelationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrelationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(CorrelationMode::Time),
            "packets" => Ok(CorrelationMode::Packets),
            "tags" => Ok(CorrelationMode::Tags),
            other => Err(format!("unknown correlation mode '{}'", other)),
        }
    }
}

/// Optional time bounds in epoch milliseconds, both inclusive.
///
/// Each bound is independent; a missing bound means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl TimeRange {
    pub fn between(from: i64, to: i64) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, time: i64) -> bool {
        self.from.map_or(true, |from| time >= from) && self.to.map_or(true, |to| time <= to)
    }
}

fn describe_bound(bound: Option<i64>) -> String {
    match bound.and_then(DateTime::from_timestamp_millis) {
        Some(dt) => dt.to_rfc3339(),
        None => match bound {
            Some(raw) => raw.to_string(),
            None => "*".to_string(),
        },
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", describe_bound(self.from), describe_bound(self.to))
    }
}

/// The decoded, in-memory form of every active filter and display criterion.
///
/// Values are immutable: the `with_*` methods consume the state and return a
/// new one. Empty strings are normalized to "unset".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterState {
    service: Option<String>,
    text: Option<String>,
    time_range: TimeRange,
    tags: BTreeSet<String>,
    mode: CorrelationMode,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl FilterState {
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn mode(&self) -> CorrelationMode {
        self.mode
    }

    pub fn with_service<S: Into<String>>(self, service: Option<S>) -> Self {
        Self {
            service: non_empty(service.map(Into::into)),
            ..self
        }
    }

    pub fn with_text<S: Into<String>>(self, text: Option<S>) -> Self {
        Self {
            text: non_empty(text.map(Into::into)),
            ..self
        }
    }

    pub fn with_time_range(self, time_range: TimeRange) -> Self {
        Self { time_range, ..self }
    }

    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
            ..self
        }
    }

    /// Adds `tag` if it is not selected, removes it otherwise.
    pub fn toggle_tag(self, tag: &str) -> Self {
        let mut tags = self.tags.clone();
        if !tags.remove(tag) && !tag.is_empty() {
            tags.insert(tag.to_string());
        }
        Self { tags, ..self }
    }

    pub fn with_mode(self, mode: CorrelationMode) -> Self {
        Self { mode, ..self }
    }

    /// True when both states ask the flow store for the same flows, ignoring
    /// the text filter and the display mode.
    pub fn same_scope(&self, other: &FilterState) -> bool {
        self.service == other.service
            && self.time_range == other.time_range
            && self.tags == other.tags
    }
}

use std::net::IpAddr;

use log::warn;
use serde::{Deserialize, Serialize};

use super::types::FilterState;
use crate::flow::Service;

/// How the selected tags constrain the flow set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMatch {
    /// Every selected tag must be present on a flow.
    #[default]
    All,
    /// At least one selected tag must be present.
    Any,
}

/// Request sent to the flow store. Absent fields impose no constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowQuery {
    #[serde(rename = "flow.data", default, skip_serializing_if = "Option::is_none")]
    pub text_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_ip: Option<IpAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_time: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tag_match: TagMatch,
}

impl FilterState {
    /// Builds the flow store request for this state.
    ///
    /// The service name is resolved against `services`; an unknown name
    /// leaves the destination unconstrained.
    pub fn to_query(&self, services: &[Service], tag_match: TagMatch) -> FlowQuery {
        let service = self.service().and_then(|name| {
            let found = services.iter().find(|s| s.name == name);
            if found.is_none() {
                warn!("Unknown service '{}', not filtering by destination", name);
            }
            found
        });
        let range = self.time_range();

        FlowQuery {
            text_filter: self.text().map(str::to_string),
            dst_ip: service.map(|s| s.ip),
            dst_port: service.map(|s| s.port),
            from_time: range.from,
            to_time: range.to,
            tags: self.tags().iter().cloned().collect(),
            tag_match,
        }
    }
}

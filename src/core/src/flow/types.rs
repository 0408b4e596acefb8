use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Opaque flow identifier.
///
/// The flow store exposes it as a document id object (`{"$oid": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowId {
    #[serde(rename = "$oid")]
    pub oid: String,
}

impl FlowId {
    pub fn new<S: Into<String>>(oid: S) -> Self {
        Self { oid: oid.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.oid
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.oid)
    }
}

/// A captured session record.
///
/// `time` is the start time in epoch milliseconds and `duration` is in
/// milliseconds. Responses from the flow store are ascending by `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    #[serde(rename = "_id")]
    pub id: FlowId,
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
    pub time: i64,
    pub duration: i64,
    pub num_packets: u64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<FlowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_id: Option<FlowId>,
    #[serde(default)]
    pub service_tag: String,
    #[serde(default)]
    pub suricata: Vec<u32>,
    #[serde(default)]
    pub filename: String,
    /// Concatenated payload, only present when the store inlines it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Flow {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// A named service on the inspected network, used to resolve the service
/// filter into a destination address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub ip: IpAddr,
    pub port: u16,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::net::Ipv4Addr;

    /// Flow with the given id and start time, everything else neutral.
    pub fn flow(id: &str, time: i64) -> Flow {
        Flow {
            id: FlowId::new(id),
            src_ip: IpAddr::V4(Ipv4Addr::new(10, 60, 1, 1)),
            src_port: 40000,
            dst_ip: IpAddr::V4(Ipv4Addr::new(10, 60, 4, 1)),
            dst_port: 5000,
            time,
            duration: 0,
            num_packets: 0,
            tags: BTreeSet::new(),
            parent_id: None,
            child_id: None,
            service_tag: String::new(),
            suricata: Vec::new(),
            filename: String::new(),
            data: None,
        }
    }

    pub fn tagged(id: &str, time: i64, tags: &[&str]) -> Flow {
        let mut f = flow(id, time);
        f.tags = tags.iter().map(|t| t.to_string()).collect();
        f
    }
}

use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use regex::Regex;

use super::store_trait::FlowStore;
use crate::error_handling::types::QueryError;
use crate::filter_state::{FlowQuery, TagMatch};
use crate::flow::{Flow, Service};

/// Flow store held in memory.
///
/// Applies the same criteria a remote store would: the text filter is a
/// regular expression over the flow payload (a literal substring when the
/// pattern does not compile), destination address, inclusive time bounds and
/// tags under the requested [`TagMatch`] policy. Flows without an inlined
/// payload never match a text filter.
pub struct MemoryFlowStore {
    flows: Vec<Flow>,
    services: Vec<Service>,
    latency: Option<Duration>,
}

impl MemoryFlowStore {
    pub fn new(mut flows: Vec<Flow>, services: Vec<Service>) -> Self {
        flows.sort_by_key(|f| f.time);
        Self {
            flows,
            services,
            latency: None,
        }
    }

    /// Loads a JSON array of flows, as produced by the flow store.
    pub fn from_json_file<P: AsRef<Path>>(
        path: P,
        services: Vec<Service>,
    ) -> Result<Self, QueryError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read flow dump {}: {}", path.display(), e);
            QueryError::Unavailable(e.to_string())
        })?;
        let flows: Vec<Flow> = serde_json::from_str(&raw).map_err(|e| {
            error!("Failed to parse flow dump {}: {}", path.display(), e);
            QueryError::Decode(e.to_string())
        })?;
        info!("Loaded {} flow(s) from {}", flows.len(), path.display());
        Ok(Self::new(flows, services))
    }

    /// Delays every answer, to mimic a remote store.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    fn text_matcher(text: &str) -> Result<Regex, QueryError> {
        Regex::new(text)
            .or_else(|e| {
                debug!("Text filter is not a valid pattern ({}), matching literally", e);
                Regex::new(&regex::escape(text))
            })
            .map_err(|e| QueryError::Unavailable(format!("unusable text filter: {}", e)))
    }

    fn matches(flow: &Flow, query: &FlowQuery, text: Option<&Regex>) -> bool {
        if let Some(re) = text {
            match flow.data {
                Some(ref data) if re.is_match(data) => {}
                _ => return false,
            }
        }
        if let Some(ip) = query.dst_ip {
            if flow.dst_ip != ip {
                return false;
            }
        }
        if let Some(port) = query.dst_port {
            if flow.dst_port != port {
                return false;
            }
        }
        if let Some(from) = query.from_time {
            if flow.time < from {
                return false;
            }
        }
        if let Some(to) = query.to_time {
            if flow.time > to {
                return false;
            }
        }
        if !query.tags.is_empty() {
            let hit = |t: &String| flow.tags.contains(t);
            let ok = match query.tag_match {
                TagMatch::All => query.tags.iter().all(hit),
                TagMatch::Any => query.tags.iter().any(hit),
            };
            if !ok {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl FlowStore for MemoryFlowStore {
    async fn query(&self, query: &FlowQuery) -> Result<Vec<Flow>, QueryError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let text = query
            .text_filter
            .as_deref()
            .map(Self::text_matcher)
            .transpose()?;
        let flows: Vec<Flow> = self
            .flows
            .iter()
            .filter(|f| Self::matches(f, query, text.as_ref()))
            .cloned()
            .collect();
        debug!("Matched {} of {} flow(s)", flows.len(), self.flows.len());
        Ok(flows)
    }

    async fn tags(&self) -> Result<Vec<String>, QueryError> {
        let mut tags: Vec<String> = self
            .flows
            .iter()
            .flat_map(|f| f.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }

    async fn services(&self) -> Result<Vec<Service>, QueryError> {
        Ok(self.services.clone())
    }
}

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Deserialize;
use url::Url;

use super::types::*;
use crate::aggregation::TagBucketing;
use crate::error_handling::types::{ConfigError, QueryError};
use crate::flow::Service;
use crate::flow_store::{FlowStore, HttpFlowStore, MemoryFlowStore};
use crate::view::ViewSettings;

/// Environment variable replacing `flow_store.base_url`.
pub const FLOW_STORE_URL_ENV: &str = "CORRIE_FLOW_STORE_URL";

/// Application configuration structure that defines all runtime parameters.
///
/// Read from a TOML file with [`Config::from_file`]. Every section and every
/// key has a default, so an empty file is a valid configuration as long as
/// the flow store is given through [`FLOW_STORE_URL_ENV`].
///
/// # Fields Overview
///
/// - `flow_store`: where flows are read from and how long a request may take
/// - `view`: debounce, tag bucketing and refresh behaviour of correlation views
/// - `web`: whether to expose the JSON API, and on which port
/// - `services`: named services the service filter resolves against. When
///   empty, the flow store is asked for them
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub flow_store: FlowStoreConfig,
    pub view: ViewConfig,
    pub web: WebConfig,
    pub services: Vec<Service>,
}

/// Resolved flow store location.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowStoreSource {
    Remote(Url),
    Dump(PathBuf),
}

impl Config {
    /// Reads, overrides from the environment and validates a configuration
    /// file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        debug!("Read {} bytes of configuration from {}", raw.len(), path.display());
        let mut config = Self::parse(&raw)?;
        config.apply_env();
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Parses TOML without validating it.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::TomlError(e.to_string()))
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(FLOW_STORE_URL_ENV) {
            info!("Using flow store from {}: {}", FLOW_STORE_URL_ENV, url);
            if self.flow_store.dump.take().is_some() {
                warn!("{} overrides the configured flow dump", FLOW_STORE_URL_ENV);
            }
            self.flow_store.base_url = Some(url);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.flow_store_source()?;
        if self.flow_store.request_timeout_ms == 0 {
            return Err(ConfigError::NotInRange(
                "flow_store.request_timeout_ms must be positive".to_string(),
            ));
        }
        if self.view.debounce_ms == 0 {
            return Err(ConfigError::NotInRange(
                "view.debounce_ms must be positive".to_string(),
            ));
        }
        if self.view.window_size <= 0 {
            return Err(ConfigError::NotInRange(format!(
                "view.window_size must be positive, got {}",
                self.view.window_size
            )));
        }
        if self.view.bucket_tag.trim().is_empty() {
            return Err(ConfigError::NotInRange(
                "view.bucket_tag must not be empty".to_string(),
            ));
        }
        if self.web.enabled && self.web.port == 0 {
            return Err(ConfigError::NotInRange(
                "web.port must be set when the web interface is enabled".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for service in &self.services {
            if !seen.insert(service.name.as_str()) {
                return Err(ConfigError::DuplicateService(service.name.clone()));
            }
        }
        Ok(())
    }

    pub fn flow_store_source(&self) -> Result<FlowStoreSource, ConfigError> {
        match (&self.flow_store.base_url, &self.flow_store.dump) {
            (Some(url), None) => Url::parse(url)
                .map(FlowStoreSource::Remote)
                .map_err(|e| ConfigError::BadUrlFormatting(format!("{}: {}", url, e))),
            (None, Some(dump)) => Ok(FlowStoreSource::Dump(PathBuf::from(dump))),
            (Some(_), Some(_)) => Err(ConfigError::FlowStoreSource(
                "base_url and dump are mutually exclusive".to_string(),
            )),
            (None, None) => Err(ConfigError::FlowStoreSource(format!(
                "one of base_url or dump is required (or set {})",
                FLOW_STORE_URL_ENV
            ))),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.flow_store.request_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.view.refresh_interval_secs > 0)
            .then(|| Duration::from_secs(self.view.refresh_interval_secs))
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            debounce: Duration::from_millis(self.view.debounce_ms),
            tag_match: self.view.tag_match,
            bucketing: TagBucketing {
                window_size: self.view.window_size,
                tag: self.view.bucket_tag.clone(),
                policy: self.view.bucket_policy,
            },
        }
    }

    /// Opens the configured flow store. Configuration errors surface as
    /// [`QueryError::Unavailable`].
    pub fn open_store(&self) -> Result<Arc<dyn FlowStore>, QueryError> {
        let source = self
            .flow_store_source()
            .map_err(|e| QueryError::Unavailable(e.to_string()))?;
        let store: Arc<dyn FlowStore> = match source {
            FlowStoreSource::Remote(url) => {
                info!("Querying flows from {}", url);
                Arc::new(HttpFlowStore::new(url, self.request_timeout())?)
            }
            FlowStoreSource::Dump(path) => {
                Arc::new(MemoryFlowStore::from_json_file(path, self.services.clone())?)
            }
        };
        Ok(store)
    }
}

//! Runtime configuration, read from a TOML file and validated once at
//! startup.

pub mod config;
pub mod types;

pub use config::{Config, FlowStoreSource, FLOW_STORE_URL_ENV};
pub use types::{FlowStoreConfig, ViewConfig, WebConfig};

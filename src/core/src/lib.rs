pub mod aggregation;
pub mod configuration;
pub mod error_handling;
pub mod filter_state;
pub mod flow;
pub mod flow_store;
pub mod interaction;
pub mod navigation;
pub mod query_trigger;
pub mod view;
pub mod web_interface;

pub use error_handling::types::*;

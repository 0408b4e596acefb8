//! Flow store subsystem
//!
//! The flow store is the external service that answers filter queries with
//! flow records. This module provides the trait the rest of the crate talks
//! to and two implementations.
//!
//! Components:
//! - `store_trait`: the `FlowStore` trait defining a uniform async API.
//! - `http_store`: reqwest-backed client for a remote flow store.
//! - `memory_store`: in-process store over a flow vector (or a JSON dump),
//!   applying the same criteria as the remote one.

pub mod http_store;
pub mod memory_store;
pub mod store_trait;

pub use http_store::HttpFlowStore;
pub use memory_store::MemoryFlowStore;
pub use store_trait::FlowStore;

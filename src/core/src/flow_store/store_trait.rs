//! Flow Store Trait
//!
//! This module defines the `FlowStore` trait, the interface to whatever holds
//! the captured flows.
//!
//! Implementors of this trait are responsible for:
//! - Answering filter queries with flows in ascending time order
//! - Listing the known tag vocabulary
//! - Listing the services the service filter can resolve
//!
//! Calls must be safe to run concurrently with other in-flight calls, for the
//! same or different criteria. Nothing here is cached: the same query issued
//! twice hits the store twice.

use async_trait::async_trait;

use crate::error_handling::types::QueryError;
use crate::filter_state::FlowQuery;
use crate::flow::{Flow, Service};

#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Flows matching `query`, ascending by start time.
    async fn query(&self, query: &FlowQuery) -> Result<Vec<Flow>, QueryError>;

    /// Every tag the store knows about.
    async fn tags(&self) -> Result<Vec<String>, QueryError>;

    /// Services the service filter may refer to.
    async fn services(&self) -> Result<Vec<Service>, QueryError>;
}

use serde::Serialize;

use crate::aggregation::Correlation;
use crate::filter_state::{FilterState, FlowQuery};
use crate::navigation::Location;

/// API error payload
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

/// Answer of `GET /corrie`.
#[derive(Debug, Serialize)]
pub struct CorrelationResponse {
    pub filter: FilterState,
    pub query: FlowQuery,
    pub correlation: Correlation,
}

/// Where a client should navigate next.
#[derive(Debug, PartialEq, Serialize)]
pub struct LocationResponse {
    pub location: String,
    pub path: String,
    pub query: String,
}

impl From<Location> for LocationResponse {
    fn from(location: Location) -> Self {
        Self {
            location: location.href(),
            path: location.path,
            query: location.query,
        }
    }
}

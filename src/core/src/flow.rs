//! Flow records as returned by the flow store.
//!
//! A flow is one captured network session. The core only reads the temporal,
//! volume and tag attributes; everything else is carried through for the
//! presentational layer.

pub mod types;

pub use types::{Flow, FlowId, Service};

//! Filter state: what the analyst is looking at.
//!
//! The navigable URL is the only durable store for these criteria. A
//! [`FilterState`] is decoded from the query string whenever the location
//! changes and is never mutated in place: every change builds a new value
//! and encodes it back into the URL.
//!
//! Components:
//! - `types`: the immutable `FilterState`, `TimeRange` and `CorrelationMode`.
//! - `codec`: query-string decode/encode and the URL key names.
//! - `criteria`: translation of a state into a flow store request.

pub mod codec;
pub mod criteria;
pub mod types;

pub use codec::{decode, encode};
pub use criteria::{FlowQuery, TagMatch};
pub use types::{CorrelationMode, FilterState, TimeRange};

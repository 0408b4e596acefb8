//! Deciding when to query the flow store.
//!
//! Structural filter changes (service, time range, tags) and refresh signals
//! query immediately. Text filter edits only query once the text has stayed
//! unchanged for a quiet period. Every dispatch gets a ticket; only the
//! response to the newest ticket may be applied.
//!
//! Components:
//! - `debounce`: a clock-driven debouncer for a single value.
//! - `guard`: tickets and the stale-response check.
//! - `trigger`: the `QueryTrigger` state machine combining both.

pub mod debounce;
pub mod guard;
pub mod trigger;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use guard::{RequestSequencer, Ticket};
pub use trigger::{Dispatch, QueryTrigger, TriggerReason};

//! The correlation view: one mounted chart route.
//!
//! Wires the pieces together:
//!
//! ```text
//! Router ──location──▶ decode ──▶ QueryTrigger ──dispatch──▶ FlowStore
//!   ▲                                                           │
//!   │                                                         flows
//!   │                                                           ▼
//! InteractionMapper ◀──ChartEvent── ChartRenderer ◀──series── Correlator
//! ```
//!
//! All state is owned by the view task; the only thing shared with the
//! outside is the router location, which is always replaced wholesale.

pub mod correlation_view;
pub mod view_state;

pub use correlation_view::{CorrelationView, ViewSettings, ViewSnapshot};
pub use view_state::ViewState;

use std::time::Duration;

use log::debug;
use tokio::time::Instant;

use super::debounce::Debouncer;
use super::guard::{RequestSequencer, Ticket};
use crate::filter_state::FilterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// First query of a freshly mounted view.
    Mount,
    /// Service, time range or tags changed.
    Scope,
    /// The text filter settled on a new value.
    Text,
    /// External refresh signal.
    Refresh,
}

/// A query to run now.
///
/// `state` is the effective state: the latest decoded state with the text
/// filter replaced by its settled value.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub ticket: Ticket,
    pub state: FilterState,
    pub reason: TriggerReason,
}

/// Decides which filter changes issue a flow query, and when.
///
/// Driven by its owner: feed every decoded state to [`QueryTrigger::on_filter`],
/// sleep until [`QueryTrigger::deadline`] and then call
/// [`QueryTrigger::on_deadline`], forward refresh signals to
/// [`QueryTrigger::on_refresh`]. Mode changes alone never dispatch.
#[derive(Debug)]
pub struct QueryTrigger {
    text: Debouncer<Option<String>>,
    latest: FilterState,
    dispatched: Option<FilterState>,
    sequencer: RequestSequencer,
}

impl QueryTrigger {
    pub fn new(initial: FilterState, quiet: Duration) -> Self {
        Self {
            text: Debouncer::new(initial.text().map(str::to_string), quiet),
            latest: initial,
            dispatched: None,
            sequencer: RequestSequencer::default(),
        }
    }

    pub fn latest(&self) -> &FilterState {
        &self.latest
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.text.deadline()
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.sequencer.is_current(ticket)
    }

    fn effective(&self) -> FilterState {
        self.latest.clone().with_text(self.text.settled().clone())
    }

    fn dispatch(&mut self, reason: TriggerReason) -> Dispatch {
        let state = self.effective();
        let ticket = self.sequencer.next();
        debug!("Dispatching query {} ({:?})", ticket, reason);
        self.dispatched = Some(state.clone());
        Dispatch {
            ticket,
            state,
            reason,
        }
    }

    pub fn mount(&mut self) -> Dispatch {
        self.dispatch(TriggerReason::Mount)
    }

    pub fn on_filter(&mut self, state: FilterState, now: Instant) -> Option<Dispatch> {
        let scope_changed = !state.same_scope(&self.latest);
        self.text.push(state.text().map(str::to_string), now);
        self.latest = state;
        scope_changed.then(|| self.dispatch(TriggerReason::Scope))
    }

    pub fn on_deadline(&mut self, now: Instant) -> Option<Dispatch> {
        self.text.settle(now)?;
        let effective = self.effective();
        let already = self
            .dispatched
            .as_ref()
            .is_some_and(|d| d.same_scope(&effective) && d.text() == effective.text());
        if already {
            debug!("Settled text filter matches the last query, not dispatching");
            return None;
        }
        Some(self.dispatch(TriggerReason::Text))
    }

    pub fn on_refresh(&mut self) -> Dispatch {
        self.dispatch(TriggerReason::Refresh)
    }
}

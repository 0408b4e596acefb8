use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds back changes of a value until it has stayed unchanged for `quiet`.
///
/// The debouncer owns no timer: the caller reads [`Debouncer::deadline`],
/// sleeps until then and calls [`Debouncer::settle`]. Every new value
/// restarts the quiet period; intermediate values are discarded.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    settled: T,
    pending: Option<(T, Instant)>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(initial: T, quiet: Duration) -> Self {
        Self {
            quiet,
            settled: initial,
            pending: None,
        }
    }

    pub fn settled(&self) -> &T {
        &self.settled
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn push(&mut self, value: T, now: Instant) {
        let unchanged = match self.pending {
            Some((ref pending, _)) => *pending == value,
            None => self.settled == value,
        };
        if unchanged {
            return;
        }
        if self.settled == value {
            // back to where we were before any pending edit
            self.pending = None;
        } else {
            self.pending = Some((value, now + self.quiet));
        }
    }

    /// Promotes the pending value once its quiet period has elapsed.
    pub fn settle(&mut self, now: Instant) -> Option<&T> {
        match self.pending.take() {
            Some((value, deadline)) if deadline <= now => {
                self.settled = value;
                Some(&self.settled)
            }
            other => {
                self.pending = other;
                None
            }
        }
    }
}

//! Location store and navigation.
//!
//! The [`Router`] plays the part of the browser location: it holds the
//! current path and query string, replaces them atomically on navigation and
//! lets views subscribe to changes. Non-replacing navigations push the
//! previous location on a history stack so they can be undone with
//! [`Router::back`].

use std::fmt;
use std::sync::Mutex;

use log::{debug, info};
use serde::Serialize;
use tokio::sync::watch;

pub const CORRELATION_PATH: &str = "/corrie";
pub const FLOW_DETAIL_PATH: &str = "/flow";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    pub path: String,
    pub query: String,
}

impl Location {
    pub fn new<P: Into<String>, Q: Into<String>>(path: P, query: Q) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
        }
    }

    /// Splits `path?query`.
    pub fn parse(href: &str) -> Self {
        match href.split_once('?') {
            Some((path, query)) => Self::new(path, query),
            None => Self::new(href, ""),
        }
    }

    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

/// A request to move to another location.
///
/// `replace` overwrites the current history entry instead of pushing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationRequest {
    pub path: String,
    pub query: String,
    pub replace: bool,
}

impl NavigationRequest {
    pub fn location(&self) -> Location {
        Location::new(self.path.clone(), self.query.clone())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, request: NavigationRequest);
}

pub struct Router {
    current: watch::Sender<Location>,
    history: Mutex<Vec<Location>>,
}

impl Router {
    pub fn new(initial: Location) -> Self {
        info!("Router starting at {}", initial);
        let (current, _) = watch::channel(initial);
        Self {
            current,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> Location {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.current.subscribe()
    }

    /// Returns to the previous location. False when there is none.
    pub fn back(&self) -> bool {
        let previous = match self.history.lock() {
            Ok(mut history) => history.pop(),
            Err(_) => None,
        };
        match previous {
            Some(location) => {
                debug!("Navigating back to {}", location);
                self.current.send_replace(location);
                true
            }
            None => false,
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }
}

impl Navigator for Router {
    fn navigate(&self, request: NavigationRequest) {
        let next = request.location();
        debug!(
            "Navigating to {}{}",
            next,
            if request.replace { " (replace)" } else { "" }
        );
        let previous = self.current.send_replace(next);
        if !request.replace {
            if let Ok(mut history) = self.history.lock() {
                history.push(previous);
            }
        }
    }
}

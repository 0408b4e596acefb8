use log::debug;
use serde::Serialize;

/// Lifecycle of a mounted view.
///
/// `Idle → Loading → Displaying`, any trigger goes back to `Loading`, a
/// failed query goes to `Error` until the next trigger. There is no terminal
/// state: the view lives as long as its route is shown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "lowercase")]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Displaying,
    Error(String),
}

impl ViewState {
    pub fn on_trigger(&self) -> ViewState {
        debug!("view {:?} -> Loading", self);
        ViewState::Loading
    }

    /// A current response arrived. Only meaningful while loading.
    pub fn on_response(&self) -> ViewState {
        match self {
            ViewState::Loading => ViewState::Displaying,
            other => other.clone(),
        }
    }

    pub fn on_failure(&self, message: String) -> ViewState {
        match self {
            ViewState::Loading => {
                debug!("view Loading -> Error");
                ViewState::Error(message)
            }
            other => other.clone(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

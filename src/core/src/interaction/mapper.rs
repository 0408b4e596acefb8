//! Chart gestures to filter-state mutations.
//!
//! Nothing here touches the location directly. Every gesture yields a
//! [`NavigationRequest`] built from a new, re-encoded [`FilterState`], and
//! the caller hands it to the router.

use log::{debug, warn};
use url::form_urlencoded;

use super::chart::ChartEvent;
use crate::aggregation::Correlation;
use crate::filter_state::{encode, CorrelationMode, FilterState, TimeRange};
use crate::flow::FlowId;
use crate::navigation::{NavigationRequest, CORRELATION_PATH, FLOW_DETAIL_PATH};

/// Percent-encodes `segment` as a single path segment.
fn path_segment(segment: &str) -> String {
    // '+' only stands for a space here, a literal '+' is already escaped
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Navigation to the detail view of the flow at `index` of `ids`, carrying
/// the current filter along. `None` when the index is out of range.
pub fn flow_detail_request(
    index: usize,
    ids: &[FlowId],
    state: &FilterState,
) -> Option<NavigationRequest> {
    let id = match ids.get(index) {
        Some(id) => id,
        None => {
            warn!("Selected point {} but only {} flow(s) are plotted", index, ids.len());
            return None;
        }
    };
    Some(NavigationRequest {
        path: format!("{}/{}", FLOW_DETAIL_PATH, path_segment(id.as_str())),
        query: encode(state),
        replace: true,
    })
}

/// The state narrowed to the visible x-axis range `(min, max)`.
///
/// Bounds are widened to whole milliseconds. Non-finite bounds are ignored
/// and reversed ones swapped.
pub fn zoom_state(min: f64, max: f64, state: &FilterState) -> Option<FilterState> {
    if !min.is_finite() || !max.is_finite() {
        warn!("Ignoring zoom to non-finite range ({}, {})", min, max);
        return None;
    }
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let range = TimeRange::between(lo.floor() as i64, hi.ceil() as i64);
    debug!("Zoom narrows time range to {}", range);
    Some(state.clone().with_time_range(range))
}

/// Maps chart events of one view to navigation requests.
#[derive(Debug, Clone)]
pub struct InteractionMapper {
    view_path: String,
}

impl Default for InteractionMapper {
    fn default() -> Self {
        Self::new(CORRELATION_PATH)
    }
}

impl InteractionMapper {
    pub fn new<S: Into<String>>(view_path: S) -> Self {
        Self {
            view_path: view_path.into(),
        }
    }

    fn rewrite(&self, state: &FilterState) -> NavigationRequest {
        NavigationRequest {
            path: self.view_path.clone(),
            query: encode(state),
            replace: false,
        }
    }

    /// `state` is the state decoded from the current location and
    /// `correlation` what the chart currently shows.
    pub fn map(
        &self,
        event: &ChartEvent,
        correlation: &Correlation,
        state: &FilterState,
    ) -> Option<NavigationRequest> {
        match event {
            ChartEvent::PointSelected(index) => {
                // bucket points do not stand for a single flow
                if correlation.mode == CorrelationMode::Tags {
                    debug!("Point selection ignored in tags mode");
                    return None;
                }
                flow_detail_request(*index, &correlation.flow_ids, state)
            }
            ChartEvent::Zoomed(min, max) => {
                zoom_state(*min, *max, state).map(|s| self.rewrite(&s))
            }
            ChartEvent::ModeSelected(mode) => {
                Some(self.rewrite(&state.clone().with_mode(*mode)))
            }
            ChartEvent::TagToggled(tag) => Some(self.rewrite(&state.clone().toggle_tag(tag))),
        }
    }
}

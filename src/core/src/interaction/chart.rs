use chrono::DateTime;
use log::{info, trace};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::aggregation::Correlation;
use crate::filter_state::CorrelationMode;

/// A user gesture reported by the chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// Point `index` of the primary series was clicked.
    PointSelected(usize),
    /// The visible x-axis range changed to `(min, max)`.
    Zoomed(f64, f64),
    ModeSelected(CorrelationMode),
    TagToggled(String),
}

/// Callback registrations handed to the renderer with every series.
///
/// Each callback forwards a [`ChartEvent`] to the owning view. Calls after
/// the view is gone are dropped.
#[derive(Debug, Clone)]
pub struct ChartCallbacks {
    tx: UnboundedSender<ChartEvent>,
}

impl ChartCallbacks {
    pub fn channel() -> (Self, UnboundedReceiver<ChartEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: ChartEvent) {
        trace!("chart event {:?}", event);
        let _ = self.tx.send(event);
    }

    pub fn point_selected(&self, index: usize) {
        self.emit(ChartEvent::PointSelected(index));
    }

    pub fn zoomed(&self, min: f64, max: f64) {
        self.emit(ChartEvent::Zoomed(min, max));
    }

    pub fn mode_selected(&self, mode: CorrelationMode) {
        self.emit(ChartEvent::ModeSelected(mode));
    }

    pub fn tag_toggled<S: Into<String>>(&self, tag: S) {
        self.emit(ChartEvent::TagToggled(tag.into()));
    }
}

/// Draws correlations. Implementations keep the callbacks to report user
/// interaction on what they drew.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, correlation: &Correlation, callbacks: &ChartCallbacks);
}

/// Renderer that only logs what it would draw.
#[derive(Debug, Default)]
pub struct LogRenderer;

fn describe_x(x: i64) -> String {
    DateTime::from_timestamp_millis(x)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| x.to_string())
}

impl ChartRenderer for LogRenderer {
    fn render(&self, correlation: &Correlation, _callbacks: &ChartCallbacks) {
        for series in &correlation.series {
            match (series.points.first(), series.points.last()) {
                (Some(first), Some(last)) => info!(
                    "[{}] {} ({:?}): {} point(s) from {} to {}",
                    correlation.mode,
                    series.name,
                    series.kind,
                    series.points.len(),
                    describe_x(first.x),
                    describe_x(last.x)
                ),
                _ => info!(
                    "[{}] {} ({:?}): no points",
                    correlation.mode, series.name, series.kind
                ),
            }
        }
    }
}

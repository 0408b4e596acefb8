use serde::Serialize;

use crate::filter_state::CorrelationMode;
use crate::flow::FlowId;

/// One plotted point. `key` is the flow the point stands for, so a gesture
/// on the point can be traced back to a flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: i64,
    pub y: f64,
    pub key: FlowId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Scatter,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub kind: ChartKind,
    pub points: Vec<ChartPoint>,
}

/// Output of the aggregator for one flow set and one mode.
///
/// `flow_ids` is the ordered id list the chart was built from: index `i` of
/// a per-flow series is the flow `flow_ids[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    pub mode: CorrelationMode,
    pub series: Vec<Series>,
    pub flow_ids: Vec<FlowId>,
}

impl Correlation {
    pub fn empty(mode: CorrelationMode) -> Self {
        Self {
            mode,
            series: Vec::new(),
            flow_ids: Vec::new(),
        }
    }

    pub fn primary(&self) -> Option<&Series> {
        self.series.first()
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

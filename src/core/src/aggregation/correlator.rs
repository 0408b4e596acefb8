use log::debug;

use super::buckets::TagBucketing;
use super::types::{ChartKind, ChartPoint, Correlation, Series};
use crate::filter_state::CorrelationMode;
use crate::flow::Flow;

/// Turns a flow sequence into chart series for a correlation mode.
///
/// - `time`: one scatter point per flow, duration against start time.
/// - `packets`: one scatter point per flow, packet count against start time.
/// - `tags`: one line of tagged-flow counts per time window, see
///   [`TagBucketing`].
#[derive(Debug, Clone, Default)]
pub struct Correlator {
    bucketing: TagBucketing,
}

impl Correlator {
    pub fn new(bucketing: TagBucketing) -> Self {
        Self { bucketing }
    }

    pub fn bucketing(&self) -> &TagBucketing {
        &self.bucketing
    }

    pub fn correlate(&self, flows: &[Flow], mode: CorrelationMode) -> Correlation {
        let series = match mode {
            CorrelationMode::Time => Series {
                name: "Flows".to_string(),
                kind: ChartKind::Scatter,
                points: per_flow(flows, |f| f.duration as f64),
            },
            CorrelationMode::Packets => Series {
                name: "Flows".to_string(),
                kind: ChartKind::Scatter,
                points: per_flow(flows, |f| f.num_packets as f64),
            },
            CorrelationMode::Tags => Series {
                name: self.bucketing.tag.clone(),
                kind: ChartKind::Line,
                points: self.bucketing.buckets(flows),
            },
        };
        debug!(
            "Correlated {} flow(s) in {} mode into {} point(s)",
            flows.len(),
            mode,
            series.points.len()
        );

        Correlation {
            mode,
            series: vec![series],
            flow_ids: flows.iter().map(|f| f.id.clone()).collect(),
        }
    }
}

fn per_flow<F>(flows: &[Flow], y: F) -> Vec<ChartPoint>
where
    F: Fn(&Flow) -> f64,
{
    flows
        .iter()
        .map(|f| ChartPoint {
            x: f.time,
            y: y(f),
            key: f.id.clone(),
        })
        .collect()
}

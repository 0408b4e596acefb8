//! Sliding-window counting of tagged flows.
//!
//! Two policies exist. [`BucketPolicy::Compatible`] reproduces the long
//! standing chart behaviour exactly, quirks included:
//! - the window anchor is reset to `0` after a flush and re-seeded from the
//!   next flow, so a flow at time `0` never moves it;
//! - a flush fires when `anchor - flow.time` exceeds the window, which for
//!   ascending input never happens, so such input yields no bucket at all;
//! - the tag of the flow that triggers a flush is not counted;
//! - the trailing partial window is never emitted.
//!
//! [`BucketPolicy::Corrected`] is what the chart was meant to show: windows
//! measured forward from their first flow, the flushing flow opening (and
//! counting towards) the next window, and the last window emitted.

use log::trace;
use serde::{Deserialize, Serialize};

use super::types::ChartPoint;
use crate::flow::{Flow, FlowId};

pub const DEFAULT_WINDOW_SIZE: i64 = 30_000;
pub const DEFAULT_BUCKET_TAG: &str = "flag-out";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketPolicy {
    #[default]
    Compatible,
    Corrected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBucketing {
    pub window_size: i64,
    pub tag: String,
    pub policy: BucketPolicy,
}

impl Default for TagBucketing {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            tag: DEFAULT_BUCKET_TAG.to_string(),
            policy: BucketPolicy::default(),
        }
    }
}

impl TagBucketing {
    /// Bucket points, in the order their windows are flushed.
    pub fn buckets(&self, flows: &[Flow]) -> Vec<ChartPoint> {
        match self.policy {
            BucketPolicy::Compatible => self.compatible(flows),
            BucketPolicy::Corrected => self.corrected(flows),
        }
    }

    fn compatible(&self, flows: &[Flow]) -> Vec<ChartPoint> {
        let mut out = Vec::new();
        let mut ts: i64 = 0;
        let mut acc: u64 = 0;
        let mut anchor_id: Option<&FlowId> = None;

        for flow in flows {
            if ts == 0 {
                ts = flow.time;
                anchor_id = Some(&flow.id);
            }

            // saturating keeps the comparison exact at the i64 extremes
            if ts.saturating_sub(flow.time) > self.window_size {
                let key = anchor_id.unwrap_or(&flow.id).clone();
                trace!("flush window at {} with {} tagged flow(s)", ts, acc);
                out.push(ChartPoint {
                    x: ts,
                    y: acc as f64,
                    key,
                });
                ts = 0;
                acc = 0;
                anchor_id = None;
            } else if flow.has_tag(&self.tag) {
                acc += 1;
            }
        }

        out
    }

    fn corrected(&self, flows: &[Flow]) -> Vec<ChartPoint> {
        let mut out = Vec::new();
        let mut window: Option<(i64, &FlowId)> = None;
        let mut acc: u64 = 0;

        for flow in flows {
            match window {
                Some((anchor, key)) if flow.time.saturating_sub(anchor) > self.window_size => {
                    trace!("flush window at {} with {} tagged flow(s)", anchor, acc);
                    out.push(ChartPoint {
                        x: anchor,
                        y: acc as f64,
                        key: key.clone(),
                    });
                    window = Some((flow.time, &flow.id));
                    acc = 0;
                }
                Some(_) => {}
                None => window = Some((flow.time, &flow.id)),
            }
            if flow.has_tag(&self.tag) {
                acc += 1;
            }
        }

        if let Some((anchor, key)) = window {
            out.push(ChartPoint {
                x: anchor,
                y: acc as f64,
                key: key.clone(),
            });
        }

        out
    }
}

//! Correlation aggregation: flows in, chart series out.
//!
//! Everything in here is synchronous and total. Any flow sequence, the
//! empty one included, produces a [`Correlation`] without failing.

pub mod buckets;
pub mod correlator;
pub mod types;

pub use buckets::{BucketPolicy, TagBucketing, DEFAULT_BUCKET_TAG, DEFAULT_WINDOW_SIZE};
pub use correlator::Correlator;
pub use types::{ChartKind, ChartPoint, Correlation, Series};

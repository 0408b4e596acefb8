//! Chart interaction: the rendering boundary and the mapping of chart
//! gestures back into filter state and navigation.

pub mod chart;
pub mod mapper;

pub use chart::{ChartCallbacks, ChartEvent, ChartRenderer, LogRenderer};
pub use mapper::{flow_detail_request, zoom_state, InteractionMapper};

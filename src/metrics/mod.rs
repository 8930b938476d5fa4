//! MOTChallenge metrics evaluation module.
//!
//! - `MOTAccumulator` - collect per-frame match/miss/false-positive events
//! - `norm2squared_matrix` - squared Euclidean distance matrices between midpoints
//! - `compute` - MOT metrics (MOTA, MOTP, precision, recall, ...) from an accumulator

mod accumulator;
mod assignment;
mod distances;
mod report;

pub use accumulator::{Event, EventCounts, EventType, MOTAccumulator};
pub use assignment::linear_sum_assignment;
pub use distances::norm2squared_matrix;
pub use report::{compute, Metric, MetricValue, MetricsReport};

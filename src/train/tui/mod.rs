//! Terminal rendering helpers
//!
//! - `sparkline`: inline Unicode chart of a series
//! - `ProgressBar`: bar with Kalman-filtered ETA

mod progress;
mod sparkline;

pub use progress::{format_duration, KalmanEta, ProgressBar};
pub use sparkline::{sparkline, SPARK_CHARS};

//! Evaluation metrics for training and validation
//!
//! - Classification: Accuracy
//! - Regression: MAE
//! - `RunningMean`: size-weighted accumulator used by the metrics callback

mod classification;
mod regression;
mod running;
mod trait_def;


pub use classification::Accuracy;
pub use regression::MAE;
pub use running::RunningMean;
pub use trait_def::Metric;

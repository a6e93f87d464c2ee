//! The learner: a callback-driven fit → epoch → batch loop

mod core;
mod fit;
mod lr_find;
mod scope;
mod state;
pub mod steps;
mod summary;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::core::Learner;
pub use lr_find::LrFindOptions;
pub use state::LearnerState;
pub use steps::{MomentumSteps, NumericStep, NumericSteps, TrainSteps};
pub use summary::ModelSummary;

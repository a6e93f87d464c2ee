//! Data sources for the learner
//!
//! The learner only needs finite, restartable iterables of batches. Anything
//! implementing [`BatchSource`] can be plugged in; [`DataLoader`] is the
//! in-memory implementation with optional seeded shuffling.

mod dataset;
mod loader;

pub use dataset::Dataset;
pub use loader::{BatchSource, Batches, DataLoader, DataLoaders};

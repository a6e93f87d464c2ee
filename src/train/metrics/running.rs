//! Weighted running mean

/// Running mean where every observation carries a weight (e.g. batch size)
///
/// # Example
///
/// ```
/// use aprendiz::train::RunningMean;
///
/// let mut mean = RunningMean::new();
/// mean.update(1.0, 2.0);
/// mean.update(4.0, 1.0);
/// assert_eq!(mean.compute(), Some(2.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMean {
    weighted_sum: f64,
    total_weight: f64,
}

impl RunningMean {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observation
    pub fn update(&mut self, value: f32, weight: f32) {
        self.weighted_sum += f64::from(value) * f64::from(weight);
        self.total_weight += f64::from(weight);
    }

    /// Weighted mean, or `None` before any weight was observed
    pub fn compute(&self) -> Option<f32> {
        (self.total_weight > 0.0).then(|| (self.weighted_sum / self.total_weight) as f32)
    }

    /// Total observed weight
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Forget all observations
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

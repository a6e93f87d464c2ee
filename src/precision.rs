//! Mixed-precision training utilities
//!
//! Mixed-precision training runs the forward pass in a reduced precision
//! (fp16/bf16) while keeping fp32 master weights. Small gradients would
//! underflow in fp16, so the loss gradient is multiplied by a loss scale
//! before the backward pass and the parameter gradients are divided by it
//! again before the optimizer step.
//!
//! ## Example
//!
//! ```
//! use aprendiz::precision::{GradScaler, MixedPrecisionConfig};
//!
//! let config = MixedPrecisionConfig::fp16();
//! let mut scaler = GradScaler::from_config(&config);
//!
//! let scaled = scaler.scale_loss(0.25);
//! assert_eq!(scaled, 0.25 * 65536.0);
//!
//! // After backward: unscale, check for overflow, then update the scale
//! let mut grads = vec![scaled];
//! let valid = scaler.unscale_and_check(&mut grads);
//! scaler.update(valid);
//! ```

use crate::nn::Parameter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data type precision levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 32-bit floating point (default)
    #[default]
    Fp32,
    /// 16-bit floating point (IEEE half precision)
    Fp16,
    /// 16-bit brain floating point (8-bit exponent, 7-bit mantissa)
    Bf16,
}

impl Precision {
    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Precision::Fp32 => "fp32",
            Precision::Fp16 => "fp16",
            Precision::Bf16 => "bf16",
        }
    }

    /// Whether this is a reduced precision type
    pub fn is_reduced(&self) -> bool {
        matches!(self, Precision::Fp16 | Precision::Bf16)
    }

    /// Round an f32 value to what this precision can represent
    pub fn round(&self, value: f32) -> f32 {
        match self {
            Precision::Fp32 => value,
            Precision::Fp16 => half::f16::from_f32(value).to_f32(),
            Precision::Bf16 => half::bf16::from_f32(value).to_f32(),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration for mixed-precision training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixedPrecisionConfig {
    /// Precision for activations inside the autocast region
    pub compute_precision: Precision,
    /// Initial loss scale factor
    pub initial_scale: f32,
    /// Factor to increase scale by after `scale_growth_interval` clean steps
    pub scale_growth_factor: f32,
    /// Factor to decrease scale by on overflow
    pub scale_backoff_factor: f32,
    /// Number of successful steps before increasing scale
    pub scale_growth_interval: usize,
    /// Whether to use dynamic loss scaling
    pub dynamic_scaling: bool,
}

impl MixedPrecisionConfig {
    /// Create fp32 config (no mixed precision)
    pub fn fp32() -> Self {
        Self {
            compute_precision: Precision::Fp32,
            initial_scale: 1.0,
            scale_growth_factor: 2.0,
            scale_backoff_factor: 0.5,
            scale_growth_interval: 2000,
            dynamic_scaling: false,
        }
    }

    /// Create fp16 mixed-precision config
    pub fn fp16() -> Self {
        Self {
            compute_precision: Precision::Fp16,
            initial_scale: 65536.0, // 2^16
            dynamic_scaling: true,
            ..Self::fp32()
        }
    }

    /// Create bf16 mixed-precision config
    ///
    /// bf16 shares the f32 exponent range, so no loss scaling is applied.
    pub fn bf16() -> Self {
        Self {
            compute_precision: Precision::Bf16,
            ..Self::fp32()
        }
    }

    /// Set initial loss scale
    pub fn with_initial_scale(mut self, scale: f32) -> Self {
        self.initial_scale = scale;
        self
    }

    /// Set growth interval
    pub fn with_growth_interval(mut self, steps: usize) -> Self {
        self.scale_growth_interval = steps;
        self
    }
}

impl Default for MixedPrecisionConfig {
    fn default() -> Self {
        Self::fp16()
    }
}

/// Gradient scaler for mixed-precision training
#[derive(Debug, Clone)]
pub struct GradScaler {
    scale: f32,
    growth_factor: f32,
    backoff_factor: f32,
    growth_interval: usize,
    steps_since_growth: usize,
    dynamic: bool,
    overflow_count: usize,
    successful_steps: usize,
}

impl GradScaler {
    /// Create a new gradient scaler with default growth settings
    pub fn new(initial_scale: f32) -> Self {
        Self::from_config(&MixedPrecisionConfig::fp16().with_initial_scale(initial_scale))
    }

    /// Create from config
    pub fn from_config(config: &MixedPrecisionConfig) -> Self {
        Self {
            scale: config.initial_scale,
            growth_factor: config.scale_growth_factor,
            backoff_factor: config.scale_backoff_factor,
            growth_interval: config.scale_growth_interval,
            steps_since_growth: 0,
            dynamic: config.dynamic_scaling,
            overflow_count: 0,
            successful_steps: 0,
        }
    }

    /// Get current scale
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Scale a loss value
    pub fn scale_loss(&self, loss: f32) -> f32 {
        loss * self.scale
    }

    /// Unscale gradients in place and check for overflow
    ///
    /// Returns true if gradients are valid (no overflow), false otherwise.
    pub fn unscale_and_check(&self, grads: &mut [f32]) -> bool {
        let inv_scale = 1.0 / self.scale;
        let mut valid = true;
        for grad in grads.iter_mut() {
            *grad *= inv_scale;
            valid &= grad.is_finite();
        }
        valid
    }

    /// Unscale the gradients of all parameters and check for overflow
    pub fn unscale_params(&self, params: &mut [&mut Parameter]) -> bool {
        let inv_scale = 1.0 / self.scale;
        let mut valid = true;
        for param in params.iter_mut() {
            param.grad.mapv_inplace(|g| g * inv_scale);
            valid &= param.grad.iter().all(|g| g.is_finite());
        }
        valid
    }

    /// Update the scale after a step
    ///
    /// Call this after each optimizer step. Pass `true` if gradients were valid.
    pub fn update(&mut self, grads_valid: bool) {
        if !self.dynamic {
            return;
        }

        if grads_valid {
            self.successful_steps += 1;
            self.steps_since_growth += 1;
            if self.steps_since_growth >= self.growth_interval {
                self.scale *= self.growth_factor;
                self.steps_since_growth = 0;
            }
        } else {
            self.overflow_count += 1;
            self.scale = (self.scale * self.backoff_factor).max(1.0);
            self.steps_since_growth = 0;
        }
    }

    /// Get overflow count
    pub fn overflow_count(&self) -> usize {
        self.overflow_count
    }

    /// Get successful step count
    pub fn successful_steps(&self) -> usize {
        self.successful_steps
    }
}

impl Default for GradScaler {
    fn default() -> Self {
        Self::new(65536.0)
    }
}

//! Fully connected layer: y = xW + b

use super::{Device, Model, Parameter};
use crate::error::{Error, Result};
use crate::Tensor;
use ndarray::Axis;
use rand::Rng;

/// Fully connected layer
///
/// # Example
///
/// ```
/// use aprendiz::nn::{Linear, Model};
/// use ndarray::array;
///
/// let mut layer = Linear::from_weights(array![[2.0], [1.0]], array![[0.5]]);
/// let out = layer.forward(&[array![[1.0, 1.0]]]).unwrap();
/// assert_eq!(out[[0, 0]], 3.5);
/// ```
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Parameter,
    bias: Parameter,
    training: bool,
    device: Device,
    /// Input of the last forward pass, needed for the weight gradient
    cached_input: Option<Tensor>,
}

impl Linear {
    /// Create a layer with all-zero weights
    pub fn zeros(in_features: usize, out_features: usize) -> Self {
        Self::from_weights(
            Tensor::zeros((in_features, out_features)),
            Tensor::zeros((1, out_features)),
        )
    }

    /// Create a layer with uniform(-1/sqrt(in), 1/sqrt(in)) weights
    pub fn init<R: Rng>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (in_features.max(1) as f32).sqrt();
        let weight =
            Tensor::from_shape_fn((in_features, out_features), |_| rng.random_range(-bound..bound));
        let bias = Tensor::from_shape_fn((1, out_features), |_| rng.random_range(-bound..bound));
        Self::from_weights(weight, bias)
    }

    /// Create a layer from explicit weight (in x out) and bias (1 x out)
    pub fn from_weights(weight: Tensor, bias: Tensor) -> Self {
        Self {
            weight: Parameter::new(weight),
            bias: Parameter::new(bias),
            training: true,
            device: Device::Cpu,
            cached_input: None,
        }
    }

    /// Weight matrix
    pub fn weight(&self) -> &Tensor {
        &self.weight.value
    }

    /// Bias row
    pub fn bias(&self) -> &Tensor {
        &self.bias.value
    }

    fn in_features(&self) -> usize {
        self.weight.value.nrows()
    }

    fn out_features(&self) -> usize {
        self.weight.value.ncols()
    }
}

impl Model for Linear {
    fn name(&self) -> &'static str {
        "Linear"
    }

    fn forward(&mut self, inputs: &[Tensor]) -> Result<Tensor> {
        let x = inputs.first().ok_or(Error::MissingState("model input"))?;
        if x.ncols() != self.in_features() {
            return Err(Error::ShapeMismatch {
                context: "linear forward",
                expected: (x.nrows(), self.in_features()),
                actual: x.dim(),
            });
        }
        let out = x.dot(&self.weight.value) + &self.bias.value;
        if self.training {
            self.cached_input = Some(x.clone());
        }
        Ok(out)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<()> {
        let x = self
            .cached_input
            .as_ref()
            .ok_or(Error::MissingState("linear forward input"))?;
        if grad_output.dim() != (x.nrows(), self.out_features()) {
            return Err(Error::ShapeMismatch {
                context: "linear backward",
                expected: (x.nrows(), self.out_features()),
                actual: grad_output.dim(),
            });
        }
        self.weight.grad += &x.t().dot(grad_output);
        self.bias.grad += &grad_output.sum_axis(Axis(0)).insert_axis(Axis(0));
        Ok(())
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        vec![&mut self.weight, &mut self.bias]
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
        if !training {
            self.cached_input = None;
        }
    }

    fn is_training(&self) -> bool {
        self.training
    }

    fn to_device(&mut self, device: Device) {
        self.device = device;
    }

    fn device(&self) -> Device {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::SeedableRng;

    #[test]
    fn test_linear_forward() {
        let mut layer = Linear::from_weights(array![[1.0, 0.0], [0.0, 2.0]], array![[1.0, 1.0]]);
        let out = layer.forward(&[array![[1.0, 2.0], [3.0, 4.0]]]).unwrap();
        assert_eq!(out, array![[2.0, 5.0], [4.0, 9.0]]);
    }

    #[test]
    fn test_linear_backward_accumulates() {
        let mut layer = Linear::zeros(2, 1);
        layer.forward(&[array![[1.0, 2.0], [3.0, 4.0]]]).unwrap();
        layer.backward(&array![[1.0], [1.0]]).unwrap();

        let params = layer.parameters_mut();
        assert_abs_diff_eq!(params[0].grad[[0, 0]], 4.0);
        assert_abs_diff_eq!(params[0].grad[[1, 0]], 6.0);
        assert_abs_diff_eq!(params[1].grad[[0, 0]], 2.0);
    }

    #[test]
    fn test_linear_parameter_count() {
        let mut layer = Linear::zeros(3, 2);
        assert_eq!(layer.name(), "Linear");
        assert_eq!(layer.num_parameters(), 8);
    }

    #[test]
    fn test_linear_shape_mismatch() {
        let mut layer = Linear::zeros(3, 1);
        let err = layer.forward(&[array![[1.0, 2.0]]]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_linear_backward_requires_forward() {
        let mut layer = Linear::zeros(2, 1);
        assert!(layer.backward(&array![[1.0]]).is_err());
    }

    #[test]
    fn test_linear_eval_mode_drops_cache() {
        let mut layer = Linear::zeros(1, 1);
        layer.set_training(false);
        assert!(!layer.is_training());
        layer.forward(&[array![[1.0]]]).unwrap();
        assert!(layer.backward(&array![[1.0]]).is_err());
    }

    #[test]
    fn test_linear_init_bounds() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let layer = Linear::init(4, 3, &mut rng);
        assert!(layer.weight().iter().all(|w| w.abs() <= 0.5));
        assert_eq!(layer.bias().dim(), (1, 3));
    }

    #[test]
    fn test_linear_to_device() {
        let mut layer = Linear::zeros(1, 1);
        layer.to_device(Device::Cuda(0));
        assert_eq!(layer.device(), Device::Cuda(0));
    }
}

//! Device placement callback

use super::{Callback, Hook, HookResult, HookSet};
use crate::nn::Device;
use crate::train::LearnerState;

/// Moves the model to a device before fitting and every batch before use
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceCallback {
    device: Device,
}

impl DeviceCallback {
    /// Dispatch order
    pub const ORDER: i32 = 0;

    /// Create a placement callback for `device`
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    /// Target device
    pub fn device(&self) -> Device {
        self.device
    }
}

impl Callback for DeviceCallback {
    fn name(&self) -> &'static str {
        "DeviceCallback"
    }

    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn hooks(&self) -> HookSet {
        HookSet::of(&[Hook::BeforeFit, Hook::BeforeBatch])
    }

    fn before_fit(&mut self, state: &mut LearnerState) -> HookResult {
        tracing::debug!(device = %self.device, "moving model");
        state.model.to_device(self.device);
        Ok(())
    }

    fn before_batch(&mut self, state: &mut LearnerState) -> HookResult {
        state.batch = state.batch.take().map(|batch| batch.to_device(self.device));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::learner::fixtures::toy_state;
    use crate::train::Batch;
    use ndarray::array;

    #[test]
    fn test_moves_batch() {
        let mut state = toy_state();
        state.batch = Some(Batch::pair(array![[1.0]], array![[2.0]]));

        let mut cb = DeviceCallback::new(Device::Cuda(0));
        cb.before_fit(&mut state).unwrap();
        cb.before_batch(&mut state).unwrap();

        assert_eq!(state.batch.unwrap().device, Device::Cuda(0));
        assert_eq!(state.model.device(), Device::Cuda(0));
    }

    #[test]
    fn test_default_is_cpu() {
        assert_eq!(DeviceCallback::default().device(), Device::Cpu);
    }
}

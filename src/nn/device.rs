//! Compute device descriptor

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target device for model parameters and batches
///
/// There is no process-wide default device: whoever needs placement receives
/// the device explicitly (see `DeviceCallback`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Host memory
    #[default]
    Cpu,
    /// Accelerator with ordinal
    Cuda(usize),
}

impl Device {
    /// Whether this is an accelerator device
    pub fn is_accelerator(&self) -> bool {
        matches!(self, Device::Cuda(_))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_display() {
        assert_eq!(Device::Cpu.to_string(), "cpu");
        assert_eq!(Device::Cuda(1).to_string(), "cuda:1");
    }

    #[test]
    fn test_device_default_is_cpu() {
        assert_eq!(Device::default(), Device::Cpu);
        assert!(!Device::Cpu.is_accelerator());
        assert!(Device::Cuda(0).is_accelerator());
    }
}

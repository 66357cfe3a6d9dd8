//! Device configuration
//!
//! Only the buffer capacity is configurable. The obfuscation key is fixed
//! (see [`crate::transform::KEY`]).

/// Default buffer capacity in bytes
pub const DEFAULT_CAPACITY: usize = 1024;

/// Device configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Buffer capacity in bytes
    capacity: usize,
}

impl DeviceConfig {
    /// Create config with the default capacity (1 KB)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config with a custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Get the buffer capacity
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

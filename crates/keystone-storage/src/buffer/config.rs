//! Buffer pool configuration.

use keystone_common::constants::DEFAULT_POOL_FRAMES;

/// Configuration for the buffer pool.
#[derive(Debug, Clone)]
pub struct BufferPoolConfig {
    /// Number of page frames in the buffer pool.
    pub num_frames: usize,
}

impl BufferPoolConfig {
    /// Creates a configuration with the specified number of frames.
    pub fn new(num_frames: usize) -> Self {
        Self { num_frames }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.num_frames == 0 {
            return Err("num_frames must be > 0");
        }
        Ok(())
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_FRAMES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(BufferPoolConfig::new(1).validate().is_ok());
        assert!(BufferPoolConfig::new(0).validate().is_err());
        assert!(BufferPoolConfig::default().validate().is_ok());
    }
}

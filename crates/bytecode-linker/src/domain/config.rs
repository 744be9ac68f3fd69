//! Linker configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use bytecode_linker::domain::LinkerConfig;
//!
//! let config = LinkerConfig::default()
//!     .with_max_code_size(48 * 1024)
//!     .with_size_limits(true);
//! config.validate()?;
//! ```

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// EIP-170 runtime code size limit.
pub const MAX_CODE_SIZE: usize = 24_576;

/// EIP-3860 init code size limit.
pub const MAX_INIT_CODE_SIZE: usize = 2 * MAX_CODE_SIZE;

/// Limits applied when a contract type is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Maximum runtime payload size in bytes.
    pub max_code_size: usize,
    /// Maximum deployment payload size in bytes.
    pub max_init_code_size: usize,
    /// Reject payloads over the size limits.
    pub enforce_size_limits: bool,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            max_code_size: MAX_CODE_SIZE,
            max_init_code_size: MAX_INIT_CODE_SIZE,
            enforce_size_limits: true,
        }
    }
}

impl LinkerConfig {
    /// Validate limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_code_size == 0 {
            return Err(ConfigError::InvalidLimit {
                field: "max_code_size",
                value: self.max_code_size,
            });
        }

        if self.max_init_code_size == 0 {
            return Err(ConfigError::InvalidLimit {
                field: "max_init_code_size",
                value: self.max_init_code_size,
            });
        }

        Ok(())
    }

    /// Builder-style method to set the runtime size limit
    #[must_use]
    pub fn with_max_code_size(mut self, max: usize) -> Self {
        self.max_code_size = max;
        self
    }

    /// Builder-style method to set the deployment size limit
    #[must_use]
    pub fn with_max_init_code_size(mut self, max: usize) -> Self {
        self.max_init_code_size = max;
        self
    }

    /// Builder-style method to toggle size enforcement
    #[must_use]
    pub fn with_size_limits(mut self, enforce: bool) -> Self {
        self.enforce_size_limits = enforce;
        self
    }
}

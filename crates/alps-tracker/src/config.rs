//! Tracker configuration.

use alps_errors::AlpsError;
use serde::{Deserialize, Serialize};

/// Largest accepted grace period.
pub const MAX_GRACE_FRAMES: u32 = 100;

/// Tracker tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Consecutive unmatched frames a finger survives before it is released.
    /// A finger is released on the `grace_frames + 1`-th missed frame.
    pub grace_frames: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { grace_frames: 1 }
    }
}

impl TrackerConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AlpsError::Config`] if `grace_frames` exceeds
    /// [`MAX_GRACE_FRAMES`].
    pub fn validate(&self) -> Result<(), AlpsError> {
        if self.grace_frames > MAX_GRACE_FRAMES {
            return Err(AlpsError::config(format!(
                "grace_frames must be at most {MAX_GRACE_FRAMES}, got {}",
                self.grace_frames
            )));
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> TrackerConfigBuilder {
        TrackerConfigBuilder::default()
    }
}

/// Builder for [`TrackerConfig`].
#[derive(Debug, Default)]
pub struct TrackerConfigBuilder {
    config: TrackerConfig,
}

impl TrackerConfigBuilder {
    /// Set the grace period in frames.
    #[must_use]
    pub fn grace_frames(mut self, frames: u32) -> Self {
        self.config.grace_frames = frames;
        self
    }

    /// Build and validate.
    ///
    /// # Errors
    ///
    /// Returns the validation error of [`TrackerConfig::validate`].
    pub fn build(self) -> Result<TrackerConfig, AlpsError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

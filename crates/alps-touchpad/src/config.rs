//! Session configuration.
//!
//! A [`TouchpadConfig`] is usually read from YAML and then adjusted from the
//! environment:
//!
//! ```yaml
//! tracker:
//!   grace_frames: 2
//! trackpoint_divisor: 2
//! geometry:
//!   x_max: 4095
//!   y_max: 2047
//!   x_bits: 23
//!   y_bits: 12
//! ```
//!
//! Every field is optional. `ALPS_GRACE_FRAMES` and `ALPS_TRACKPOINT_DIVISOR`
//! override the file; unparsable values are ignored with a warning.

use std::path::Path;

use alps_errors::AlpsError;
use alps_protocol::SensorGeometry;
use alps_tracker::TrackerConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const GRACE_FRAMES_ENV: &str = "ALPS_GRACE_FRAMES";
const TRACKPOINT_DIVISOR_ENV: &str = "ALPS_TRACKPOINT_DIVISOR";

/// Largest accepted trackpoint divisor.
pub const MAX_TRACKPOINT_DIVISOR: i32 = 64;

/// Configuration of one touchpad session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchpadConfig {
    /// Virtual finger tracker tuning
    pub tracker: TrackerConfig,
    /// Replaces the protocol's default sensor geometry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<SensorGeometry>,
    /// Replaces the V6 trackpoint divisor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trackpoint_divisor: Option<i32>,
}

impl TouchpadConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`AlpsError::Config`] if the document does not parse or the
    /// result fails [`validate`](Self::validate).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AlpsError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| AlpsError::config(format!("invalid touchpad config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`AlpsError::Io`] if the file cannot be read, otherwise as
    /// [`from_yaml_str`](Self::from_yaml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AlpsError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        debug!("loaded touchpad config from {}", path.display());
        Self::from_yaml_str(&yaml)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`AlpsError::Config`] if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, AlpsError> {
        serde_yaml::to_string(self)
            .map_err(|e| AlpsError::config(format!("cannot serialize touchpad config: {e}")))
    }

    /// Apply `ALPS_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        for key in [GRACE_FRAMES_ENV, TRACKPOINT_DIVISOR_ENV] {
            if let Ok(value) = std::env::var(key) {
                self.apply_override(key, &value);
            }
        }
        self
    }

    fn apply_override(&mut self, key: &str, value: &str) {
        match key {
            GRACE_FRAMES_ENV => match parse_count(value) {
                Some(frames) => self.tracker.grace_frames = frames,
                None => warn!("ignoring {}={:?}: not a frame count", key, value),
            },
            TRACKPOINT_DIVISOR_ENV => {
                match parse_count(value).and_then(|v| i32::try_from(v).ok()) {
                    Some(divisor) => self.trackpoint_divisor = Some(divisor),
                    None => warn!("ignoring {}={:?}: not a divisor", key, value),
                }
            }
            _ => {}
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AlpsError::Config`] for an out-of-range tracker setting, a
    /// divisor outside `1..=MAX_TRACKPOINT_DIVISOR`, or a geometry with a
    /// non-positive range.
    pub fn validate(&self) -> Result<(), AlpsError> {
        self.tracker.validate()?;

        if let Some(divisor) = self.trackpoint_divisor {
            if !(1..=MAX_TRACKPOINT_DIVISOR).contains(&divisor) {
                return Err(AlpsError::config(format!(
                    "trackpoint_divisor must be in 1..={MAX_TRACKPOINT_DIVISOR}, got {divisor}"
                )));
            }
        }

        if let Some(geometry) = self.geometry {
            if geometry.x_max <= 0 || geometry.y_max <= 0 {
                return Err(AlpsError::config(format!(
                    "geometry range must be positive, got {}x{}",
                    geometry.x_max, geometry.y_max
                )));
            }
        }
        Ok(())
    }
}

fn parse_count(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

//! Common imports for virtual finger tracking.

pub use crate::config::TrackerConfig;
pub use crate::finger::{FingerType, PhysicalContact, TouchFrame, TrackedContact};
pub use crate::tracker::Tracker;

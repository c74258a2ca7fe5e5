//! Common imports for driving a touchpad session.

pub use crate::config::TouchpadConfig;
pub use crate::session::{AlpsTouchpad, Report, SessionStats, TouchReport};

pub use alps_errors::{AlpsError, DecodeError};
pub use alps_protocol::{Ps2Packet, Ss4Otp, TrackstickReport};
pub use alps_tracker::{FingerType, TouchFrame, TrackedContact};

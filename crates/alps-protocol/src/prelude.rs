//! Common imports for decoding ALPS packets.
//!
//! ```
//! use alps_protocol::prelude::*;
//!
//! let identity = identify([0x73, 0x00, 0x14], [0, 0, 0])?;
//! let ctx = DecodeContext::new(identity)?;
//! assert_eq!(ctx.version(), ProtocolVersion::V6);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use crate::context::{DecodeContext, ProtocolFamily};
pub use crate::decode::decode;
pub use crate::fields::{Decoded, DecodedFields, DropReason, MtPos, Ps2Packet, TrackstickReport};
pub use crate::framer::{Framed, PacketFramer, RawPacket};
pub use crate::geometry::{SensorGeometry, Ss4Otp};
pub use crate::ids::MAX_TOUCHES;
pub use crate::registry::{Identity, ProtocolFlags, ProtocolVersion, identify};

pub use alps_errors::{DecodeError, DecodeResult, IdentifyError};

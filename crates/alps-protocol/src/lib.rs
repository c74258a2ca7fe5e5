//! ALPS touchpad protocol: identification, packet framing and decoding.
//!
//! This crate is I/O-free and allocation-free on the decode path. It provides
//! pure functions and `Copy` types that can be tested and fuzzed without a
//! PS/2 controller. The transport reads the identification reports and feeds
//! bytes; everything between the byte stream and a normalized
//! [`DecodedFields`] lives here.
//!
//! # Architecture
//!
//! - [`registry`]: E7/EC signature to [`ProtocolDescriptor`]
//! - [`context`]: per-device [`DecodeContext`] (flags, geometry, reassembly state)
//! - [`framer`]: byte-at-a-time [`PacketFramer`] with resync
//! - [`decode`]: per-family packet decoders behind [`decode()`](decode::decode)
//! - [`bitmap`]: electrode bitmap to contact corners
//! - [`geometry`]: [`SensorGeometry`] defaults and OTP refinement
//! - [`fields`]: decoded output types
//! - [`ids`]: hardware constants

#![deny(static_mut_refs)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod bitmap;
pub mod context;
pub mod decode;
pub mod fields;
pub mod framer;
pub mod geometry;
pub mod ids;
pub mod prelude;
pub mod registry;

pub use context::{DecodeContext, ProtocolFamily};
pub use decode::{Ss4PacketId, V7PacketId, decode, ss4_packet_id, v7_packet_id};
pub use fields::{
    Decoded, DecodedFields, DropReason, LegacyExtras, MtPos, Ps2Packet, TrackstickReport,
};
pub use framer::{Framed, PacketFramer, RawPacket};
pub use geometry::{SensorGeometry, Ss4Otp};
pub use ids::MAX_TOUCHES;
pub use registry::{
    Identity, ProtocolDescriptor, ProtocolFlags, ProtocolVersion, identify, is_alps_e6_report,
    lookup,
};

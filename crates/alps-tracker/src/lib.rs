//! Virtual finger tracking for ALPS touchpads.
//!
//! ALPS hardware reports up to five contacts per frame, but the slot a
//! contact occupies can change from one frame to the next. [`Tracker`] maps
//! those contacts onto a fixed pool of virtual fingers whose identity tags
//! ([`FingerType`]) stay stable for the whole of a touch, smooths their
//! coordinates, and absorbs single-frame dropouts.
//!
//! The tracker is allocation-free and deterministic: the same contact lists
//! in the same order always produce the same frames.

#![deny(static_mut_refs)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod finger;
pub mod prelude;
pub mod tracker;

pub use config::{TrackerConfig, TrackerConfigBuilder};
pub use finger::{
    FingerState, FingerType, FrameDiagnostics, PhysicalContact, TouchFrame, TrackedContact,
    VirtualFinger,
};
pub use tracker::Tracker;

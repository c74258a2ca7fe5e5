//! Contact, finger and frame types.

use alps_errors::TrackingError;
use alps_filters::MovingAverage;
use alps_protocol::MAX_TOUCHES;
use serde::{Deserialize, Serialize};

/// Smoothing window of reported coordinates.
pub const SMOOTHING_WINDOW: usize = 5;

/// One contact as reported by the hardware for a single frame.
///
/// `slot` is the hardware's position in its contact list. It is not stable
/// across frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalContact {
    /// X in device units
    pub x: i32,
    /// Y in device units
    pub y: i32,
    /// Pressure
    pub z: i32,
    /// Hardware slot
    pub slot: usize,
}

impl PhysicalContact {
    /// Create a contact.
    pub const fn new(x: i32, y: i32, z: i32, slot: usize) -> Self {
        Self { x, y, z, slot }
    }
}

/// Stable identity tag of a virtual finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FingerType {
    /// First finger down
    Index = 1,
    /// Second
    Middle = 2,
    /// Third
    Ring = 3,
    /// Fourth
    Little = 4,
    /// Fifth
    Thumb = 5,
}

impl FingerType {
    /// All tags in allocation order.
    pub const ALL: [FingerType; MAX_TOUCHES] = [
        FingerType::Index,
        FingerType::Middle,
        FingerType::Ring,
        FingerType::Little,
        FingerType::Thumb,
    ];

    /// Numeric tag, 1 to 5.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// Lifecycle state of a pool entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FingerState {
    /// Not bound to a contact
    #[default]
    Free,
    /// Bound to a continuous touch
    Touching,
}

/// One entry of the virtual finger pool.
#[derive(Debug, Clone, Copy)]
pub struct VirtualFinger {
    pub(crate) finger: FingerType,
    pub(crate) state: FingerState,
    pub(crate) x: MovingAverage<i32, SMOOTHING_WINDOW>,
    pub(crate) y: MovingAverage<i32, SMOOTHING_WINDOW>,
    pub(crate) pressure: i32,
    pub(crate) button: bool,
    pub(crate) missed: u32,
    pub(crate) slot: Option<usize>,
}

impl VirtualFinger {
    pub(crate) fn new(finger: FingerType) -> Self {
        Self {
            finger,
            state: FingerState::Free,
            x: MovingAverage::new(),
            y: MovingAverage::new(),
            pressure: 0,
            button: false,
            missed: 0,
            slot: None,
        }
    }

    /// Identity tag.
    pub fn finger(&self) -> FingerType {
        self.finger
    }

    /// Lifecycle state.
    pub fn state(&self) -> FingerState {
        self.state
    }

    /// Whether the finger is bound to a touch.
    pub fn in_use(&self) -> bool {
        self.state == FingerState::Touching
    }

    /// Smoothed position.
    pub fn position(&self) -> (i32, i32) {
        (self.x.average(), self.y.average())
    }

    /// Newest unsmoothed position; matching distances are measured from here.
    pub fn raw_position(&self) -> (i32, i32) {
        (self.x.newest(), self.y.newest())
    }

    /// Consecutive frames without a matching contact.
    pub fn missed_frames(&self) -> u32 {
        self.missed
    }

    pub(crate) fn bind(&mut self, contact: &PhysicalContact, button: bool) {
        if self.state == FingerState::Free {
            self.x = MovingAverage::new();
            self.y = MovingAverage::new();
        }
        self.state = FingerState::Touching;
        self.x.filter(contact.x);
        self.y.filter(contact.y);
        self.pressure = contact.z;
        self.button = button;
        self.missed = 0;
        self.slot = Some(contact.slot);
    }

    pub(crate) fn release(&mut self) {
        *self = Self::new(self.finger);
    }

    pub(crate) fn report(&self) -> TrackedContact {
        let (x, y) = self.position();
        TrackedContact {
            finger: self.finger,
            x,
            y,
            pressure: self.pressure,
            button: self.button,
            slot: self.slot,
        }
    }
}

/// A touching virtual finger as reported in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackedContact {
    /// Identity tag
    pub finger: FingerType,
    /// Smoothed X
    pub x: i32,
    /// Smoothed Y
    pub y: i32,
    /// Pressure of the last matched contact
    pub pressure: i32,
    /// Button state of the last matched frame
    pub button: bool,
    /// Hardware slot matched this frame; `None` while in grace
    pub slot: Option<usize>,
}

/// Per-frame tracker conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameDiagnostics {
    /// Set when contacts were dropped for lack of free fingers
    pub capacity: Option<TrackingError>,
    /// Fingers released this frame
    pub released: usize,
    /// Fingers allocated this frame
    pub allocated: usize,
}

/// Output of one tracker step: every touching finger, in tag order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchFrame {
    contacts: [Option<TrackedContact>; MAX_TOUCHES],
    /// Button state of this frame
    pub button: bool,
    /// Conditions raised while building this frame
    pub diagnostics: FrameDiagnostics,
}

impl TouchFrame {
    pub(crate) fn new(button: bool) -> Self {
        Self {
            contacts: [None; MAX_TOUCHES],
            button,
            diagnostics: FrameDiagnostics::default(),
        }
    }

    pub(crate) fn set(&mut self, index: usize, contact: TrackedContact) {
        if let Some(entry) = self.contacts.get_mut(index) {
            *entry = Some(contact);
        }
    }

    /// Touching fingers in tag order.
    pub fn contacts(&self) -> impl Iterator<Item = &TrackedContact> + '_ {
        self.contacts.iter().flatten()
    }

    /// The finger with a given tag, if touching.
    pub fn finger(&self, finger: FingerType) -> Option<&TrackedContact> {
        self.contacts().find(|c| c.finger == finger)
    }

    /// Number of touching fingers.
    pub fn len(&self) -> usize {
        self.contacts().count()
    }

    /// Whether no finger is touching.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

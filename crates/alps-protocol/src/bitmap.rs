//! Bitmap decoder for the V3, V4 and V5 position/bitmap protocols.
//!
//! These sensors report which X and which Y electrodes see a contact, not
//! where each finger is. With two fingers down the two runs on each axis give
//! four candidate corners; the real contacts sit on one of the diagonals. The
//! decoder keeps the single-touch position as the first contact and picks the
//! corner opposite the one nearest to it as the second. That corner is chosen
//! once per two-finger sequence so the second contact does not jump between
//! diagonals while the first finger moves.
//!
//! Overlapping or adjacent fingers produce a single run on an axis; that run
//! is split in two. Palms and three-finger shapes are approximated the same
//! way, which is an intrinsic limit of bitmap sensors.

use crate::context::DecodeContext;
use crate::fields::{DecodedFields, MtPos};
use crate::geometry::SensorGeometry;
use crate::registry::ProtocolVersion;

/// A run of consecutive set bits in an electrode bitmap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitmapPoint {
    /// Index of the lowest bit of the run
    pub start_bit: u32,
    /// Length of the run
    pub num_bits: u32,
}

/// Runs found on one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisRuns {
    /// First run
    pub low: BitmapPoint,
    /// Last run (the second run when there are exactly two)
    pub high: BitmapPoint,
    /// Number of runs
    pub count: usize,
}

impl AxisRuns {
    /// Scan a bitmap from bit 0 upwards.
    pub fn scan(map: u32) -> Self {
        let mut runs = Self::default();
        let mut prev = false;
        let mut in_high = false;

        for i in 0..u32::BITS {
            let bit = (map >> i) & 1 != 0;
            if bit {
                let point = if in_high { &mut runs.high } else { &mut runs.low };
                if !prev {
                    point.start_bit = i;
                    point.num_bits = 0;
                    runs.count += 1;
                }
                point.num_bits += 1;
            } else if prev {
                in_high = true;
            }
            prev = bit;
        }
        runs
    }

    /// Split a single run into two halves, for fingers that touch the same
    /// electrodes on this axis.
    fn split_single(&mut self) {
        if self.count != 1 {
            return;
        }
        let i = self.low.num_bits.saturating_sub(1) / 2;
        self.low.num_bits -= i;
        self.high.start_bit = self.low.start_bit + i;
        self.high.num_bits = i.max(1);
    }
}

/// Axis whose bitmap is stored in reverse electrode order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirror {
    /// Both axes in natural order
    None,
    /// X reversed (Dolphin)
    X,
    /// Y reversed (Pinnacle and V4)
    Y,
}

impl Mirror {
    /// Mirror convention of a protocol version.
    pub fn for_version(version: ProtocolVersion) -> Self {
        match version {
            ProtocolVersion::V5 => Self::X,
            ProtocolVersion::V3 | ProtocolVersion::V4 => Self::Y,
            _ => Self::None,
        }
    }
}

/// Centre of a run in device units.
fn electrode_center(max: i32, bits: u32, point: BitmapPoint) -> i64 {
    let span = 2 * (i64::from(bits) - 1);
    if span <= 0 {
        return 0;
    }
    let pos = 2 * i64::from(point.start_bit) + i64::from(point.num_bits) - 1;
    i64::from(max) * pos / span
}

fn to_unit(v: i64) -> u32 {
    u32::try_from(v.max(0)).unwrap_or(u32::MAX)
}

/// The four candidate corners spanned by two runs per axis.
///
/// Order: (low X, low Y), (high X, low Y), (high X, high Y), (low X, high Y),
/// so corner `i` and corner `(i + 2) % 4` are diagonal opposites.
/// Returns the corners and the finger count seen in the bitmaps, or `None`
/// if either bitmap is empty.
pub fn corners(
    x_map: u32,
    y_map: u32,
    geometry: &SensorGeometry,
    mirror: Mirror,
) -> Option<([MtPos; 4], usize)> {
    if x_map == 0 || y_map == 0 {
        return None;
    }

    let mut x = AxisRuns::scan(x_map);
    let mut y = AxisRuns::scan(y_map);

    // fingers can overlap, so the larger count wins
    let fingers = x.count.max(y.count);

    x.split_single();
    y.split_single();

    let mut x_low = electrode_center(geometry.x_max, geometry.x_bits, x.low);
    let mut x_high = electrode_center(geometry.x_max, geometry.x_bits, x.high);
    let mut y_low = electrode_center(geometry.y_max, geometry.y_bits, y.low);
    let mut y_high = electrode_center(geometry.y_max, geometry.y_bits, y.high);

    match mirror {
        Mirror::X => {
            x_low = i64::from(geometry.x_max) - x_low;
            x_high = i64::from(geometry.x_max) - x_high;
        }
        Mirror::Y => {
            y_low = i64::from(geometry.y_max) - y_low;
            y_high = i64::from(geometry.y_max) - y_high;
        }
        Mirror::None => {}
    }

    let (x_low, x_high) = (to_unit(x_low), to_unit(x_high));
    let (y_low, y_high) = (to_unit(y_low), to_unit(y_high));

    Some((
        [
            MtPos::new(x_low, y_low),
            MtPos::new(x_high, y_low),
            MtPos::new(x_high, y_high),
            MtPos::new(x_low, y_high),
        ],
        fingers,
    ))
}

/// Index of the corner nearest to `st`; the first of equal distances wins.
pub fn nearest_corner(st: MtPos, corners: &[MtPos; 4]) -> usize {
    let mut closest = i64::MAX;
    let mut index = 0;
    for (i, c) in corners.iter().enumerate() {
        let dx = i64::from(st.x) - i64::from(c.x);
        let dy = i64::from(st.y) - i64::from(c.y);
        let distance = dx * dx + dy * dy;
        if distance < closest {
            closest = distance;
            index = i;
        }
    }
    index
}

/// Turn the bitmaps in `fields` into two contacts.
///
/// Sets `mt[0]` to the single-touch position and `mt[1]` to the paired corner.
/// Returns the finger count seen in the bitmaps, or 0 if either map is empty
/// (the caller then falls back to the single-touch position).
pub(crate) fn process_bitmap(fields: &mut DecodedFields, ctx: &mut DecodeContext) -> usize {
    let mirror = Mirror::for_version(ctx.version());
    let Some((corner, fingers)) = corners(fields.x_map, fields.y_map, &ctx.geometry, mirror) else {
        return 0;
    };

    let second = match ctx.second_touch {
        Some(i) => i,
        None => {
            let i = (nearest_corner(fields.st, &corner) + 2) % 4;
            ctx.second_touch = Some(i);
            i
        }
    };

    fields.mt[0] = fields.st;
    fields.mt[1] = corner.get(second).copied().unwrap_or_default();
    fingers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rushmore() -> SensorGeometry {
        SensorGeometry::for_version(ProtocolVersion::V3Rushmore)
    }

    #[test]
    fn test_scan_two_runs() {
        let runs = AxisRuns::scan(0b0111_0011_0000);
        assert_eq!(runs.count, 2);
        assert_eq!(runs.low, BitmapPoint { start_bit: 4, num_bits: 2 });
        assert_eq!(runs.high, BitmapPoint { start_bit: 8, num_bits: 3 });
    }

    #[test]
    fn test_scan_three_runs_keeps_last() {
        let runs = AxisRuns::scan(0b1_0101);
        assert_eq!(runs.count, 3);
        assert_eq!(runs.low.start_bit, 0);
        assert_eq!(runs.high.start_bit, 4);
    }

    #[test]
    fn test_single_run_is_split() {
        let mut runs = AxisRuns::scan(0b1111_1000);
        runs.split_single();
        assert_eq!(runs.low, BitmapPoint { start_bit: 3, num_bits: 3 });
        assert_eq!(runs.high, BitmapPoint { start_bit: 5, num_bits: 2 });

        let mut runs = AxisRuns::scan(0b100);
        runs.split_single();
        assert_eq!(runs.low, BitmapPoint { start_bit: 2, num_bits: 1 });
        assert_eq!(runs.high, BitmapPoint { start_bit: 2, num_bits: 1 });
    }

    #[test]
    fn test_empty_map_yields_nothing() {
        assert!(corners(0, 0b10, &rushmore(), Mirror::None).is_none());
        assert!(corners(0b10, 0, &rushmore(), Mirror::None).is_none());
    }

    #[test]
    fn test_corner_layout() -> Result<(), Box<dyn std::error::Error>> {
        let g = rushmore();
        let (c, fingers) = corners(0b0010_0100, 0b1010, &g, Mirror::None).ok_or("no corners")?;
        assert_eq!(fingers, 2);
        // x: 2000 * (2*2) / 30 and 2000 * (2*5) / 30
        // y: 1400 * (2*1) / 22 and 1400 * (2*3) / 22
        assert_eq!(c[0], MtPos::new(266, 127));
        assert_eq!(c[1], MtPos::new(666, 127));
        assert_eq!(c[2], MtPos::new(666, 381));
        assert_eq!(c[3], MtPos::new(266, 381));
        Ok(())
    }

    #[test]
    fn test_mirrors() -> Result<(), Box<dyn std::error::Error>> {
        let g = rushmore();
        let (c, _) = corners(0b0010_0100, 0b1010, &g, Mirror::Y).ok_or("no corners")?;
        assert_eq!(c[0], MtPos::new(266, 1400 - 127));
        let (c, _) = corners(0b0010_0100, 0b1010, &g, Mirror::X).ok_or("no corners")?;
        assert_eq!(c[0], MtPos::new(2000 - 266, 127));
        Ok(())
    }

    #[test]
    fn test_nearest_corner_prefers_first_on_tie() {
        let c = [MtPos::new(0, 0), MtPos::new(10, 0), MtPos::new(10, 10), MtPos::new(0, 10)];
        assert_eq!(nearest_corner(MtPos::new(5, 5), &c), 0);
        assert_eq!(nearest_corner(MtPos::new(9, 9), &c), 2);
    }

    #[test]
    fn test_degenerate_geometry_does_not_divide_by_zero() -> Result<(), Box<dyn std::error::Error>> {
        let g = SensorGeometry {
            x_bits: 1,
            y_bits: 0,
            ..rushmore()
        };
        let (c, _) = corners(0b1, 0b1, &g, Mirror::None).ok_or("no corners")?;
        assert_eq!(c[2], MtPos::new(0, 0));
        Ok(())
    }
}

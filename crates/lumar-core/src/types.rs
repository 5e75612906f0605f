use glam::IVec2;

use crate::constants::KNOWN_LOCATION_COUNT;
use crate::math::{cell_of, distance_sq};

/// Stable identifier of a connected observer (player).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

/// Stable identifier of a world entity (rainlines).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Two 32-bit cell coordinates packed into one 64-bit key.
///
/// Bit layout:
///   [32:63] cell x (two's complement bits)
///   [0:31]  cell z (two's complement bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey(pub u64);

impl CellKey {
    pub fn pack(cell_x: i32, cell_z: i32) -> Self {
        Self(((cell_x as u32 as u64) << 32) | (cell_z as u32 as u64))
    }

    pub fn unpack(self) -> (i32, i32) {
        ((self.0 >> 32) as u32 as i32, self.0 as u32 as i32)
    }

    /// Key of the cell containing a world position.
    pub fn containing(x: i32, z: i32, grid_spacing: u32) -> Self {
        let cell = cell_of(x, z, grid_spacing);
        Self::pack(cell.x, cell.y)
    }
}

/// A generated point of interest. Immutable; re-derived rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LunagreeLocation {
    pub x: i32,
    pub z: i32,
    pub cell_x: i32,
    pub cell_z: i32,
}

impl LunagreeLocation {
    /// Rebuild a location from its position. Generated positions always lie
    /// inside their own cell, so the cell is recoverable from the spacing.
    pub fn at(x: i32, z: i32, grid_spacing: u32) -> Self {
        let cell = cell_of(x, z, grid_spacing);
        Self {
            x,
            z,
            cell_x: cell.x,
            cell_z: cell.y,
        }
    }

    pub fn position(&self) -> IVec2 {
        IVec2::new(self.x, self.z)
    }

    pub fn cell(&self) -> CellKey {
        CellKey::pack(self.cell_x, self.cell_z)
    }

    /// Squared horizontal distance to a block position.
    pub fn distance_sq_to(&self, x: i32, z: i32) -> i64 {
        distance_sq(self.x, self.z, x, z)
    }
}

/// The nearest lunagrees known to one observer, closest first.
/// Unused trailing slots are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KnownLocationSet {
    slots: [Option<LunagreeLocation>; KNOWN_LOCATION_COUNT],
}

impl KnownLocationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from locations already sorted closest first. Extra entries are dropped.
    pub fn from_sorted<I>(locations: I) -> Self
    where
        I: IntoIterator<Item = LunagreeLocation>,
    {
        let mut set = Self::empty();
        for (slot, location) in set.slots.iter_mut().zip(locations) {
            *slot = Some(location);
        }
        set
    }

    /// Build from raw slots, e.g. decoded wire or save data. Gaps are compacted
    /// so present entries stay at the front in their original order.
    pub fn from_slots(slots: [Option<LunagreeLocation>; KNOWN_LOCATION_COUNT]) -> Self {
        Self::from_sorted(slots.into_iter().flatten())
    }

    pub fn slots(&self) -> &[Option<LunagreeLocation>; KNOWN_LOCATION_COUNT] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<LunagreeLocation> {
        self.slots.get(index).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LunagreeLocation> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }

    /// Closest stored location to `(x, z)` with its squared distance.
    /// Ties resolve to the earlier slot.
    pub fn closest_to(&self, x: i32, z: i32) -> Option<(LunagreeLocation, i64)> {
        let mut best: Option<(LunagreeLocation, i64)> = None;
        for location in self.iter() {
            let d = location.distance_sq_to(x, z);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((*location, d));
            }
        }
        best
    }

    /// Closest stored location, or `None` if it lies beyond `max_distance`.
    /// A non-positive `max_distance` disables the cutoff.
    pub fn nearest(&self, x: i32, z: i32, max_distance: i32) -> Option<LunagreeLocation> {
        let (location, d) = self.closest_to(x, z)?;
        if max_distance > 0 {
            let max = max_distance as i64;
            if d > max * max {
                return None;
            }
        }
        Some(location)
    }

    /// Whether the closest stored location is within `radius` of `(x, z)`.
    /// A negative radius contains nothing; radius 0 contains the point itself.
    pub fn is_inside_radius(&self, x: i32, z: i32, radius: i32) -> bool {
        within_radius(self.closest_to(x, z), radius)
    }
}

/// Whether a `closest_to` answer lies within `radius`.
pub fn within_radius(closest: Option<(LunagreeLocation, i64)>, radius: i32) -> bool {
    if radius < 0 {
        return false;
    }
    let r = radius as i64;
    closest.is_some_and(|(_, d)| d <= r * r)
}

/// Per-world seethe cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeetheState {
    pub is_active: bool,
    pub cycle_steps_remaining: u32,
    pub cycles_until_long_inactive: u32,
}

use lumar_core::constants::KNOWN_LOCATION_COUNT;
use lumar_core::types::{KnownLocationSet, LunagreeLocation, ObserverId};

/// Magic bytes identifying a Lumar save file.
pub const MAGIC: [u8; 4] = *b"LUMR";

/// Current save format version.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 56;

/// Size of each observer entry: id u64, present mask u32, 9 × (x i32, z i32).
pub const OBSERVER_ENTRY_SIZE: usize = 8 + 4 + KNOWN_LOCATION_COUNT * 8;

/// Save file header. Fixed 56 bytes, repr(C) for byte-level serialization.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SaveHeader {
    pub magic: [u8; 4],
    pub version: u16,
    pub _pad0: u16,
    pub world_seed: u64,
    pub step_count: u64,
    /// Seethe durations drawn so far.
    pub seethe_draws: u64,
    pub seethe_steps_remaining: u32,
    pub seethe_cycles_until_long_inactive: u32,
    /// 0 = inactive, anything else = active.
    pub seethe_active: u32,
    pub observer_count: u32,
    /// Grid spacing the stored known sets were computed with.
    pub grid_spacing: u32,
    pub _pad1: u32,
}

/// Append one observer entry in little-endian order.
pub(crate) fn write_observer(out: &mut Vec<u8>, id: ObserverId, known: &KnownLocationSet) {
    let mut mask = 0u32;
    for (i, slot) in known.slots().iter().enumerate() {
        if slot.is_some() {
            mask |= 1 << i;
        }
    }
    out.extend_from_slice(&id.0.to_le_bytes());
    out.extend_from_slice(&mask.to_le_bytes());
    for slot in known.slots() {
        let (x, z) = slot.map(|l| (l.x, l.z)).unwrap_or((0, 0));
        out.extend_from_slice(&x.to_le_bytes());
        out.extend_from_slice(&z.to_le_bytes());
    }
}

/// Parse one observer entry. `entry` must be exactly `OBSERVER_ENTRY_SIZE` bytes.
pub(crate) fn read_observer(entry: &[u8], grid_spacing: u32) -> (ObserverId, KnownLocationSet) {
    let id = u64::from_le_bytes(le_array(&entry[0..8]));
    let mask = u32::from_le_bytes(le_array(&entry[8..12]));

    let mut slots = [None; KNOWN_LOCATION_COUNT];
    for (i, slot) in slots.iter_mut().enumerate() {
        if mask & (1 << i) == 0 {
            continue;
        }
        let base = 12 + i * 8;
        let x = i32::from_le_bytes(le_array(&entry[base..base + 4]));
        let z = i32::from_le_bytes(le_array(&entry[base + 4..base + 8]));
        *slot = Some(LunagreeLocation::at(x, z, grid_spacing));
    }
    (ObserverId(id), KnownLocationSet::from_slots(slots))
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

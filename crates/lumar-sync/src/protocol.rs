//! # Wire format
//!
//! Every frame starts with a 2-byte header: `tag: u8`, `version: u8`.
//! All integers are little-endian.
//!
//! | tag | payload | frame size |
//! |-----|---------|------------|
//! | 1 known locations | `present_mask: u16`, 9 × (`x: i32`, `z: i32`) | 76 |
//! | 2 seethe | `is_active: u8`, `steps_remaining: u32`, `cycles_until_long_inactive: u32` | 11 |
//!
//! Absent known-location slots are written as zeros.

use lumar_core::constants::KNOWN_LOCATION_COUNT;
use lumar_core::types::{KnownLocationSet, LunagreeLocation, SeetheState};

use crate::error::DecodeError;

/// Protocol version written into every frame header.
pub const PROTOCOL_VERSION: u8 = 1;

/// Size of the common frame header.
pub const HEADER_SIZE: usize = 2;

/// Types of frames in the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameTag {
    /// Server -> Client: the observer's nearest lunagrees.
    KnownLocations = 1,
    /// Server -> Client: the world's seethe state.
    Seethe = 2,
}

impl FrameTag {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::KnownLocations),
            2 => Some(Self::Seethe),
            _ => None,
        }
    }

    /// Total frame size including the header.
    pub const fn frame_size(self) -> usize {
        match self {
            Self::KnownLocations => HEADER_SIZE + 2 + KNOWN_LOCATION_COUNT * 8,
            Self::Seethe => HEADER_SIZE + 1 + 4 + 4,
        }
    }
}

/// A decoded frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    KnownLocations(KnownLocationSet),
    Seethe(SeetheState),
}

impl Frame {
    pub fn tag(&self) -> FrameTag {
        match self {
            Self::KnownLocations(_) => FrameTag::KnownLocations,
            Self::Seethe(_) => FrameTag::Seethe,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let tag = self.tag();
        let mut out = Vec::with_capacity(tag.frame_size());
        out.push(tag as u8);
        out.push(PROTOCOL_VERSION);

        match self {
            Self::KnownLocations(known) => {
                let mut mask = 0u16;
                for (i, slot) in known.slots().iter().enumerate() {
                    if slot.is_some() {
                        mask |= 1 << i;
                    }
                }
                out.extend_from_slice(&mask.to_le_bytes());
                for slot in known.slots() {
                    let (x, z) = slot.map(|l| (l.x, l.z)).unwrap_or((0, 0));
                    out.extend_from_slice(&x.to_le_bytes());
                    out.extend_from_slice(&z.to_le_bytes());
                }
            }
            Self::Seethe(state) => {
                out.push(state.is_active as u8);
                out.extend_from_slice(&state.cycle_steps_remaining.to_le_bytes());
                out.extend_from_slice(&state.cycles_until_long_inactive.to_le_bytes());
            }
        }
        out
    }

    /// Decode a frame. Cells of received locations are rebuilt from
    /// `grid_spacing`, which the client shares with the server.
    pub fn decode(bytes: &[u8], grid_spacing: u32) -> Result<Self, DecodeError> {
        if bytes.len() < HEADER_SIZE {
            return Err(DecodeError::TooShort(bytes.len(), HEADER_SIZE));
        }
        let tag = FrameTag::from_u8(bytes[0]).ok_or(DecodeError::UnknownTag(bytes[0]))?;
        if bytes[1] != PROTOCOL_VERSION {
            return Err(DecodeError::UnsupportedVersion(bytes[1]));
        }
        if bytes.len() != tag.frame_size() {
            return Err(DecodeError::LengthMismatch {
                tag: tag as u8,
                expected: tag.frame_size(),
                actual: bytes.len(),
            });
        }

        let payload = &bytes[HEADER_SIZE..];
        match tag {
            FrameTag::KnownLocations => {
                let mask = u16::from_le_bytes([payload[0], payload[1]]);
                if mask >> KNOWN_LOCATION_COUNT != 0 {
                    return Err(DecodeError::InvalidMask(mask));
                }
                let mut slots = [None; KNOWN_LOCATION_COUNT];
                for (i, slot) in slots.iter_mut().enumerate() {
                    if mask & (1 << i) == 0 {
                        continue;
                    }
                    let base = 2 + i * 8;
                    let x = read_i32(&payload[base..base + 4]);
                    let z = read_i32(&payload[base + 4..base + 8]);
                    *slot = Some(LunagreeLocation::at(x, z, grid_spacing));
                }
                Ok(Self::KnownLocations(KnownLocationSet::from_slots(slots)))
            }
            FrameTag::Seethe => Ok(Self::Seethe(SeetheState {
                is_active: payload[0] != 0,
                cycle_steps_remaining: read_u32(&payload[1..5]),
                cycles_until_long_inactive: read_u32(&payload[5..9]),
            })),
        }
    }
}

fn read_i32(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

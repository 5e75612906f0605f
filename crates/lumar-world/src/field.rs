use lumar_core::config::LumarConfig;
use lumar_core::types::{CellKey, LunagreeLocation};

use crate::rng::{cell_hash, HashStream};

/// A deterministic source of at most one lunagree per cell.
pub trait PointSource {
    /// Side length of one cell in blocks.
    fn grid_spacing(&self) -> u32;

    /// The lunagree in a cell, if the cell has one.
    fn generate(&self, cell_x: i32, cell_z: i32) -> Option<LunagreeLocation>;
}

/// Procedural lunagree placement over the infinite plane.
///
/// `generate` is a pure function of `(seed, cell)`: every server, client and
/// restarted process derives the same points without sharing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunagreeField {
    seed: u64,
    grid_spacing: u32,
    /// Presence threshold for a 24-bit roll.
    spawn_threshold: u32,
}

impl LunagreeField {
    pub fn new(seed: u64, config: &LumarConfig) -> Self {
        Self {
            seed,
            grid_spacing: config.grid_spacing.max(1),
            spawn_threshold: config.spawn_threshold(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl PointSource for LunagreeField {
    fn grid_spacing(&self) -> u32 {
        self.grid_spacing
    }

    fn generate(&self, cell_x: i32, cell_z: i32) -> Option<LunagreeLocation> {
        let mut stream = HashStream::new(cell_hash(self.seed, CellKey::pack(cell_x, cell_z)));

        // Draw order is part of the world format: presence, then x, then z.
        if stream.next_roll() >= self.spawn_threshold {
            return None;
        }
        let offset_x = stream.next_below(self.grid_spacing);
        let offset_z = stream.next_below(self.grid_spacing);

        let s = self.grid_spacing as i64;
        // Cells at the edge of the i32 plane have no representable position.
        let x = i32::try_from(cell_x as i64 * s + offset_x as i64).ok()?;
        let z = i32::try_from(cell_z as i64 * s + offset_z as i64).ok()?;

        Some(LunagreeLocation {
            x,
            z,
            cell_x,
            cell_z,
        })
    }
}

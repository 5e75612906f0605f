use lumar_core::types::{KnownLocationSet, ObserverId};

use crate::seethe::SeetheRecord;

/// Everything a world persists between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldSnapshot {
    pub world_seed: u64,
    pub step_count: u64,
    /// Grid spacing the known sets were computed with.
    pub grid_spacing: u32,
    pub seethe: SeetheRecord,
    /// Known sets of every observer, connected or not, ordered by id.
    pub observers: Vec<(ObserverId, KnownLocationSet)>,
}

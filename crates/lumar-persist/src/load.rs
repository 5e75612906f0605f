use std::collections::HashSet;

use lumar_core::config::LumarConfig;
use lumar_core::types::{KnownLocationSet, SeetheState};
use lumar_world::{SeetheRecord, WorldSnapshot};

use crate::compat;
use crate::error::PersistError;
use crate::format::*;

/// Parsed save file data ready for world reconstruction.
pub struct SaveData {
    pub header: SaveHeader,
    /// Snapshot with counters already clamped to the current config.
    pub snapshot: WorldSnapshot,
    /// Compatibility warnings (e.g., grid spacing mismatch, clamped counters).
    pub warnings: Vec<String>,
}

/// Load and parse a save file from raw bytes.
pub fn load(bytes: &[u8], config: &LumarConfig) -> Result<SaveData, PersistError> {
    if bytes.len() < HEADER_SIZE {
        return Err(PersistError::FileTooSmall(bytes.len(), HEADER_SIZE));
    }

    let header: SaveHeader = bytemuck::pod_read_unaligned(&bytes[..HEADER_SIZE]);
    let mut warnings = compat::validate_header(&header, config)?;
    let keep_known = header.grid_spacing == config.grid_spacing;

    let observer_count = header.observer_count as usize;
    let table_end = HEADER_SIZE.saturating_add(observer_count.saturating_mul(OBSERVER_ENTRY_SIZE));
    if bytes.len() < table_end {
        return Err(PersistError::TruncatedFile {
            expected: table_end,
            actual: bytes.len(),
        });
    }

    let mut seen = HashSet::with_capacity(observer_count);
    let mut observers = Vec::with_capacity(observer_count);
    for entry in bytes[HEADER_SIZE..table_end].chunks_exact(OBSERVER_ENTRY_SIZE) {
        let (id, known) = read_observer(entry, header.grid_spacing);
        if !seen.insert(id) {
            return Err(PersistError::DuplicateObserver(id.0));
        }
        let known = if keep_known { known } else { KnownLocationSet::empty() };
        observers.push((id, known));
    }
    observers.sort_by_key(|(id, _)| *id);

    let stored = SeetheRecord {
        state: SeetheState {
            is_active: header.seethe_active != 0,
            cycle_steps_remaining: header.seethe_steps_remaining,
            cycles_until_long_inactive: header.seethe_cycles_until_long_inactive,
        },
        draws: header.seethe_draws,
    };
    let (seethe, seethe_warnings) = stored.clamped(&config.seethe);
    warnings.extend(seethe_warnings);

    for warning in &warnings {
        log::warn!("{warning}");
    }

    Ok(SaveData {
        header,
        snapshot: WorldSnapshot {
            world_seed: header.world_seed,
            step_count: header.step_count,
            grid_spacing: config.grid_spacing,
            seethe,
            observers,
        },
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save;
    use lumar_core::types::{LunagreeLocation, ObserverId};
    use lumar_world::World;

    fn snapshot() -> WorldSnapshot {
        WorldSnapshot {
            world_seed: 42,
            step_count: 7,
            grid_spacing: 128,
            seethe: SeetheRecord {
                state: SeetheState {
                    is_active: false,
                    cycle_steps_remaining: 15_000,
                    cycles_until_long_inactive: 2,
                },
                draws: 3,
            },
            observers: vec![
                (
                    ObserverId(1),
                    KnownLocationSet::from_sorted([
                        LunagreeLocation::at(5, 5, 128),
                        LunagreeLocation::at(-130, 260, 128),
                    ]),
                ),
                (ObserverId(2), KnownLocationSet::empty()),
            ],
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let saved = save::save(&snapshot());
        let loaded = load(&saved, &LumarConfig::default()).expect("load should succeed");
        assert_eq!(loaded.snapshot, snapshot());
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.header.step_count, 7);
    }

    #[test]
    fn test_save_load_empty_world() {
        let mut snap = snapshot();
        snap.observers.clear();
        let saved = save::save(&snap);
        let loaded = load(&saved, &LumarConfig::default()).expect("load should succeed");
        assert!(loaded.snapshot.observers.is_empty());
    }

    #[test]
    fn test_save_is_idempotent_through_world() {
        let mut world = World::new(99, LumarConfig::default());
        world.connect_observer(ObserverId(5), 300, 900);
        world.connect_observer(ObserverId(6), -4000, 12);
        world.move_observer(ObserverId(5), 2000, 2000);
        for _ in 0..400 {
            world.step();
        }

        let first = save::save(&world.snapshot());
        let loaded = load(&first, &LumarConfig::default()).expect("load should succeed");
        let restored = World::restore(LumarConfig::default(), loaded.snapshot);
        let second = save::save(&restored.snapshot());
        assert_eq!(first, second);
    }

    #[test]
    fn test_forgotten_observer_not_saved() {
        let mut world = World::new(3, LumarConfig::default());
        world.connect_observer(ObserverId(1), 0, 0);
        world.connect_observer(ObserverId(2), 900, -900);
        world.disconnect_observer(ObserverId(2));
        let before = save(&world.snapshot());
        assert_eq!(before.len(), HEADER_SIZE + 2 * OBSERVER_ENTRY_SIZE);

        assert!(world.forget_observer(ObserverId(2)));
        let after = save(&world.snapshot());
        assert_eq!(after.len(), HEADER_SIZE + OBSERVER_ENTRY_SIZE);

        let data = load(&after, &LumarConfig::default()).expect("loads");
        assert_eq!(data.header.observer_count, 1);
        let ids: Vec<_> = data.snapshot.observers.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![ObserverId(1)]);
    }

    #[test]
    fn test_invalid_magic_rejected() {
        let mut data = vec![0u8; HEADER_SIZE];
        data[0..4].copy_from_slice(b"NOPE");
        let result = load(&data, &LumarConfig::default());
        assert!(matches!(result, Err(PersistError::InvalidMagic)));
    }

    #[test]
    fn test_truncated_file_rejected() {
        let mut saved = save::save(&snapshot());
        saved.truncate(saved.len() - 1);
        let result = load(&saved, &LumarConfig::default());
        assert!(matches!(result, Err(PersistError::TruncatedFile { .. })));
    }

    #[test]
    fn test_file_too_small_rejected() {
        let result = load(&[0u8; 10], &LumarConfig::default());
        assert!(matches!(result, Err(PersistError::FileTooSmall(10, 56))));
    }

    #[test]
    fn test_duplicate_observer_rejected() {
        let mut snap = snapshot();
        snap.observers[1].0 = ObserverId(1);
        let saved = save::save(&snap);
        let result = load(&saved, &LumarConfig::default());
        assert!(matches!(result, Err(PersistError::DuplicateObserver(1))));
    }

    #[test]
    fn test_grid_spacing_change_drops_known_sets() {
        let saved = save::save(&snapshot());
        let config = LumarConfig {
            grid_spacing: 256,
            ..LumarConfig::default()
        };
        let loaded = load(&saved, &config).expect("should load with warning");
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.snapshot.grid_spacing, 256);
        assert_eq!(loaded.snapshot.observers.len(), 2);
        assert!(loaded.snapshot.observers.iter().all(|(_, k)| k.is_empty()));
    }

    #[test]
    fn test_malformed_counters_clamped() {
        let mut saved = save::save(&snapshot());
        // seethe_steps_remaining lives at byte 32, cycles at 36.
        saved[32..36].copy_from_slice(&0u32.to_le_bytes());
        saved[36..40].copy_from_slice(&99u32.to_le_bytes());
        let loaded = load(&saved, &LumarConfig::default()).expect("should load");
        assert_eq!(loaded.snapshot.seethe.state.cycle_steps_remaining, 1);
        assert_eq!(loaded.snapshot.seethe.state.cycles_until_long_inactive, 6);
        assert_eq!(loaded.warnings.len(), 2);
    }
}

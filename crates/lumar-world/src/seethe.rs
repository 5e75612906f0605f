use lumar_core::config::{SeetheConfig, StepRange};
use lumar_core::math::clamp_steps;
use lumar_core::types::SeetheState;

use crate::rng::{duration_hash, HashStream};

/// Result of a phase flip during `Seethe::step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    /// State after the flip.
    pub is_active: bool,
    /// Whether the new duration came from the long-inactive range.
    pub long_inactive: bool,
    /// Newly drawn duration.
    pub steps: u32,
}

/// Everything needed to resume a seethe cycle exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeetheRecord {
    pub state: SeetheState,
    /// Durations drawn so far. The n-th draw is a pure function of
    /// `(seed, n)`, so this is the whole random stream position.
    pub draws: u64,
}

impl SeetheRecord {
    /// Clamp the counters into the ranges `config` allows, describing each
    /// adjustment. The draw count is never touched.
    pub fn clamped(self, config: &SeetheConfig) -> (Self, Vec<String>) {
        let mut record = self;
        let mut warnings = Vec::new();

        let steps = clamp_steps(
            record.state.cycle_steps_remaining as i64,
            1,
            config.max_remaining_steps(),
        );
        if steps != record.state.cycle_steps_remaining {
            warnings.push(format!(
                "Seethe steps remaining {} out of range, clamped to {}",
                record.state.cycle_steps_remaining, steps
            ));
            record.state.cycle_steps_remaining = steps;
        }

        let period = config.long_inactive_period.max(1);
        let cycles = record.state.cycles_until_long_inactive.clamp(1, period);
        if cycles != record.state.cycles_until_long_inactive {
            warnings.push(format!(
                "Seethe cycles until long inactive {} out of range, clamped to {}",
                record.state.cycles_until_long_inactive, cycles
            ));
            record.state.cycles_until_long_inactive = cycles;
        }

        (record, warnings)
    }
}

/// Per-world active/inactive hazard cycle.
///
/// Time-driven only: `step` runs once per simulation step; administrative
/// overrides go through `force_active` / `force_inactive`.
#[derive(Debug, Clone)]
pub struct Seethe {
    state: SeetheState,
    draws: u64,
    seed: u64,
    config: SeetheConfig,
    /// Set by overrides so the next world step broadcasts the new state.
    changed: bool,
}

impl Seethe {
    /// Fresh cycle for a new world: inactive, counter at its full period.
    pub fn new(seed: u64, config: SeetheConfig) -> Self {
        let mut seethe = Self {
            state: SeetheState {
                is_active: false,
                cycle_steps_remaining: 1,
                cycles_until_long_inactive: config.long_inactive_period.max(1),
            },
            draws: 0,
            seed,
            config,
            changed: false,
        };
        seethe.state.cycle_steps_remaining = seethe.draw(config.inactive_steps);
        seethe
    }

    /// Resume from persisted data. Out-of-range counters are clamped, never rejected.
    pub fn restore(seed: u64, record: SeetheRecord, config: SeetheConfig) -> Self {
        let (record, warnings) = record.clamped(&config);
        for warning in &warnings {
            log::warn!("{warning}");
        }
        Self {
            state: record.state,
            draws: record.draws,
            seed,
            config,
            changed: false,
        }
    }

    /// Advance one simulation step. Returns the flip, if one happened.
    pub fn step(&mut self) -> Option<PhaseChange> {
        self.state.cycle_steps_remaining = self.state.cycle_steps_remaining.saturating_sub(1);
        if self.state.cycle_steps_remaining > 0 {
            return None;
        }

        self.state.is_active = !self.state.is_active;
        self.state.cycles_until_long_inactive =
            self.state.cycles_until_long_inactive.saturating_sub(1);

        let long_inactive = self.state.cycles_until_long_inactive == 0;
        let range = if long_inactive {
            self.state.cycles_until_long_inactive = self.config.long_inactive_period.max(1);
            self.config.long_inactive_steps
        } else if self.state.is_active {
            self.config.active_steps
        } else {
            self.config.inactive_steps
        };
        let steps = self.draw(range);
        self.state.cycle_steps_remaining = steps;

        log::debug!(
            "Seethe is now {} for {} steps (long inactive: {})",
            if self.state.is_active { "active" } else { "inactive" },
            steps,
            long_inactive
        );

        Some(PhaseChange {
            is_active: self.state.is_active,
            long_inactive,
            steps,
        })
    }

    /// Start the seethe now. `Some(steps)` replaces the remaining duration,
    /// clamped to `[1, max_override_steps]`.
    pub fn force_active(&mut self, duration_steps: Option<i64>) {
        self.force(true, duration_steps);
    }

    /// Stop the seethe now. Duration handling as in `force_active`.
    pub fn force_inactive(&mut self, duration_steps: Option<i64>) {
        self.force(false, duration_steps);
    }

    fn force(&mut self, active: bool, duration_steps: Option<i64>) {
        self.state.is_active = active;
        if let Some(steps) = duration_steps {
            self.state.cycle_steps_remaining =
                clamp_steps(steps, 1, self.config.max_override_steps);
        }
        self.changed = true;
        log::info!(
            "Seethe forced {} for {} steps",
            if active { "active" } else { "inactive" },
            self.state.cycle_steps_remaining
        );
    }

    /// Clears and returns the pending-override flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active
    }

    pub fn steps_remaining(&self) -> u32 {
        self.state.cycle_steps_remaining
    }

    pub fn cycles_until_long_inactive(&self) -> u32 {
        self.state.cycles_until_long_inactive
    }

    pub fn state(&self) -> SeetheState {
        self.state
    }

    pub fn record(&self) -> SeetheRecord {
        SeetheRecord {
            state: self.state,
            draws: self.draws,
        }
    }

    pub fn config(&self) -> &SeetheConfig {
        &self.config
    }

    fn draw(&mut self, range: StepRange) -> u32 {
        let mut stream = HashStream::new(duration_hash(self.seed, self.draws));
        self.draws += 1;
        stream.next_in_range(range.min.max(1), range.max.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumar_core::config::StepRange;

    fn short_config() -> SeetheConfig {
        SeetheConfig {
            active_steps: StepRange::new(3, 5),
            inactive_steps: StepRange::new(2, 4),
            long_inactive_steps: StepRange::new(20, 30),
            long_inactive_period: 3,
            max_override_steps: 1000,
        }
    }

    fn record(is_active: bool, steps: u32, cycles: u32) -> SeetheRecord {
        SeetheRecord {
            state: SeetheState {
                is_active,
                cycle_steps_remaining: steps,
                cycles_until_long_inactive: cycles,
            },
            draws: 0,
        }
    }

    #[test]
    fn test_new_world_starts_inactive() {
        let config = SeetheConfig::default();
        let seethe = Seethe::new(42, config);
        assert!(!seethe.is_active());
        assert_eq!(seethe.cycles_until_long_inactive(), config.long_inactive_period);
        let range = config.inactive_steps;
        assert!((range.min..=range.max).contains(&seethe.steps_remaining()));
    }

    #[test]
    fn test_flip_after_remaining_steps() {
        let mut seethe = Seethe::restore(1, record(false, 5, 3), short_config());
        for _ in 0..4 {
            assert!(seethe.step().is_none());
            assert!(!seethe.is_active());
        }
        let change = seethe.step().expect("flip on fifth step");
        assert!(change.is_active);
        assert!(!change.long_inactive);
        assert!(seethe.is_active());
        assert_eq!(seethe.cycles_until_long_inactive(), 2);
        assert!((3..=5).contains(&seethe.steps_remaining()));
    }

    #[test]
    fn test_long_inactive_scenario() {
        let config = SeetheConfig::default();
        let mut seethe = Seethe::restore(42, record(false, 5, 1), config);
        for _ in 0..4 {
            assert!(seethe.step().is_none());
        }
        let change = seethe.step().expect("flip on fifth step");
        assert!(seethe.is_active());
        assert!(change.long_inactive);
        let long = config.long_inactive_steps;
        assert!((long.min..=long.max).contains(&seethe.steps_remaining()));
        assert_eq!(seethe.cycles_until_long_inactive(), config.long_inactive_period);
    }

    #[test]
    fn test_cycle_conservation_over_many_steps() {
        let config = short_config();
        let mut seethe = Seethe::new(7, config);
        let mut flips = 0u32;
        let mut long_phases = 0u32;
        let mut prev_active = seethe.is_active();
        let mut prev_cycles = seethe.cycles_until_long_inactive();

        for _ in 0..100_000 {
            let before = seethe.steps_remaining();
            let change = seethe.step();
            assert!(seethe.steps_remaining() >= 1);
            match change {
                Some(c) => {
                    assert_eq!(before, 1, "flip only when the counter runs out");
                    assert_ne!(seethe.is_active(), prev_active);
                    flips += 1;
                    if c.long_inactive {
                        long_phases += 1;
                        assert_eq!(prev_cycles, 1);
                        assert_eq!(seethe.cycles_until_long_inactive(), 3);
                    } else {
                        assert_eq!(seethe.cycles_until_long_inactive(), prev_cycles - 1);
                    }
                }
                None => {
                    assert_eq!(seethe.steps_remaining(), before - 1);
                    assert_eq!(seethe.is_active(), prev_active);
                    assert_eq!(seethe.cycles_until_long_inactive(), prev_cycles);
                }
            }
            prev_active = seethe.is_active();
            prev_cycles = seethe.cycles_until_long_inactive();
        }

        assert!(flips > 100);
        assert_eq!(long_phases, flips / 3);
    }

    #[test]
    fn test_same_seed_same_timeline() {
        let mut a = Seethe::new(99, short_config());
        let mut b = Seethe::new(99, short_config());
        for _ in 0..5_000 {
            assert_eq!(a.step(), b.step());
        }
        assert_eq!(a.record(), b.record());
    }

    #[test]
    fn test_restore_resumes_exactly() {
        let mut original = Seethe::new(5, short_config());
        for _ in 0..777 {
            original.step();
        }
        let mut resumed = Seethe::restore(5, original.record(), short_config());
        assert_eq!(resumed.record(), original.record());
        for _ in 0..5_000 {
            assert_eq!(resumed.step(), original.step());
        }
    }

    #[test]
    fn test_restore_clamps_malformed_counters() {
        let config = short_config();
        let seethe = Seethe::restore(1, record(true, 0, 0), config);
        assert_eq!(seethe.steps_remaining(), 1);
        assert_eq!(seethe.cycles_until_long_inactive(), 1);

        let seethe = Seethe::restore(1, record(false, u32::MAX, 500), config);
        assert_eq!(seethe.steps_remaining(), config.max_remaining_steps());
        assert_eq!(seethe.cycles_until_long_inactive(), 3);
    }

    #[test]
    fn test_clamped_record_reports_each_adjustment() {
        let config = short_config();
        let (same, warnings) = record(true, 5, 2).clamped(&config);
        assert_eq!(same, record(true, 5, 2));
        assert!(warnings.is_empty());

        let (clamped, warnings) = record(true, 0, 0).clamped(&config);
        assert_eq!(clamped.state.cycle_steps_remaining, 1);
        assert_eq!(clamped.state.cycles_until_long_inactive, 1);
        assert_eq!(clamped.draws, record(true, 0, 0).draws);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("steps remaining 0"));
        assert!(warnings[1].contains("cycles until long inactive 0"));
    }

    #[test]
    fn test_force_overrides_and_clamps() {
        let mut seethe = Seethe::restore(1, record(false, 50, 2), short_config());

        seethe.force_active(None);
        assert!(seethe.is_active());
        assert_eq!(seethe.steps_remaining(), 50);
        assert!(seethe.take_changed());
        assert!(!seethe.take_changed());

        seethe.force_inactive(Some(-30));
        assert!(!seethe.is_active());
        assert_eq!(seethe.steps_remaining(), 1);

        seethe.force_active(Some(i64::MAX));
        assert_eq!(seethe.steps_remaining(), 1000);
        assert_eq!(seethe.cycles_until_long_inactive(), 2, "overrides keep the counter");
    }

    #[test]
    fn test_forced_duration_expires_normally() {
        let mut seethe = Seethe::restore(1, record(false, 50, 2), short_config());
        seethe.force_active(Some(2));
        assert!(seethe.step().is_none());
        let change = seethe.step().expect("override expired");
        assert!(!change.is_active);
    }
}

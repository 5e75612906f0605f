use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// Inclusive range of simulation steps a seethe phase may last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRange {
    pub min: u32,
    pub max: u32,
}

impl StepRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    fn is_valid(&self) -> bool {
        self.min >= 1 && self.min <= self.max
    }
}

/// Timing of the seethe cycle, in simulation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeetheConfig {
    pub active_steps: StepRange,
    pub inactive_steps: StepRange,
    /// Drawn whenever the long-inactive counter runs out.
    pub long_inactive_steps: StepRange,
    /// Phase flips between two long inactive phases.
    pub long_inactive_period: u32,
    /// Clamp for administrative overrides.
    pub max_override_steps: u32,
}

impl Default for SeetheConfig {
    fn default() -> Self {
        Self {
            active_steps: StepRange::new(6_000, 12_000),
            inactive_steps: StepRange::new(12_000, 24_000),
            long_inactive_steps: StepRange::new(36_000, 72_000),
            long_inactive_period: DEFAULT_LONG_INACTIVE_PERIOD,
            max_override_steps: DEFAULT_MAX_OVERRIDE_STEPS,
        }
    }
}

impl SeetheConfig {
    /// Largest remaining duration a valid state can hold.
    pub fn max_remaining_steps(&self) -> u32 {
        self.max_override_steps
            .max(self.active_steps.max)
            .max(self.inactive_steps.max)
            .max(self.long_inactive_steps.max)
    }
}

/// Tunables for one world's Lumar environment. Loaded from RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumarConfig {
    /// Side length of a point-field cell in blocks.
    pub grid_spacing: u32,
    /// Probability that a cell holds a lunagree.
    pub spawn_chance: f32,
    /// Hard cap on the nearest-set ring scan, in cells.
    pub max_scan_rings: u32,
    /// Radius around a lunagree inside which an observer is in its hazard.
    pub hazard_radius: i32,
    /// Horizontal radius of rainline influence.
    pub rainline_radius: f64,
    #[serde(default)]
    pub seethe: SeetheConfig,
}

impl Default for LumarConfig {
    fn default() -> Self {
        Self {
            grid_spacing: DEFAULT_GRID_SPACING,
            spawn_chance: DEFAULT_SPAWN_CHANCE,
            max_scan_rings: DEFAULT_MAX_SCAN_RINGS,
            hazard_radius: DEFAULT_HAZARD_RADIUS,
            rainline_radius: DEFAULT_RAINLINE_RADIUS,
            seethe: SeetheConfig::default(),
        }
    }
}

impl LumarConfig {
    /// Parse a config from a RON string. Does not validate.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, ConfigError> {
        let options = ron::Options::default();
        options
            .from_str(ron_str)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse and validate. Validation failures are joined into one error list.
    pub fn load(ron_str: &str) -> Result<Self, Vec<ConfigError>> {
        let config = Self::from_ron_str(ron_str).map_err(|e| vec![e])?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Check every field, collecting all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if !(MIN_GRID_SPACING..=MAX_GRID_SPACING).contains(&self.grid_spacing) {
            errors.push(ConfigError::GridSpacingOutOfRange {
                value: self.grid_spacing,
                min: MIN_GRID_SPACING,
                max: MAX_GRID_SPACING,
            });
        }
        if !(self.spawn_chance > 0.0 && self.spawn_chance <= 1.0) {
            errors.push(ConfigError::SpawnChanceOutOfRange(self.spawn_chance));
        }
        if self.max_scan_rings == 0 || self.max_scan_rings > MAX_SCAN_RINGS_LIMIT {
            errors.push(ConfigError::ScanRingsOutOfRange {
                value: self.max_scan_rings,
                max: MAX_SCAN_RINGS_LIMIT,
            });
        }
        if self.hazard_radius <= 0 {
            errors.push(ConfigError::NonPositive {
                name: "hazard_radius",
                value: self.hazard_radius as f64,
            });
        }
        if !(self.rainline_radius > 0.0) {
            errors.push(ConfigError::NonPositive {
                name: "rainline_radius",
                value: self.rainline_radius,
            });
        }

        let seethe = &self.seethe;
        for (name, range) in [
            ("active_steps", seethe.active_steps),
            ("inactive_steps", seethe.inactive_steps),
            ("long_inactive_steps", seethe.long_inactive_steps),
        ] {
            if !range.is_valid() {
                errors.push(ConfigError::InvalidStepRange {
                    name,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        if seethe.long_inactive_period == 0 {
            errors.push(ConfigError::NonPositive {
                name: "long_inactive_period",
                value: 0.0,
            });
        }
        if seethe.max_override_steps == 0 {
            errors.push(ConfigError::NonPositive {
                name: "max_override_steps",
                value: 0.0,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Presence threshold for a 24-bit roll, derived from `spawn_chance`.
    pub fn spawn_threshold(&self) -> u32 {
        let scale = (1u32 << SPAWN_ROLL_BITS) as f64;
        (self.spawn_chance.clamp(0.0, 1.0) as f64 * scale).round() as u32
    }
}

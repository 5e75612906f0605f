use thiserror::Error;

/// Errors raised while loading or validating a `LumarConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config RON: {0}")]
    ParseError(String),

    #[error("grid_spacing {value} outside [{min}, {max}]")]
    GridSpacingOutOfRange { value: u32, min: u32, max: u32 },

    #[error("spawn_chance {0} must be in (0, 1]")]
    SpawnChanceOutOfRange(f32),

    #[error("max_scan_rings {value} outside [1, {max}]")]
    ScanRingsOutOfRange { value: u32, max: u32 },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("step range '{name}' is invalid: min {min}, max {max}")]
    InvalidStepRange { name: &'static str, min: u32, max: u32 },
}

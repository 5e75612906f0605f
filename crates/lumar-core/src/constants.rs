//! Single source of truth for shared constants.
//! Values that tune gameplay live in `LumarConfig`; these are the fixed
//! parts of the data model and wire format.

/// Simulation steps per real-time second.
pub const STEPS_PER_SECOND: u32 = 20;

/// Number of nearest lunagrees each observer is kept informed of.
pub const KNOWN_LOCATION_COUNT: usize = 9;

/// Default side length of a point-field cell in blocks.
pub const DEFAULT_GRID_SPACING: u32 = 128;

/// Default probability that a cell contains a lunagree.
pub const DEFAULT_SPAWN_CHANCE: f32 = 0.2;

/// Default hard cap on ring-scan radius, in cells.
pub const DEFAULT_MAX_SCAN_RINGS: u32 = 32;

/// Default radius around a lunagree inside which its hazard applies.
pub const DEFAULT_HAZARD_RADIUS: i32 = 48;

/// Default horizontal radius of rainline influence in blocks.
pub const DEFAULT_RAINLINE_RADIUS: f64 = 96.0;

/// Seethe flips between long inactive phases.
pub const DEFAULT_LONG_INACTIVE_PERIOD: u32 = 6;

/// Upper bound for administrative seethe overrides (24 hours of steps).
pub const DEFAULT_MAX_OVERRIDE_STEPS: u32 = 24 * 60 * 60 * STEPS_PER_SECOND;

/// Resolution of the cell presence roll (24-bit uniform).
pub const SPAWN_ROLL_BITS: u32 = 24;

/// Smallest and largest accepted grid spacing.
pub const MIN_GRID_SPACING: u32 = 16;
pub const MAX_GRID_SPACING: u32 = 4096;

/// Largest accepted ring-scan cap.
pub const MAX_SCAN_RINGS_LIMIT: u32 = 256;

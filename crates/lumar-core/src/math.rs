use glam::{DVec3, IVec2};

use crate::constants::STEPS_PER_SECOND;

/// Cell coordinate containing a block position. Floors toward negative
/// infinity so cell 0 spans `[0, grid_spacing)` and cell -1 spans
/// `[-grid_spacing, 0)`.
pub fn cell_of(x: i32, z: i32, grid_spacing: u32) -> IVec2 {
    let s = grid_spacing.max(1) as i64;
    IVec2::new(
        (x as i64).div_euclid(s) as i32,
        (z as i64).div_euclid(s) as i32,
    )
}

/// Squared Euclidean distance between two block positions. Never overflows
/// for any pair of `i32` coordinates.
pub fn distance_sq(ax: i32, az: i32, bx: i32, bz: i32) -> i64 {
    let dx = ax as i64 - bx as i64;
    let dz = az as i64 - bz as i64;
    // |d| can reach 2^32 - 1, whose square exceeds i64::MAX.
    dx.saturating_mul(dx).saturating_add(dz.saturating_mul(dz))
}

/// Distance on the horizontal (x/z) plane, ignoring height.
pub fn horizontal_distance(a: DVec3, b: DVec3) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Clamp a signed step count into `[min, max]`.
pub fn clamp_steps(steps: i64, min: u32, max: u32) -> u32 {
    steps.clamp(min as i64, max.max(min) as i64) as u32
}

/// Convert seconds to simulation steps, saturating.
pub fn seconds_to_steps(seconds: i64) -> i64 {
    seconds.saturating_mul(STEPS_PER_SECOND as i64)
}

/// Human-readable real-time duration for a step count, e.g. `1h 02m 05s`.
pub fn format_steps(steps: u32) -> String {
    let total = steps / STEPS_PER_SECOND;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

use lumar_core::constants::KNOWN_LOCATION_COUNT;
use lumar_core::math::cell_of;
use lumar_core::types::{CellKey, KnownLocationSet, LunagreeLocation};

use crate::field::PointSource;

/// Per-observer cache of the nearest lunagrees.
///
/// Recomputes only when the observer crosses into a new cell. Between
/// recomputes the stored set is exact for the position that triggered the
/// last scan, which bounds staleness by the cell size.
#[derive(Debug, Clone)]
pub struct NearestTracker {
    last_cell: Option<CellKey>,
    known: KnownLocationSet,
    max_scan_rings: u32,
}

impl NearestTracker {
    pub fn new(max_scan_rings: u32) -> Self {
        Self::with_known(max_scan_rings, KnownLocationSet::empty())
    }

    /// Seed a tracker with a persisted set. The first `update` always rescans.
    pub fn with_known(max_scan_rings: u32, known: KnownLocationSet) -> Self {
        Self {
            last_cell: None,
            known,
            max_scan_rings,
        }
    }

    /// Rescan if the observer changed cell. Returns true if the stored set changed.
    pub fn update<F>(&mut self, field: &F, x: i32, z: i32) -> bool
    where
        F: PointSource + ?Sized,
    {
        let cell = CellKey::containing(x, z, field.grid_spacing());
        if self.last_cell == Some(cell) {
            return false;
        }
        self.last_cell = Some(cell);

        let fresh = scan_nearest(field, x, z, self.max_scan_rings);
        if fresh == self.known {
            return false;
        }
        log::debug!(
            "Nearest lunagrees recomputed at ({x}, {z}): {} found",
            fresh.len()
        );
        self.known = fresh;
        true
    }

    /// Force the next `update` to rescan regardless of cell.
    pub fn invalidate(&mut self) {
        self.last_cell = None;
    }

    pub fn known(&self) -> &KnownLocationSet {
        &self.known
    }

    /// Cell of the position that triggered the last scan.
    pub fn last_cell(&self) -> Option<CellKey> {
        self.last_cell
    }

    pub fn nearest(&self, x: i32, z: i32, max_distance: i32) -> Option<LunagreeLocation> {
        self.known.nearest(x, z, max_distance)
    }

    pub fn is_inside_hazard_radius(&self, x: i32, z: i32, radius: i32) -> bool {
        self.known.is_inside_radius(x, z, radius)
    }
}

/// Scan outward in square rings until the nine nearest points are certain or
/// the ring cap is reached.
///
/// After ring `r` every cell within Chebyshev distance `r` of the observer's
/// cell has been visited. Any unvisited point lies outside that square, so it
/// is at least as far away as the square's nearest edge. Once nine points are
/// held and the ninth is strictly closer than that edge, no unvisited point
/// can displace any of them.
pub fn scan_nearest<F>(field: &F, x: i32, z: i32, max_scan_rings: u32) -> KnownLocationSet
where
    F: PointSource + ?Sized,
{
    let spacing = field.grid_spacing().max(1) as i64;
    let center = cell_of(x, z, field.grid_spacing());
    let (cx, cz) = (center.x as i64, center.y as i64);
    let (px, pz) = (x as i64, z as i64);

    let mut found: Vec<(i64, LunagreeLocation)> = Vec::with_capacity(KNOWN_LOCATION_COUNT * 2);

    for r in 0..=max_scan_rings as i64 {
        for (dx, dz) in ring_offsets(r) {
            let (Ok(gx), Ok(gz)) = (i32::try_from(cx + dx), i32::try_from(cz + dz)) else {
                continue;
            };
            if let Some(location) = field.generate(gx, gz) {
                found.push((location.distance_sq_to(x, z), location));
            }
        }

        found.sort_by_key(|(d, l)| (*d, l.cell_x, l.cell_z));
        found.truncate(KNOWN_LOCATION_COUNT);

        if found.len() == KNOWN_LOCATION_COUNT {
            let edge = (px - (cx - r) * spacing)
                .min((cx + r + 1) * spacing - px)
                .min(pz - (cz - r) * spacing)
                .min((cz + r + 1) * spacing - pz);
            let (ninth, _) = found[KNOWN_LOCATION_COUNT - 1];
            if ninth < edge.saturating_mul(edge) {
                break;
            }
        }
    }

    KnownLocationSet::from_sorted(found.into_iter().map(|(_, l)| l))
}

/// Cell offsets at exactly Chebyshev distance `r` from the origin.
fn ring_offsets(r: i64) -> Vec<(i64, i64)> {
    if r == 0 {
        return vec![(0, 0)];
    }
    let mut cells = Vec::with_capacity((8 * r) as usize);
    for d in -r..=r {
        cells.push((d, -r));
        cells.push((d, r));
    }
    for d in (-r + 1)..r {
        cells.push((-r, d));
        cells.push((r, d));
    }
    cells
}

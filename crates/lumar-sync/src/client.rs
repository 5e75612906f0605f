use lumar_core::types::{
    within_radius, KnownLocationSet, LunagreeLocation, ObserverId, SeetheState,
};

use crate::error::DecodeError;
use crate::protocol::Frame;

/// Client copy of the observer's known lunagrees with a cached closest answer.
///
/// Pushed data replaces the set wholesale and marks it dirty. The closest
/// location is recomputed only when dirty or when the query position moves.
#[derive(Debug, Clone, Default)]
pub struct ClientLunagreeData {
    known: KnownLocationSet,
    dirty: bool,
    cached_at: Option<(i32, i32)>,
    cached: Option<(LunagreeLocation, i64)>,
    recomputations: u64,
}

impl ClientLunagreeData {
    pub fn replace(&mut self, known: KnownLocationSet) {
        self.known = known;
        self.dirty = true;
    }

    pub fn known(&self) -> &KnownLocationSet {
        &self.known
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many times the closest location was actually recomputed.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    fn closest(&mut self, x: i32, z: i32) -> Option<(LunagreeLocation, i64)> {
        if self.dirty || self.cached_at != Some((x, z)) {
            self.cached = self.known.closest_to(x, z);
            self.cached_at = Some((x, z));
            self.dirty = false;
            self.recomputations += 1;
        }
        self.cached
    }

    /// Closest known lunagree, or `None` beyond `max_distance`.
    /// A non-positive `max_distance` disables the cutoff.
    pub fn nearest(&mut self, x: i32, z: i32, max_distance: i32) -> Option<LunagreeLocation> {
        let (location, d) = self.closest(x, z)?;
        if max_distance > 0 {
            let max = max_distance as i64;
            if d > max * max {
                return None;
            }
        }
        Some(location)
    }

    pub fn nearest_distance(&mut self, x: i32, z: i32) -> Option<f64> {
        self.closest(x, z).map(|(_, d)| (d as f64).sqrt())
    }

    pub fn is_inside_radius(&mut self, x: i32, z: i32, radius: i32) -> bool {
        let closest = self.closest(x, z);
        within_radius(closest, radius)
    }
}

/// Client copy of the world's seethe state, counted down locally between pushes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientSeetheData {
    state: Option<SeetheState>,
}

impl ClientSeetheData {
    pub fn replace(&mut self, state: SeetheState) {
        self.state = Some(state);
    }

    /// One local step. Stops at zero; the server pushes the flip.
    pub fn tick(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.cycle_steps_remaining = state.cycle_steps_remaining.saturating_sub(1);
        }
    }

    /// `None` until the first push arrives.
    pub fn state(&self) -> Option<SeetheState> {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.map_or(false, |s| s.is_active)
    }

    pub fn steps_remaining(&self) -> u32 {
        self.state.map_or(0, |s| s.cycle_steps_remaining)
    }
}

/// Everything one client mirrors from the server.
#[derive(Debug, Clone)]
pub struct ClientMirror {
    observer: ObserverId,
    grid_spacing: u32,
    hazard_radius: i32,
    lunagree: ClientLunagreeData,
    seethe: ClientSeetheData,
    frames_applied: u64,
}

impl ClientMirror {
    pub fn new(observer: ObserverId, grid_spacing: u32, hazard_radius: i32) -> Self {
        Self {
            observer,
            grid_spacing,
            hazard_radius,
            lunagree: ClientLunagreeData::default(),
            seethe: ClientSeetheData::default(),
            frames_applied: 0,
        }
    }

    /// Decode and apply one pushed frame.
    pub fn apply(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        match Frame::decode(bytes, self.grid_spacing)? {
            Frame::KnownLocations(known) => self.lunagree.replace(known),
            Frame::Seethe(state) => self.seethe.replace(state),
        }
        self.frames_applied += 1;
        Ok(())
    }

    /// Advance local timers by one step.
    pub fn tick(&mut self) {
        self.seethe.tick();
    }

    pub fn nearest(&mut self, x: i32, z: i32, max_distance: i32) -> Option<LunagreeLocation> {
        self.lunagree.nearest(x, z, max_distance)
    }

    pub fn nearest_distance(&mut self, x: i32, z: i32) -> Option<f64> {
        self.lunagree.nearest_distance(x, z)
    }

    /// Whether `(x, z)` is within the hazard radius of the closest known lunagree.
    pub fn is_inside_hazard(&mut self, x: i32, z: i32) -> bool {
        self.lunagree.is_inside_radius(x, z, self.hazard_radius)
    }

    pub fn observer(&self) -> ObserverId {
        self.observer
    }

    pub fn lunagree(&self) -> &ClientLunagreeData {
        &self.lunagree
    }

    pub fn seethe(&self) -> &ClientSeetheData {
        &self.seethe
    }

    pub fn frames_applied(&self) -> u64 {
        self.frames_applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirror() -> ClientMirror {
        ClientMirror::new(ObserverId(1), 128, 48)
    }

    fn known_frame(points: &[(i32, i32)]) -> Vec<u8> {
        let set = KnownLocationSet::from_sorted(
            points.iter().map(|(x, z)| LunagreeLocation::at(*x, *z, 128)),
        );
        Frame::KnownLocations(set).encode()
    }

    #[test]
    fn test_apply_replaces_wholesale() {
        let mut m = mirror();
        m.apply(&known_frame(&[(10, 10), (500, 500)])).expect("valid");
        assert_eq!(m.lunagree().known().len(), 2);
        m.apply(&known_frame(&[(900, 900)])).expect("valid");
        assert_eq!(m.lunagree().known().len(), 1);
        assert_eq!(m.frames_applied(), 2);
    }

    #[test]
    fn test_queries_cached_until_dirty_or_moved() {
        let mut m = mirror();
        m.apply(&known_frame(&[(30, 40)])).expect("valid");
        assert_eq!(m.nearest_distance(0, 0), Some(50.0));
        assert!(!m.is_inside_hazard(0, 0));
        assert_eq!(m.nearest(0, 0, 0).map(|l| (l.x, l.z)), Some((30, 40)));
        assert_eq!(m.lunagree().recomputations(), 1);

        assert!(m.is_inside_hazard(10, 10));
        assert_eq!(m.lunagree().recomputations(), 2);

        m.apply(&known_frame(&[(10, 12)])).expect("valid");
        assert!(m.lunagree().is_dirty());
        assert_eq!(m.nearest_distance(10, 10), Some(2.0));
        assert_eq!(m.lunagree().recomputations(), 3);
    }

    #[test]
    fn test_nearest_cutoff() {
        let mut m = mirror();
        m.apply(&known_frame(&[(300, 400)])).expect("valid");
        assert!(m.nearest(0, 0, 499).is_none());
        assert!(m.nearest(0, 0, 500).is_some());
    }

    #[test]
    fn test_zero_hazard_radius_covers_the_point_itself() {
        let mut m = ClientMirror::new(ObserverId(1), 128, 0);
        m.apply(&known_frame(&[(10, 10)])).expect("valid");
        assert!(m.is_inside_hazard(10, 10));
        assert!(!m.is_inside_hazard(10, 11));

        let mut lunagree = ClientLunagreeData::default();
        lunagree.replace(*m.lunagree().known());
        assert!(lunagree.is_inside_radius(10, 10, 0));
        assert!(!lunagree.is_inside_radius(10, 10, -1));
    }

    #[test]
    fn test_empty_mirror_answers_none() {
        let mut m = mirror();
        assert!(m.nearest(0, 0, 0).is_none());
        assert!(m.nearest_distance(0, 0).is_none());
        assert!(!m.is_inside_hazard(0, 0));
        assert!(m.seethe().state().is_none());
    }

    #[test]
    fn test_seethe_counts_down_locally() {
        let mut m = mirror();
        let state = SeetheState {
            is_active: true,
            cycle_steps_remaining: 2,
            cycles_until_long_inactive: 4,
        };
        m.apply(&Frame::Seethe(state).encode()).expect("valid");
        assert!(m.seethe().is_active());
        m.tick();
        assert_eq!(m.seethe().steps_remaining(), 1);
        m.tick();
        m.tick();
        assert_eq!(m.seethe().steps_remaining(), 0);
    }

    #[test]
    fn test_bad_frame_leaves_state_alone() {
        let mut m = mirror();
        m.apply(&known_frame(&[(1, 1)])).expect("valid");
        assert!(m.apply(&[1, 1, 0]).is_err());
        assert_eq!(m.lunagree().known().len(), 1);
        assert_eq!(m.frames_applied(), 1);
    }
}

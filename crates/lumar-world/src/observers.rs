use std::collections::HashMap;

use glam::IVec2;
use lumar_core::types::{KnownLocationSet, ObserverId};

use crate::tracker::NearestTracker;

/// Live state for one connected observer.
#[derive(Debug, Clone)]
pub struct ObserverRecord {
    pub id: ObserverId,
    /// Last reported block position (x, z).
    pub position: IVec2,
    pub tracker: NearestTracker,
}

/// Typed table of observers owned by a world.
///
/// Connected observers have a live record. On disconnect the known set moves
/// to the dormant store so a returning observer has data before its first
/// rescan; both halves are persisted with the world.
#[derive(Debug)]
pub struct ObserverTable {
    live: HashMap<ObserverId, ObserverRecord>,
    dormant: HashMap<ObserverId, KnownLocationSet>,
    max_scan_rings: u32,
}

impl ObserverTable {
    pub fn new(max_scan_rings: u32) -> Self {
        Self {
            live: HashMap::new(),
            dormant: HashMap::new(),
            max_scan_rings,
        }
    }

    /// Connect an observer, creating its record on first access.
    /// Reconnecting an already-live observer just updates its position.
    pub fn connect(&mut self, id: ObserverId, position: IVec2) -> &mut ObserverRecord {
        let max_scan_rings = self.max_scan_rings;
        let dormant = &mut self.dormant;
        let record = self.live.entry(id).or_insert_with(|| {
            let known = dormant.remove(&id).unwrap_or_default();
            ObserverRecord {
                id,
                position,
                tracker: NearestTracker::with_known(max_scan_rings, known),
            }
        });
        record.position = position;
        record
    }

    /// Disconnect an observer, keeping its known set. Returns false if it was not connected.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        match self.live.remove(&id) {
            Some(record) => {
                self.dormant.insert(id, *record.tracker.known());
                true
            }
            None => false,
        }
    }

    /// Drop every trace of an observer, live or dormant. Returns false if
    /// there was nothing to drop.
    pub fn forget(&mut self, id: ObserverId) -> bool {
        let live = self.live.remove(&id).is_some();
        let dormant = self.dormant.remove(&id).is_some();
        live || dormant
    }

    /// Seed dormant data, e.g. from a save file.
    pub fn insert_dormant(&mut self, id: ObserverId, known: KnownLocationSet) {
        if !self.live.contains_key(&id) {
            self.dormant.insert(id, known);
        }
    }

    pub fn get(&self, id: ObserverId) -> Option<&ObserverRecord> {
        self.live.get(&id)
    }

    pub fn get_mut(&mut self, id: ObserverId) -> Option<&mut ObserverRecord> {
        self.live.get_mut(&id)
    }

    pub fn is_connected(&self, id: ObserverId) -> bool {
        self.live.contains_key(&id)
    }

    /// Connected observer ids in ascending order.
    pub fn connected_ids(&self) -> Vec<ObserverId> {
        let mut ids: Vec<ObserverId> = self.live.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn dormant_count(&self) -> usize {
        self.dormant.len()
    }

    /// Every observer's known set, live and dormant, ordered by id.
    pub fn saved_sets(&self) -> Vec<(ObserverId, KnownLocationSet)> {
        let mut sets: Vec<(ObserverId, KnownLocationSet)> = self
            .live
            .values()
            .map(|r| (r.id, *r.tracker.known()))
            .chain(self.dormant.iter().map(|(id, known)| (*id, *known)))
            .collect();
        sets.sort_by_key(|(id, _)| *id);
        sets
    }
}

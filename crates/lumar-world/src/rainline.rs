use std::collections::HashMap;

use glam::DVec3;
use lumar_core::math::horizontal_distance;
use lumar_core::types::EntityId;

/// A roaming hazard entity as seen by the registry: an identity and a position.
pub trait RainlineEntity {
    fn id(&self) -> EntityId;
    fn position(&self) -> DVec3;
}

/// A live rainline tracked by the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rainline {
    pub id: EntityId,
    pub position: DVec3,
}

impl RainlineEntity for Rainline {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> DVec3 {
        self.position
    }
}

/// Closest entity within `radius` (inclusive) of `position`, by horizontal
/// distance. Ties go to the lower id so the answer does not depend on
/// iteration order. Keeps no state between calls.
pub fn nearest_within<'a, E, I>(entities: I, position: DVec3, radius: f64) -> Option<&'a E>
where
    E: RainlineEntity + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let mut best: Option<(&'a E, f64)> = None;
    for entity in entities {
        let d = horizontal_distance(entity.position(), position);
        if !(d <= radius) {
            continue;
        }
        let closer = match best {
            None => true,
            Some((b, bd)) => d < bd || (d == bd && entity.id() < b.id()),
        };
        if closer {
            best = Some((entity, d));
        }
    }
    best.map(|(e, _)| e)
}

/// Presentation weight in `[0, 1]`: 1 on top of the entity, falling linearly
/// to 0 at `radius` and beyond. Horizontal distance only.
pub fn gradient<E>(observer: DVec3, nearest: Option<&E>, radius: f64) -> f32
where
    E: RainlineEntity + ?Sized,
{
    let Some(entity) = nearest else {
        return 0.0;
    };
    if !(radius > 0.0) {
        return 0.0;
    }
    let d = horizontal_distance(observer, entity.position());
    if !(d < radius) {
        return 0.0;
    }
    ((1.0 - d / radius) as f32).clamp(0.0, 1.0)
}

/// The world's live rainlines, keyed by entity id.
#[derive(Debug, Default)]
pub struct RainlineTable {
    entities: HashMap<EntityId, Rainline>,
}

impl RainlineTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a rainline.
    pub fn spawn(&mut self, id: EntityId, position: DVec3) {
        self.entities.insert(id, Rainline { id, position });
    }

    /// Move a rainline. Returns false if it does not exist.
    pub fn move_to(&mut self, id: EntityId, position: DVec3) -> bool {
        match self.entities.get_mut(&id) {
            Some(rainline) => {
                rainline.position = position;
                true
            }
            None => false,
        }
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Rainline> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Rainline> {
        self.entities.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rainline> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Live rainlines ordered by id.
    pub fn sorted(&self) -> Vec<&Rainline> {
        let mut all: Vec<&Rainline> = self.entities.values().collect();
        all.sort_by_key(|r| r.id);
        all
    }
}

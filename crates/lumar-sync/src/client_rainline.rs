use glam::DVec3;
use lumar_core::math::horizontal_distance;
use lumar_core::types::EntityId;
use lumar_world::rainline::{gradient, nearest_within, RainlineEntity};

/// Per-client rainline presentation state, refreshed once per client step
/// from the rainline entities the client can see.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClientRainlineData {
    nearest: Option<EntityId>,
    distance: Option<f64>,
    gradient: f32,
}

impl ClientRainlineData {
    pub fn update<'a, E, I>(&mut self, position: DVec3, entities: I, radius: f64)
    where
        E: RainlineEntity + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let nearest = nearest_within(entities, position, radius);
        self.nearest = nearest.map(|e| e.id());
        self.distance = nearest.map(|e| horizontal_distance(e.position(), position));
        self.gradient = gradient(position, nearest, radius);
    }

    pub fn nearest(&self) -> Option<EntityId> {
        self.nearest
    }

    /// Horizontal distance to the nearest rainline.
    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    pub fn gradient(&self) -> f32 {
        self.gradient
    }
}

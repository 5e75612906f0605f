pub mod commands;
pub mod events;
pub mod field;
pub mod observers;
pub mod rainline;
pub mod seethe;
pub mod snapshot;
pub mod tracker;

mod rng;

use glam::{DVec3, IVec2};
use lumar_core::config::LumarConfig;
use lumar_core::types::{EntityId, ObserverId};

pub use commands::CommandError;
pub use events::{Recipients, WorldEvent};
pub use field::{LunagreeField, PointSource};
pub use observers::{ObserverRecord, ObserverTable};
pub use rainline::{Rainline, RainlineEntity, RainlineTable};
pub use seethe::{PhaseChange, Seethe, SeetheRecord};
pub use snapshot::WorldSnapshot;
pub use tracker::NearestTracker;

/// One world's Lumar environment: point field, seethe cycle, observers and
/// rainlines. Owned by the world's simulation context; nothing is global.
pub struct World {
    config: LumarConfig,
    field: LunagreeField,
    seethe: Seethe,
    observers: ObserverTable,
    rainlines: RainlineTable,
    step_count: u64,
}

impl World {
    /// Create the environment for a new world.
    pub fn new(seed: u64, config: LumarConfig) -> Self {
        let field = LunagreeField::new(seed, &config);
        let seethe = Seethe::new(seed, config.seethe);
        let observers = ObserverTable::new(config.max_scan_rings);
        log::info!(
            "Lumar world created (seed {seed}, grid spacing {}, seethe {} for {} steps)",
            config.grid_spacing,
            if seethe.is_active() { "active" } else { "inactive" },
            seethe.steps_remaining()
        );
        Self {
            config,
            field,
            seethe,
            observers,
            rainlines: RainlineTable::new(),
            step_count: 0,
        }
    }

    /// Rebuild a world from persisted state. Known sets come back as dormant
    /// data and are rescanned when their observers reconnect.
    pub fn restore(config: LumarConfig, snapshot: WorldSnapshot) -> Self {
        let field = LunagreeField::new(snapshot.world_seed, &config);
        let seethe = Seethe::restore(snapshot.world_seed, snapshot.seethe, config.seethe);
        let mut observers = ObserverTable::new(config.max_scan_rings);
        for (id, known) in snapshot.observers {
            observers.insert_dormant(id, known);
        }
        log::info!(
            "Lumar world restored at step {} with {} observer record(s)",
            snapshot.step_count,
            observers.dormant_count()
        );
        Self {
            config,
            field,
            seethe,
            observers,
            rainlines: RainlineTable::new(),
            step_count: snapshot.step_count,
        }
    }

    /// Capture the persistent part of the world.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            world_seed: self.field.seed(),
            step_count: self.step_count,
            grid_spacing: self.config.grid_spacing,
            seethe: self.seethe.record(),
            observers: self.observers.saved_sets(),
        }
    }

    /// Advance one simulation step: seethe cycle, then every connected
    /// observer's tracker. Returns the changes to push, in that order.
    pub fn step(&mut self) -> Vec<WorldEvent> {
        let mut events = Vec::new();

        let flipped = self.seethe.step();
        let forced = self.seethe.take_changed();
        if flipped.is_some() || forced {
            events.push(WorldEvent::SeetheChanged {
                state: self.seethe.state(),
                recipients: Recipients::AllConnected,
            });
        }

        for id in self.observers.connected_ids() {
            let Some(record) = self.observers.get_mut(id) else {
                continue;
            };
            let position = record.position;
            if record.tracker.update(&self.field, position.x, position.y) {
                events.push(WorldEvent::KnownLocationsChanged {
                    observer: id,
                    locations: *record.tracker.known(),
                });
            }
        }

        self.step_count += 1;
        events
    }

    /// Connect an observer and produce the full state resend for it.
    pub fn connect_observer(&mut self, id: ObserverId, x: i32, z: i32) -> Vec<WorldEvent> {
        let record = self.observers.connect(id, IVec2::new(x, z));
        record.tracker.update(&self.field, x, z);
        let locations = *record.tracker.known();
        log::info!(
            "Observer {} connected at ({x}, {z}) with {} known lunagree(s)",
            id.0,
            locations.len()
        );
        vec![
            WorldEvent::KnownLocationsChanged {
                observer: id,
                locations,
            },
            WorldEvent::SeetheChanged {
                state: self.seethe.state(),
                recipients: Recipients::Only(id),
            },
        ]
    }

    /// Disconnect an observer. Its known set is kept for reconnects and saves.
    pub fn disconnect_observer(&mut self, id: ObserverId) -> bool {
        let removed = self.observers.disconnect(id);
        if removed {
            log::info!("Observer {} disconnected", id.0);
        }
        removed
    }

    /// Destroy an observer that no longer exists, connected or not. Its known
    /// set is gone from memory and from every later snapshot.
    pub fn forget_observer(&mut self, id: ObserverId) -> bool {
        let removed = self.observers.forget(id);
        if removed {
            log::info!("Observer {} forgotten", id.0);
        }
        removed
    }

    /// Record an observer's new position. The tracker picks it up on the next step.
    pub fn move_observer(&mut self, id: ObserverId, x: i32, z: i32) -> bool {
        match self.observers.get_mut(id) {
            Some(record) => {
                record.position = IVec2::new(x, z);
                true
            }
            None => false,
        }
    }

    pub fn connected_observers(&self) -> Vec<ObserverId> {
        self.observers.connected_ids()
    }

    pub fn spawn_rainline(&mut self, id: EntityId, position: DVec3) {
        self.rainlines.spawn(id, position);
    }

    pub fn move_rainline(&mut self, id: EntityId, position: DVec3) -> bool {
        self.rainlines.move_to(id, position)
    }

    pub fn despawn_rainline(&mut self, id: EntityId) -> bool {
        self.rainlines.despawn(id).is_some()
    }

    /// Closest rainline within the configured radius.
    pub fn nearest_rainline(&self, position: DVec3) -> Option<&Rainline> {
        rainline::nearest_within(self.rainlines.iter(), position, self.config.rainline_radius)
    }

    /// Rainline presentation weight at a position.
    pub fn rainline_gradient(&self, position: DVec3) -> f32 {
        rainline::gradient(
            position,
            self.nearest_rainline(position),
            self.config.rainline_radius,
        )
    }

    /// Run an operator command and return its reply.
    pub fn execute_command(&mut self, line: &str) -> Result<String, CommandError> {
        commands::execute(self, line)
    }

    pub fn config(&self) -> &LumarConfig {
        &self.config
    }

    pub fn field(&self) -> &LunagreeField {
        &self.field
    }

    pub fn seethe(&self) -> &Seethe {
        &self.seethe
    }

    pub fn seethe_mut(&mut self) -> &mut Seethe {
        &mut self.seethe
    }

    pub fn observers(&self) -> &ObserverTable {
        &self.observers
    }

    pub fn rainlines(&self) -> &RainlineTable {
        &self.rainlines
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn seed(&self) -> u64 {
        self.field.seed()
    }
}

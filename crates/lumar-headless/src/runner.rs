use std::collections::HashMap;

use crossbeam_channel::Receiver;
use glam::DVec3;
use lumar_core::types::ObserverId;
use lumar_sync::{ClientMirror, ClientRainlineData, Outbound, SyncChannel};
use lumar_world::{World, WorldEvent};

use crate::report::{CommandOutcome, ObserverSummary, RunReport, SeetheSummary};
use crate::scenario::{Drifter, Scenario, Walker};

/// Eye height used for rainline queries.
const OBSERVER_Y: f64 = 64.0;

/// Client-side state for one scripted observer.
struct Client {
    walker: Walker,
    mirror: ClientMirror,
    rainline: ClientRainlineData,
    connected: bool,
    exposed_steps: u64,
    max_rainline_gradient: f32,
}

/// Drives a world through a scenario with mirrored clients on the far side
/// of the sync channel.
pub struct Runner {
    world: World,
    channel: SyncChannel,
    receiver: Receiver<Outbound>,
    clients: Vec<Client>,
    drifters: Vec<Drifter>,
    start_step: u64,
    start_draws: u64,
    frames_sent: u64,
    frames_applied: u64,
    frames_dropped: u64,
    known_location_updates: u64,
    mirror_mismatches: u64,
    commands: Vec<CommandOutcome>,
}

impl Runner {
    pub fn new(world: World, scenario: &Scenario) -> Self {
        let (channel, receiver) = SyncChannel::new();
        let grid_spacing = world.config().grid_spacing;
        let hazard_radius = world.config().hazard_radius;
        let clients = scenario
            .walkers()
            .into_iter()
            .map(|walker| Client {
                mirror: ClientMirror::new(walker.id, grid_spacing, hazard_radius),
                walker,
                rainline: ClientRainlineData::default(),
                connected: false,
                exposed_steps: 0,
                max_rainline_gradient: 0.0,
            })
            .collect();
        let start_step = world.step_count();
        let start_draws = world.seethe().record().draws;
        Self {
            world,
            channel,
            receiver,
            clients,
            drifters: scenario.drifters(),
            start_step,
            start_draws,
            frames_sent: 0,
            frames_applied: 0,
            frames_dropped: 0,
            known_location_updates: 0,
            mirror_mismatches: 0,
            commands: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    /// Run the whole scenario.
    pub fn run(&mut self, scenario: &Scenario) {
        for drifter in &self.drifters {
            self.world.spawn_rainline(drifter.id, drifter.position);
        }
        for i in 0..self.clients.len() {
            self.connect(i);
        }

        for step in 0..scenario.steps {
            for command in scenario.commands.iter().filter(|c| c.step == step) {
                let outcome = match self.world.execute_command(&command.line) {
                    Ok(reply) => CommandOutcome {
                        step,
                        command: command.line.clone(),
                        ok: true,
                        reply,
                    },
                    Err(e) => {
                        log::warn!("Command '{}' failed: {e}", command.line);
                        CommandOutcome {
                            step,
                            command: command.line.clone(),
                            ok: false,
                            reply: e.to_string(),
                        }
                    }
                };
                self.commands.push(outcome);
            }
            self.churn(scenario, step);
            self.step_once(step);
        }

        log::info!(
            "Ran {} steps: {} frames sent, {} seethe flips, {} mirror mismatches",
            scenario.steps,
            self.frames_sent,
            self.flips(),
            self.mirror_mismatches
        );
    }

    fn connect(&mut self, index: usize) {
        let client = &mut self.clients[index];
        let p = client.walker.position;
        let events = self.world.connect_observer(client.walker.id, p.x, p.y);
        client.connected = true;
        self.publish(&events);
    }

    fn churn(&mut self, scenario: &Scenario, step: u64) {
        for i in 0..self.clients.len() {
            if !self.clients[i].walker.churns {
                continue;
            }
            let away = scenario.is_churned_out(step);
            if away && self.clients[i].connected {
                self.world.disconnect_observer(self.clients[i].walker.id);
                self.clients[i].connected = false;
            } else if !away && !self.clients[i].connected {
                self.connect(i);
            }
        }
    }

    fn step_once(&mut self, step: u64) {
        // Resends queued by connects since the last step.
        self.deliver();

        for client in self.clients.iter_mut().filter(|c| c.connected) {
            let p = client.walker.advance(step);
            self.world.move_observer(client.walker.id, p.x, p.y);
        }
        for drifter in &mut self.drifters {
            let p = drifter.advance();
            self.world.move_rainline(drifter.id, p);
        }

        let events = self.world.step();
        self.publish(&events);

        for client in self.clients.iter_mut().filter(|c| c.connected) {
            client.mirror.tick();
        }
        self.deliver();
        self.observe();
    }

    fn publish(&mut self, events: &[WorldEvent]) {
        for event in events {
            match event {
                WorldEvent::KnownLocationsChanged { .. } => self.known_location_updates += 1,
                WorldEvent::SeetheChanged { .. } => {}
            }
        }
        self.frames_sent += self.channel.publish(&self.world, events) as u64;
    }

    /// Drain the channel into the client mirrors.
    fn deliver(&mut self) {
        let index: HashMap<ObserverId, usize> = self
            .clients
            .iter()
            .enumerate()
            .map(|(i, c)| (c.walker.id, i))
            .collect();

        for out in self.receiver.try_iter() {
            let Some(&i) = index.get(&out.observer) else {
                self.frames_dropped += 1;
                continue;
            };
            match self.clients[i].mirror.apply(&out.frame) {
                Ok(()) => self.frames_applied += 1,
                Err(e) => {
                    log::warn!("Observer {} rejected a frame: {e}", out.observer.0);
                    self.frames_dropped += 1;
                }
            }
        }
    }

    /// Client-side queries, cross-checked against the server.
    fn observe(&mut self) {
        let seethe = self.world.seethe().state();
        let radius = self.world.config().rainline_radius;

        for client in self.clients.iter_mut().filter(|c| c.connected) {
            let p = client.walker.position;
            let id = client.walker.id;

            let server_known = self.world.observers().get(id).map(|r| *r.tracker.known());
            if server_known.as_ref() != Some(client.mirror.lunagree().known()) {
                self.mirror_mismatches += 1;
            }
            if client.mirror.seethe().state() != Some(seethe) {
                self.mirror_mismatches += 1;
            }

            if seethe.is_active && client.mirror.is_inside_hazard(p.x, p.y) {
                client.exposed_steps += 1;
            }

            let here = DVec3::new(p.x as f64, OBSERVER_Y, p.y as f64);
            client.rainline.update(here, self.world.rainlines().iter(), radius);
            if client.rainline.nearest() != self.world.nearest_rainline(here).map(|r| r.id) {
                self.mirror_mismatches += 1;
            }
            client.max_rainline_gradient =
                client.max_rainline_gradient.max(client.rainline.gradient());
        }
    }

    /// Every flip draws exactly one duration; overrides draw none.
    fn flips(&self) -> u64 {
        self.world.seethe().record().draws - self.start_draws
    }

    /// Summarize the run so far.
    pub fn report(&mut self, load_warnings: Vec<String>) -> RunReport {
        let seethe = self.world.seethe();
        let observers = self
            .clients
            .iter_mut()
            .map(|c| {
                let p = c.walker.position;
                let nearest = c.mirror.nearest(p.x, p.y, 0);
                ObserverSummary {
                    id: c.walker.id.0,
                    x: p.x,
                    z: p.y,
                    connected: c.connected,
                    known_locations: c.mirror.lunagree().known().len(),
                    nearest: nearest.map(|l| [l.x, l.z]),
                    nearest_distance: c.mirror.nearest_distance(p.x, p.y),
                    exposed_steps: c.exposed_steps,
                    max_rainline_gradient: c.max_rainline_gradient,
                }
            })
            .collect();

        RunReport {
            seed: self.world.seed(),
            start_step: self.start_step,
            end_step: self.world.step_count(),
            seethe: SeetheSummary {
                is_active: seethe.is_active(),
                steps_remaining: seethe.steps_remaining(),
                cycles_until_long_inactive: seethe.cycles_until_long_inactive(),
                flips: self.flips(),
            },
            frames_sent: self.frames_sent,
            frames_applied: self.frames_applied,
            frames_dropped: self.frames_dropped,
            known_location_updates: self.known_location_updates,
            mirror_mismatches: self.mirror_mismatches,
            commands: self.commands.clone(),
            load_warnings,
            observers,
        }
    }
}

use glam::{DVec3, IVec2};
use lumar_core::types::{EntityId, ObserverId};

use crate::error::HeadlessError;

/// Blocks an observer walks per step.
const WALK_SPEED: i32 = 3;

/// Steps between a walker's turns.
const TURN_INTERVAL: u64 = 600;

/// Headings walkers cycle through: the eight compass directions.
const HEADINGS: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(1, 1),
    IVec2::new(0, 1),
    IVec2::new(-1, 1),
    IVec2::new(-1, 0),
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
];

/// An operator command to run before a given step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledCommand {
    pub step: u64,
    pub line: String,
}

impl ScheduledCommand {
    /// Parse `@<step> <command>`; a line without the prefix runs before step 0.
    pub fn parse(arg: &str) -> Result<Self, HeadlessError> {
        let arg = arg.trim();
        let Some(rest) = arg.strip_prefix('@') else {
            return Ok(Self {
                step: 0,
                line: arg.to_string(),
            });
        };
        let (step, line) = rest
            .split_once(char::is_whitespace)
            .ok_or_else(|| HeadlessError::Schedule(arg.to_string()))?;
        let step = step
            .parse()
            .map_err(|_| HeadlessError::Schedule(arg.to_string()))?;
        Ok(Self {
            step,
            line: line.trim().to_string(),
        })
    }
}

/// A scripted observer walking straight lines, turning at a fixed interval.
#[derive(Debug, Clone)]
pub struct Walker {
    pub id: ObserverId,
    pub position: IVec2,
    heading: usize,
    /// Disconnects for the middle third of the run when set.
    pub churns: bool,
}

impl Walker {
    pub fn new(index: u32) -> Self {
        let i = index as i32;
        Self {
            id: ObserverId(index as u64 + 1),
            position: IVec2::new(i * 700 - 1500, (i % 3) * -900 + 250),
            heading: index as usize % HEADINGS.len(),
            churns: index % 4 == 3,
        }
    }

    /// Position for `step`. Turns every `TURN_INTERVAL` steps.
    pub fn advance(&mut self, step: u64) -> IVec2 {
        if step > 0 && step % TURN_INTERVAL == 0 {
            self.heading = (self.heading + 3) % HEADINGS.len();
        }
        self.position = self
            .position
            .saturating_add(HEADINGS[self.heading] * WALK_SPEED);
        self.position
    }
}

/// A rainline drifting in a straight line that bounces inside a square.
#[derive(Debug, Clone)]
pub struct Drifter {
    pub id: EntityId,
    pub position: DVec3,
    velocity: DVec3,
    half_extent: f64,
}

impl Drifter {
    pub fn new(index: u32) -> Self {
        let angle = index as f64 * 2.399_963;
        Self {
            id: EntityId(1000 + index as u64),
            position: DVec3::new(index as f64 * 400.0 - 600.0, 80.0, -(index as f64) * 250.0),
            velocity: DVec3::new(angle.cos() * 1.5, 0.0, angle.sin() * 1.5),
            half_extent: 3000.0,
        }
    }

    pub fn advance(&mut self) -> DVec3 {
        self.position += self.velocity;
        if self.position.x.abs() > self.half_extent {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.z.abs() > self.half_extent {
            self.velocity.z = -self.velocity.z;
        }
        self.position
    }
}

/// Everything the headless driver runs.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub steps: u64,
    pub observers: u32,
    pub rainlines: u32,
    pub commands: Vec<ScheduledCommand>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            steps: 2_000,
            observers: 4,
            rainlines: 3,
            commands: Vec::new(),
        }
    }
}

impl Scenario {
    pub fn walkers(&self) -> Vec<Walker> {
        (0..self.observers).map(Walker::new).collect()
    }

    pub fn drifters(&self) -> Vec<Drifter> {
        (0..self.rainlines).map(Drifter::new).collect()
    }

    /// Whether a churning walker is disconnected at `step`.
    pub fn is_churned_out(&self, step: u64) -> bool {
        step >= self.steps / 3 && step < self.steps * 2 / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scheduled_command() {
        assert_eq!(
            ScheduledCommand::parse("@120 seethe start 30").expect("valid"),
            ScheduledCommand {
                step: 120,
                line: "seethe start 30".to_string()
            }
        );
        assert_eq!(
            ScheduledCommand::parse("seethe status").expect("valid"),
            ScheduledCommand {
                step: 0,
                line: "seethe status".to_string()
            }
        );
        assert!(ScheduledCommand::parse("@soon seethe status").is_err());
        assert!(ScheduledCommand::parse("@5").is_err());
    }

    #[test]
    fn test_walker_moves_and_turns() {
        let mut walker = Walker::new(0);
        let start = walker.position;
        let first = walker.advance(0);
        assert_eq!(first - start, IVec2::new(WALK_SPEED, 0));
        for step in 1..TURN_INTERVAL {
            walker.advance(step);
        }
        let before = walker.position;
        let after = walker.advance(TURN_INTERVAL);
        assert_eq!(after - before, HEADINGS[3] * WALK_SPEED);
    }

    #[test]
    fn test_drifter_stays_bounded() {
        let mut drifter = Drifter::new(2);
        for _ in 0..20_000 {
            let p = drifter.advance();
            assert!(p.x.abs() < 3002.0 && p.z.abs() < 3002.0);
        }
    }

    #[test]
    fn test_unique_ids() {
        let scenario = Scenario {
            observers: 12,
            ..Scenario::default()
        };
        let mut ids: Vec<_> = scenario.walkers().iter().map(|w| w.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 12);
        assert_eq!(scenario.walkers().iter().filter(|w| w.churns).count(), 3);
    }
}

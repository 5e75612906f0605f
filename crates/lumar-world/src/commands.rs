//! Text command surface for operators.
//!
//! ```text
//! seethe status
//! seethe start [seconds]
//! seethe stop [seconds]
//! lunagree nearest <x> <z>
//! rainline list
//! ```

use lumar_core::math::{format_steps, seconds_to_steps};
use thiserror::Error;

use crate::seethe::Seethe;
use crate::tracker::scan_nearest;
use crate::World;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("missing argument <{0}>")]
    MissingArgument(&'static str),
    #[error("'{0}' is not an integer")]
    InvalidNumber(String),
    #[error("unexpected argument '{0}'")]
    TrailingArgument(String),
}

/// A parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    SeetheStatus,
    /// Optional duration in seconds; clamped when applied.
    SeetheStart(Option<i64>),
    SeetheStop(Option<i64>),
    LunagreeNearest { x: i32, z: i32 },
    RainlineList,
}

pub fn parse(line: &str) -> Result<AdminCommand, CommandError> {
    let mut words = line.split_whitespace();
    let head = words.next().ok_or(CommandError::Empty)?;
    let sub = words.next().unwrap_or("");

    let command = match (head, sub) {
        ("seethe", "status") => AdminCommand::SeetheStatus,
        ("seethe", "start") => AdminCommand::SeetheStart(optional_int(words.next())?),
        ("seethe", "stop") => AdminCommand::SeetheStop(optional_int(words.next())?),
        ("lunagree", "nearest") => {
            let x = required_int(words.next(), "x")?;
            let z = required_int(words.next(), "z")?;
            AdminCommand::LunagreeNearest {
                x: clamp_coord(x),
                z: clamp_coord(z),
            }
        }
        ("rainline", "list") => AdminCommand::RainlineList,
        _ => return Err(CommandError::Unknown(line.trim().to_string())),
    };

    if let Some(extra) = words.next() {
        return Err(CommandError::TrailingArgument(extra.to_string()));
    }
    Ok(command)
}

fn optional_int(word: Option<&str>) -> Result<Option<i64>, CommandError> {
    word.map(|w| {
        w.parse::<i64>()
            .map_err(|_| CommandError::InvalidNumber(w.to_string()))
    })
    .transpose()
}

fn required_int(word: Option<&str>, name: &'static str) -> Result<i64, CommandError> {
    optional_int(word)?.ok_or(CommandError::MissingArgument(name))
}

fn clamp_coord(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// One-line seethe report with the remaining duration in real time.
pub fn seethe_status(seethe: &Seethe) -> String {
    format!(
        "Seethe is {}; {} remaining ({} steps); {} cycle(s) until long inactive phase",
        if seethe.is_active() { "active" } else { "inactive" },
        format_steps(seethe.steps_remaining()),
        seethe.steps_remaining(),
        seethe.cycles_until_long_inactive()
    )
}

/// Parse and apply a command, returning the text reply.
pub fn execute(world: &mut World, line: &str) -> Result<String, CommandError> {
    let command = parse(line)?;
    log::info!("Admin command: {:?}", command);

    let reply = match command {
        AdminCommand::SeetheStatus => seethe_status(world.seethe()),
        AdminCommand::SeetheStart(seconds) => {
            world.seethe_mut().force_active(seconds.map(seconds_to_steps));
            seethe_status(world.seethe())
        }
        AdminCommand::SeetheStop(seconds) => {
            world.seethe_mut().force_inactive(seconds.map(seconds_to_steps));
            seethe_status(world.seethe())
        }
        AdminCommand::LunagreeNearest { x, z } => {
            let known = scan_nearest(world.field(), x, z, world.config().max_scan_rings);
            match known.nearest(x, z, 0) {
                Some(l) => {
                    let d = (l.distance_sq_to(x, z) as f64).sqrt();
                    format!(
                        "Nearest lunagree at ({}, {}) in cell ({}, {}), {:.0} blocks away",
                        l.x, l.z, l.cell_x, l.cell_z, d
                    )
                }
                None => format!(
                    "No lunagree within {} cells of ({x}, {z})",
                    world.config().max_scan_rings
                ),
            }
        }
        AdminCommand::RainlineList => {
            let rainlines = world.rainlines().sorted();
            if rainlines.is_empty() {
                "No rainlines".to_string()
            } else {
                let mut out = format!("{} rainline(s):", rainlines.len());
                for r in rainlines {
                    out.push_str(&format!(
                        "\n  #{} at ({:.1}, {:.1}, {:.1})",
                        r.id.0, r.position.x, r.position.y, r.position.z
                    ));
                }
                out
            }
        }
    };
    Ok(reply)
}

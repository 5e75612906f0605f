use std::path::Path;

/// Result of one operator command.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CommandOutcome {
    pub step: u64,
    pub command: String,
    pub ok: bool,
    pub reply: String,
}

/// Final state of one scripted observer.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ObserverSummary {
    pub id: u64,
    pub x: i32,
    pub z: i32,
    pub connected: bool,
    pub known_locations: usize,
    pub nearest: Option<[i32; 2]>,
    pub nearest_distance: Option<f64>,
    /// Steps spent inside a lunagree hazard radius while the seethe was active.
    pub exposed_steps: u64,
    pub max_rainline_gradient: f32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SeetheSummary {
    pub is_active: bool,
    pub steps_remaining: u32,
    pub cycles_until_long_inactive: u32,
    pub flips: u64,
}

/// Everything a headless run reports.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RunReport {
    pub seed: u64,
    pub start_step: u64,
    pub end_step: u64,
    pub seethe: SeetheSummary,
    pub frames_sent: u64,
    pub frames_applied: u64,
    pub frames_dropped: u64,
    pub known_location_updates: u64,
    /// Server/client disagreements found after each step. Zero on a healthy run.
    pub mirror_mismatches: u64,
    pub commands: Vec<CommandOutcome>,
    pub load_warnings: Vec<String>,
    pub observers: Vec<ObserverSummary>,
}

/// Save a report as pretty JSON.
pub fn save_report(path: &Path, report: &RunReport) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// Format a short markdown summary of a run.
pub fn format_markdown(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Seed {} | steps {}..{} | seethe {} ({} steps left, {} flips) | frames {}/{} | mismatches {}\n\n",
        report.seed,
        report.start_step,
        report.end_step,
        if report.seethe.is_active { "active" } else { "inactive" },
        report.seethe.steps_remaining,
        report.seethe.flips,
        report.frames_applied,
        report.frames_sent,
        report.mirror_mismatches,
    ));

    out.push_str("| Observer | Position | Known | Nearest | Distance | Exposed | Rainline |\n");
    out.push_str("|----------|----------|-------|---------|----------|---------|----------|\n");
    for o in &report.observers {
        let nearest = o
            .nearest
            .map(|[x, z]| format!("({x}, {z})"))
            .unwrap_or_else(|| "-".to_string());
        let distance = o
            .nearest_distance
            .map(|d| format!("{d:.1}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "| {}{} | ({}, {}) | {} | {} | {} | {} | {:.2} |\n",
            o.id,
            if o.connected { "" } else { " (away)" },
            o.x,
            o.z,
            o.known_locations,
            nearest,
            distance,
            o.exposed_steps,
            o.max_rainline_gradient,
        ));
    }

    for c in &report.commands {
        out.push_str(&format!(
            "\n@{} `{}` -> {}{}",
            c.step,
            c.command,
            if c.ok { "" } else { "error: " },
            c.reply
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RunReport {
        RunReport {
            seed: 1,
            start_step: 0,
            end_step: 10,
            seethe: SeetheSummary {
                is_active: false,
                steps_remaining: 100,
                cycles_until_long_inactive: 6,
                flips: 0,
            },
            frames_sent: 4,
            frames_applied: 4,
            frames_dropped: 0,
            known_location_updates: 2,
            mirror_mismatches: 0,
            commands: vec![CommandOutcome {
                step: 0,
                command: "seethe status".to_string(),
                ok: true,
                reply: "Seethe is inactive".to_string(),
            }],
            load_warnings: Vec::new(),
            observers: vec![ObserverSummary {
                id: 1,
                x: 5,
                z: -5,
                connected: true,
                known_locations: 9,
                nearest: Some([100, 20]),
                nearest_distance: Some(95.5),
                exposed_steps: 0,
                max_rainline_gradient: 0.25,
            }],
        }
    }

    #[test]
    fn test_report_json_fields() {
        let json = serde_json::to_value(report()).expect("serializable");
        assert_eq!(json["seed"], 1);
        assert_eq!(json["observers"][0]["nearest"][0], 100);
        assert_eq!(json["seethe"]["steps_remaining"], 100);
    }

    #[test]
    fn test_markdown_summary() {
        let text = format_markdown(&report());
        assert!(text.contains("| 1 | (5, -5) | 9 | (100, 20) | 95.5 | 0 | 0.25 |"));
        assert!(text.contains("@0 `seethe status` -> Seethe is inactive"));
    }
}

use std::path::{Path, PathBuf};
use std::process;

use lumar_core::LumarConfig;
use lumar_headless::report;
use lumar_headless::{HeadlessError, Runner, Scenario, ScheduledCommand};
use lumar_world::World;

struct Args {
    seed: u64,
    config: Option<PathBuf>,
    load: Option<PathBuf>,
    save: Option<PathBuf>,
    report: Option<PathBuf>,
    scenario: Scenario,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    if let Err(e) = run(args) {
        log::error!("{e}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), HeadlessError> {
    let config = match &args.config {
        Some(path) => LumarConfig::load(&read_text(path)?).map_err(HeadlessError::Config)?,
        None => LumarConfig::default(),
    };

    let (world, load_warnings) = match &args.load {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|source| io_error(path, source))?;
            let data = lumar_persist::load(&bytes, &config)?;
            log::info!(
                "Loaded {} (step {}, {} observers)",
                path.display(),
                data.snapshot.step_count,
                data.snapshot.observers.len()
            );
            (World::restore(config, data.snapshot), data.warnings)
        }
        None => (World::new(args.seed, config), Vec::new()),
    };

    let mut runner = Runner::new(world, &args.scenario);
    runner.run(&args.scenario);
    let run_report = runner.report(load_warnings);

    println!("\n## Lumar headless run\n");
    println!("{}", report::format_markdown(&run_report));

    if let Some(path) = &args.report {
        report::save_report(path, &run_report).map_err(|source| io_error(path, source))?;
        log::info!("Saved report to {}", path.display());
    }

    if let Some(path) = &args.save {
        let bytes = lumar_persist::save(&runner.world().snapshot());
        std::fs::write(path, bytes).map_err(|source| io_error(path, source))?;
        log::info!("Saved world to {}", path.display());
    }

    if run_report.mirror_mismatches > 0 {
        log::warn!(
            "{} client mirror mismatches detected",
            run_report.mirror_mismatches
        );
    }
    Ok(())
}

fn read_text(path: &Path) -> Result<String, HeadlessError> {
    std::fs::read_to_string(path).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> HeadlessError {
    HeadlessError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn parse_args() -> Args {
    let argv: Vec<String> = std::env::args().collect();
    let mut args = Args {
        seed: 1,
        config: None,
        load: None,
        save: None,
        report: None,
        scenario: Scenario::default(),
    };

    let mut i = 1;
    while i < argv.len() {
        let flag = argv[i].as_str();
        let mut value = || {
            i += 1;
            match argv.get(i) {
                Some(v) => v.clone(),
                None => usage_error(&format!("{flag} needs a value")),
            }
        };
        match flag {
            "--seed" => args.seed = parse_number(flag, &value()),
            "--steps" => args.scenario.steps = parse_number(flag, &value()),
            "--observers" => args.scenario.observers = parse_number(flag, &value()),
            "--rainlines" => args.scenario.rainlines = parse_number(flag, &value()),
            "--config" => args.config = Some(PathBuf::from(value())),
            "--load" => args.load = Some(PathBuf::from(value())),
            "--save" => args.save = Some(PathBuf::from(value())),
            "--report" => args.report = Some(PathBuf::from(value())),
            "--command" => match ScheduledCommand::parse(&value()) {
                Ok(command) => args.scenario.commands.push(command),
                Err(e) => usage_error(&e.to_string()),
            },
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => usage_error(&format!("Unknown argument: {other}")),
        }
        i += 1;
    }
    args
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> T {
    match value.parse() {
        Ok(v) => v,
        Err(_) => usage_error(&format!("invalid {flag} value '{value}'")),
    }
}

fn usage_error(message: &str) -> ! {
    eprintln!("{message}");
    print_usage();
    process::exit(1);
}

fn print_usage() {
    eprintln!("Usage: lumar-headless [OPTIONS]");
    eprintln!("  --seed <n>            World seed for new worlds (default: 1)");
    eprintln!("  --steps <n>           Steps to simulate (default: 2000)");
    eprintln!("  --observers <n>       Scripted observers (default: 4)");
    eprintln!("  --rainlines <n>       Drifting rainlines (default: 3)");
    eprintln!("  --config <path>       RON config file");
    eprintln!("  --load <path>         Resume from a save file");
    eprintln!("  --save <path>         Write a save file when done");
    eprintln!("  --command <cmd>       Admin command, optionally '@<step> <cmd>' (repeatable)");
    eprintln!("  --report <path>       Write a JSON report");
}

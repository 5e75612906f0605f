use lumar_core::types::ObserverId;
use lumar_core::LumarConfig;
use lumar_headless::{Runner, Scenario, ScheduledCommand};
use lumar_sync::{ClientMirror, SyncChannel};
use lumar_world::World;

fn run(seed: u64, scenario: &Scenario) -> (Runner, lumar_headless::report::RunReport) {
    let world = World::new(seed, LumarConfig::default());
    let mut runner = Runner::new(world, scenario);
    runner.run(scenario);
    let report = runner.report(Vec::new());
    (runner, report)
}

fn command(arg: &str) -> ScheduledCommand {
    ScheduledCommand::parse(arg).expect("valid schedule")
}

#[test]
fn test_mirrors_agree_with_server() {
    let scenario = Scenario {
        steps: 1_500,
        observers: 8,
        ..Scenario::default()
    };
    let (_, report) = run(11, &scenario);
    assert_eq!(report.mirror_mismatches, 0);
    assert_eq!(report.frames_dropped, 0);
    assert_eq!(report.frames_applied, report.frames_sent);
    assert!(report.known_location_updates >= 8);
    assert_eq!(report.end_step, 1_500);
    assert!(report.observers.iter().all(|o| o.connected));
}

#[test]
fn test_runs_are_deterministic() {
    let scenario = Scenario {
        steps: 800,
        commands: vec![command("@200 seethe start 5")],
        ..Scenario::default()
    };
    let (_, a) = run(5, &scenario);
    let (_, b) = run(5, &scenario);
    assert_eq!(
        serde_json::to_string(&a).expect("serializable"),
        serde_json::to_string(&b).expect("serializable")
    );
}

#[test]
fn test_scheduled_overrides_reach_clients() {
    let scenario = Scenario {
        steps: 400,
        commands: vec![
            command("@100 seethe start 60"),
            command("@150 seethe status"),
            command("@160 seethe explode"),
        ],
        ..Scenario::default()
    };
    let (runner, report) = run(3, &scenario);
    assert_eq!(report.mirror_mismatches, 0);
    assert!(runner.world().seethe().is_active());
    // 60 s = 1200 steps set before step 100, then 300 steps elapsed.
    assert_eq!(runner.world().seethe().steps_remaining(), 900);

    assert_eq!(report.commands.len(), 3);
    assert!(report.commands[0].ok);
    assert!(report.commands[1].reply.starts_with("Seethe is active"));
    assert!(!report.commands[2].ok);
}

#[test]
fn test_save_and_resume_matches_uninterrupted_cycle() {
    let scenario = Scenario {
        steps: 30_000,
        observers: 2,
        rainlines: 0,
        commands: Vec::new(),
    };
    let (runner, _) = run(77, &scenario);
    let bytes = lumar_persist::save(&runner.world().snapshot());

    let data = lumar_persist::load(&bytes, &LumarConfig::default()).expect("loads");
    assert!(data.warnings.is_empty());
    let restored = World::restore(LumarConfig::default(), data.snapshot);
    let mut resumed = Runner::new(restored, &scenario);
    resumed.run(&scenario);
    let report = resumed.report(Vec::new());
    assert_eq!(report.mirror_mismatches, 0);
    assert_eq!(report.start_step, 30_000);
    assert_eq!(report.end_step, 60_000);

    let mut reference = World::new(77, LumarConfig::default());
    for _ in 0..60_000 {
        reference.step();
    }
    assert_eq!(
        resumed.world().seethe().record(),
        reference.seethe().record()
    );
}

#[test]
fn test_reconnect_after_restore_uses_saved_set() {
    let mut world = World::new(9, LumarConfig::default());
    world.connect_observer(ObserverId(1), 4_000, -2_500);
    let saved_set = *world
        .observers()
        .get(ObserverId(1))
        .expect("connected")
        .tracker
        .known();
    let bytes = lumar_persist::save(&world.snapshot());

    let data = lumar_persist::load(&bytes, &LumarConfig::default()).expect("loads");
    let mut world = World::restore(LumarConfig::default(), data.snapshot);
    let (channel, receiver) = SyncChannel::new();
    let events = world.connect_observer(ObserverId(1), 4_000, -2_500);
    channel.publish(&world, &events);

    let mut mirror = ClientMirror::new(ObserverId(1), 128, 48);
    for out in receiver.try_iter() {
        mirror.apply(&out.frame).expect("valid frame");
    }
    assert_eq!(*mirror.lunagree().known(), saved_set);
    assert_eq!(mirror.seethe().state(), Some(world.seethe().state()));
}

#[test]
fn test_shipped_config_matches_defaults() {
    let text = include_str!("../../../config/lumar.ron");
    let config = LumarConfig::load(text).expect("shipped config is valid");
    assert_eq!(config, LumarConfig::default());
}

//! Tank Arena native entry point
//!
//! Runs the scene against the headless display in real time, driving the
//! player from a short scripted demo instead of a keyboard.

use std::path::Path;
use std::time::Duration;

use tank_arena::input::{Direction, InputEvent};
use tank_arena::render::HeadlessDisplay;
use tank_arena::sim::{EntityKind, FrameClock, FrameStats, GameScene};
use tank_arena::{Assets, ConfigError, Settings};

/// Optional tuning file next to the working directory
const SETTINGS_PATH: &str = "tank-arena.json";
/// Length of the demo run in seconds
const DEMO_SECONDS: f32 = 10.0;
/// Target frame pacing
const FRAME_TIME: Duration = Duration::from_millis(16);

/// Input cues as (seconds since start, event)
const DEMO_SCRIPT: &[(f32, InputEvent)] = &[
    (0.2, InputEvent::Fire),
    (0.5, InputEvent::Pressed(Direction::Left)),
    (1.0, InputEvent::Released(Direction::Left)),
    (1.0, InputEvent::Pressed(Direction::Up)),
    (2.5, InputEvent::Fire),
    (3.0, InputEvent::Released(Direction::Up)),
    (3.0, InputEvent::Pressed(Direction::Right)),
    (4.0, InputEvent::Released(Direction::Right)),
    (4.2, InputEvent::Fire),
    (4.5, InputEvent::Pressed(Direction::Down)),
    (6.0, InputEvent::Released(Direction::Down)),
    (6.5, InputEvent::Fire),
    (8.0, InputEvent::Fire),
];

fn main() -> Result<(), ConfigError> {
    env_logger::init();
    log::info!("Tank Arena (headless) starting...");

    let settings = Settings::load_or_default(Path::new(SETTINGS_PATH))?;
    let mut scene = GameScene::new(settings, Assets::builtin())?;
    log::info!("Scene seed: {}", scene.settings().seed);
    let max_delta = scene.settings().max_frame_delta;
    let mut display = HeadlessDisplay::new();
    for err in scene.build_world(&mut display) {
        log::error!("World entity skipped: {err}");
    }

    let mut clock = FrameClock::new(max_delta);
    let mut totals = FrameStats::default();
    let mut elapsed = 0.0;
    let mut cues = DEMO_SCRIPT.iter().peekable();

    while elapsed < DEMO_SECONDS {
        std::thread::sleep(FRAME_TIME);
        let dt = clock.delta();
        elapsed += dt;

        while let Some((_, event)) = cues.next_if(|(at, _)| *at <= elapsed) {
            log::debug!("Input at {elapsed:.2}s: {event:?}");
            scene.handle_input(*event);
        }

        let stats = scene.frame(dt, &mut display);
        totals.disposed += stats.disposed;
        totals.updated += stats.updated;
        totals.skipped += stats.skipped;
        totals.spawned += stats.spawned;
        totals.failed += stats.failed;
    }

    log::info!(
        "Ran {} frames in {elapsed:.1}s: {} spawned, {} disposed, {} failed loads",
        scene.frame_index(),
        totals.spawned,
        totals.disposed,
        totals.failed
    );
    match scene.find_kind(EntityKind::Enemy) {
        Some((_, enemy)) => {
            let health = enemy.as_enemy().map_or(0, |e| e.health());
            log::info!("Enemy survived with {health} health");
        }
        None => log::info!("Enemy destroyed"),
    }
    if let Some((_, player)) = scene.find_kind(EntityKind::Player) {
        log::info!("Player finished at {:?}", player.position());
    }
    log::info!("{} entities still registered", scene.len());
    Ok(())
}

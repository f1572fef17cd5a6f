/// Entry point and game loop.

mod config;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use officeheist::domain::input::{Action, InputSource};
use officeheist::sim::event::GameEvent;
use officeheist::sim::step;
use officeheist::sim::world::{Phase, World};
use ui::input::InputState;
use ui::renderer::Renderer;

fn main() -> anyhow::Result<()> {
    let (config, config_error) = match GameConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };
    init_logging(&config)?;
    if let Some(e) = config_error {
        warn!(error = %e, "using default settings");
    }

    let mut world = match config.seed {
        Some(seed) => World::with_seed(seed),
        None => World::from_entropy(),
    };
    info!(seed = ?config.seed, "run started");

    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let result = game_loop(&mut world, &mut renderer, &config);

    // Restore the terminal before reporting anything.
    let cleanup = renderer.cleanup().context("terminal cleanup failed");
    result?;
    cleanup?;

    println!();
    println!("Thanks for playing Office Heist!");
    println!("Final haul: ${}", world.player.money);
    Ok(())
}

/// Send tracing output to the configured log file. Stdout belongs to the
/// terminal UI, so with no log file nothing is installed.
fn init_logging(config: &GameConfig) -> anyhow::Result<()> {
    let Some(path) = &config.log_file else { return Ok(()) };
    let file = File::create(path)
        .with_context(|| format!("could not create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn game_loop(world: &mut World, renderer: &mut Renderer, config: &GameConfig) -> anyhow::Result<()> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.reports_key_release();
    let mut last_frame = Instant::now();
    let mut status = String::new();

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.was_pressed(Action::Quit) {
            break;
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        match world.phase {
            Phase::Playing => {
                // A long frame could carry a body through a wall; skip it.
                if dt > config.timing.max_frame_time {
                    debug!(dt, "dropped long frame");
                } else {
                    let events = step::step(world, &kb, dt);
                    update_status(&mut status, &events);
                    if world.phase == Phase::Ended {
                        info!(money = world.player.money, spotted = world.player.was_spotted, "run over");
                    }
                }
            }
            Phase::Ended => {
                if kb.was_pressed(Action::Continue) {
                    world.reset_run();
                    status.clear();
                    info!("new run");
                }
            }
        }

        renderer.render(world, &status)?;
        std::thread::sleep(config.timing.frame_sleep);
    }

    Ok(())
}

/// Latest noteworthy event, shown on the HUD row.
fn update_status(status: &mut String, events: &[GameEvent]) {
    for event in events {
        *status = match event {
            GameEvent::LootPicked { value, .. } => format!("+${value}"),
            GameEvent::DoorClosed { .. } => "A door slammed shut!".to_string(),
            GameEvent::PlayerSpotted => "Spotted!".to_string(),
            GameEvent::LevelRegenerated => "Escaped! Next floor...".to_string(),
        };
    }
}

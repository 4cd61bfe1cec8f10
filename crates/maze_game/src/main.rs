//! maze-sim: headless run of a small demo level
//!
//! Usage: `maze-sim [scene.toml]`. Without an argument the `MAZE_CONFIG`
//! environment variable is consulted, then the built-in defaults.

use glam::Vec3;
use maze_game::prelude::*;
use std::process::ExitCode;

fn load_config() -> Result<SceneConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MAZE_CONFIG").ok().filter(|p| !p.is_empty()));

    match path {
        Some(path) => SceneConfig::load(path),
        None => {
            log::info!("No scene config given, using defaults");
            Ok(SceneConfig::default())
        }
    }
}

/// Floor tiles of a square room, one per unit cell
fn floor_tiles(half_size: i32) -> Vec<Vec3> {
    (-half_size..=half_size)
        .flat_map(|x| (-half_size..=half_size).map(move |z| Vec3::new(x as f32 * 2.0, 0.0, z as f32 * 2.0)))
        .collect()
}

/// The player paces back and forth along the x axis
fn patrol(time: f32) -> Vec3 {
    Vec3::new((time * 0.4).sin() * 12.0, 0.0, 4.0)
}

fn build_level(scene: &mut Scene) {
    scene.spawn_player(patrol(0.0));
    scene.spawn_turret(Vec3::new(0.0, 0.0, -6.0));
    scene.spawn_turret(Vec3::new(14.0, 0.0, 10.0));
    scene.spawn_hazard(Vec3::new(6.0, 0.0, 4.0), 1.0);
    scene.spawn_obstacle(Vec3::new(-4.0, 1.0, -2.0), Vec3::new(3.0, 1.0, 0.25));
    scene.spawn_coins(&floor_tiles(8));
    scene.generate_forest();
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let steps = (config.simulation.duration * config.simulation.tick_rate as f32).ceil() as u64;
    let dt = 1.0 / config.simulation.tick_rate as f32;

    let mut scene = Scene::new(config);
    build_level(&mut scene);
    let Some(player) = scene.player() else {
        log::error!("Demo level has no player");
        return ExitCode::FAILURE;
    };

    let mut totals = StepReport::default();
    for _ in 0..steps {
        scene.set_position(player, patrol(scene.now()));
        let report = scene.step(dt);

        totals.shots_fired += report.shots_fired;
        totals.projectile_hits += report.projectile_hits;
        totals.hazard_damage += report.hazard_damage;
        totals.poison_damage += report.poison_damage;
        totals.coins_collected += report.coins_collected;

        if report.game_over {
            totals.game_over = true;
            break;
        }
    }

    let health = scene.health(player).map(|h| h.current()).unwrap_or(0.0);
    log::info!(
        "Simulated {:.1}s: {} shots, {} hits, {:.0} hazard + {:.0} poison damage, {} coins, player hp {:.0}",
        scene.now(),
        totals.shots_fired,
        totals.projectile_hits,
        totals.hazard_damage,
        totals.poison_damage,
        scene.coins().total(),
        health,
    );
    if let Some(forest) = scene.forest() {
        log::info!("Forest: {} trees in {} batches", forest.len(), forest.batch_count());
    }
    if totals.game_over {
        log::info!("Game over");
    }

    ExitCode::SUCCESS
}

use std::{env, error::Error, time::Instant};

use gravsim::{SimConfig, World, core::Event};

const SIM_HZ: f64 = 60.0;
const DT: f64 = 1.0 / SIM_HZ;
const RUN_TICKS: u64 = 1_200;
const STATS_EVERY: u64 = 300;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let initial_bodies = match args.next() {
        Some(raw) => raw.parse()?,
        None => 200,
    };
    let config = SimConfig {
        initial_bodies,
        ..SimConfig::default()
    };

    let mut world = World::new(&config)?;
    world.start();

    let mut accumulator = 0.0_f64;
    let mut last_tick = Instant::now();
    let mut ticks = 0_u64;
    while ticks < RUN_TICKS {
        let now = Instant::now();
        // headless: never fall behind by more than one frame
        accumulator += (now - last_tick).as_secs_f64().max(DT);
        last_tick = now;

        while accumulator >= DT && ticks < RUN_TICKS {
            world.step(DT)?;
            accumulator -= DT;
            ticks += 1;

            if ticks % STATS_EVERY == 0 {
                let stats = world.stats();
                log::info!(
                    "tick {ticks}: {} bodies, mass {:.1}, |p| {:.3e}, ke {:.3e}",
                    stats.body_count,
                    stats.total_mass,
                    stats.momentum.length(),
                    stats.kinetic_energy
                );
                if let Some(report) = world.last_report() {
                    log::info!(
                        "last step: gravity {:?} in {:?}, collisions {:?} in {:?}",
                        report.gravity_mode,
                        report.gravity_time,
                        report.collision_strategy,
                        report.collision_time
                    );
                }
            }
        }

        for event in world.drain_events() {
            if let Event::Merged { a, b, into } = event {
                log::debug!("{a} + {b} -> {into}");
            }
        }
    }

    world.stop();
    log::info!(
        "finished {} iterations with {} collisions",
        world.iteration_count(),
        world.collision_count()
    );
    Ok(())
}

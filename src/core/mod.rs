mod collision;
mod force;
mod scheduler;

pub use collision::{CollisionResolver, CollisionStrategy, Merge};
pub use force::{ForceField, partition_pairs};
pub use scheduler::{ExecutionMode, Phase, StepScheduler, default_workers};

use std::{
    any::Any,
    collections::{HashSet, VecDeque},
    panic::{self, AssertUnwindSafe},
    time::{Duration, Instant},
};

use rand::{SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    body::{Archetype, ArchetypePolicy, Body, pick_archetype, spawn_body},
    config::{self, SimConfig},
    error::{Result, SimError},
    types::{BodyId, Bounds, IdGenerator, Vec2, WorldStats},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Running,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Event {
    Started { bodies: usize },
    Stopped { iteration: u64 },
    Reset { bodies: usize },
    Merged { a: BodyId, b: BodyId, into: BodyId },
    Milestone { iteration: u64, bodies: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepReport {
    pub iteration: u64,
    pub bodies_before: usize,
    pub bodies_after: usize,
    pub gravity_mode: Option<ExecutionMode>,
    pub position_mode: ExecutionMode,
    pub collision_strategy: Option<CollisionStrategy>,
    pub collision_mode: Option<ExecutionMode>,
    pub merges: usize,
    pub gravity_time: Duration,
    pub position_time: Duration,
    pub collision_time: Duration,
}

pub struct World {
    bodies: Vec<Body>,
    live_ids: HashSet<BodyId>,
    bounds: Bounds,
    gravity_scale: f64,
    state: RunState,
    iterations: u64,
    collisions: u64,
    ids: IdGenerator,
    rng: StdRng,
    force: ForceField,
    resolver: CollisionResolver,
    scheduler: StepScheduler,
    events: VecDeque<Event>,
    last_report: Option<StepReport>,
    #[cfg(test)]
    fault: bool,
}

impl World {
    pub fn new(config: &SimConfig) -> Result<Self> {
        config.validate()?;
        let bounds = Bounds::new(config.width, config.height);
        let scheduler = StepScheduler::new(config.workers)?;
        log::debug!(
            "world {}x{} with {} workers, seed {:#x}",
            bounds.width,
            bounds.height,
            scheduler.workers(),
            config.seed
        );
        let mut world = Self {
            bodies: Vec::new(),
            live_ids: HashSet::new(),
            bounds,
            gravity_scale: config.gravity_scale,
            state: RunState::Idle,
            iterations: 0,
            collisions: 0,
            ids: IdGenerator::new(),
            rng: StdRng::seed_from_u64(config.seed),
            force: ForceField::new(),
            resolver: CollisionResolver::default(),
            scheduler,
            events: VecDeque::with_capacity(config::EVENT_LOG_CAPACITY),
            last_report: None,
            #[cfg(test)]
            fault: false,
        };
        if config.initial_bodies > 0 {
            world.populate(config.initial_bodies, config.archetype_policy)?;
        }
        Ok(world)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        if !self.live_ids.contains(&id) {
            return None;
        }
        self.bodies.iter().find(|b| b.id() == id)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn collision_count(&self) -> u64 {
        self.collisions
    }

    pub fn iteration_count(&self) -> u64 {
        self.iterations
    }

    pub fn gravity_scale(&self) -> f64 {
        self.gravity_scale
    }

    pub fn set_gravity_scale(&mut self, scale: f64) -> Result<()> {
        if !(scale.is_finite() && scale >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "gravity_scale must be non-negative and finite, got {scale}"
            )));
        }
        self.gravity_scale = scale;
        Ok(())
    }

    pub fn scheduler(&self) -> &StepScheduler {
        &self.scheduler
    }

    pub fn last_report(&self) -> Option<&StepReport> {
        self.last_report.as_ref()
    }

    pub fn next_body_id(&mut self) -> Result<BodyId> {
        self.ids.next_id()
    }

    pub fn add_body(&mut self, body: Body) -> Result<BodyId> {
        if !(body.mass().is_finite() && body.mass() > 0.0)
            || !(body.density().is_finite() && body.density() > 0.0)
        {
            return Err(SimError::InvalidBody {
                mass: body.mass(),
                density: body.density(),
            });
        }
        let id = body.id();
        if !self.live_ids.insert(id) {
            return Err(SimError::DuplicateBody(id));
        }
        self.ids.observe(id);
        self.bodies.push(body);
        Ok(id)
    }

    pub fn spawn(&mut self, archetype: Archetype) -> Result<BodyId> {
        let body = spawn_body(&mut self.rng, &mut self.ids, self.bounds, archetype)?;
        self.add_body(body)
    }

    pub fn start(&mut self) {
        if self.state == RunState::Running {
            return;
        }
        self.state = RunState::Running;
        log::info!("simulation started with {} bodies", self.bodies.len());
        self.push_event(Event::Started {
            bodies: self.bodies.len(),
        });
    }

    pub fn stop(&mut self) {
        if self.state == RunState::Idle {
            return;
        }
        self.state = RunState::Idle;
        log::info!("simulation stopped at iteration {}", self.iterations);
        self.push_event(Event::Stopped {
            iteration: self.iterations,
        });
    }

    // the run state is left as it was
    pub fn reset(&mut self, body_count: usize, policy: ArchetypePolicy) -> Result<()> {
        self.bodies.clear();
        self.live_ids.clear();
        self.iterations = 0;
        self.collisions = 0;
        self.last_report = None;
        self.populate(body_count, policy)?;
        log::info!("world reset with {} bodies", self.bodies.len());
        self.push_event(Event::Reset {
            bodies: self.bodies.len(),
        });
        Ok(())
    }

    fn populate(&mut self, body_count: usize, policy: ArchetypePolicy) -> Result<()> {
        self.bodies.reserve(body_count);
        for _ in 0..body_count {
            let archetype = pick_archetype(&mut self.rng, policy);
            self.spawn(archetype)?;
        }
        Ok(())
    }

    // a failing phase rolls the bodies back and stops the world
    pub fn step(&mut self, dt: f64) -> Result<Option<StepReport>> {
        if self.state == RunState::Idle || self.bodies.is_empty() {
            return Ok(None);
        }

        let iteration = self.iterations + 1;
        let snapshot = self.bodies.clone();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.advance(dt, iteration)));

        let (report, merges) = match outcome {
            Ok(Ok(done)) => done,
            Ok(Err(err)) => {
                self.bodies = snapshot;
                self.state = RunState::Idle;
                log::error!("step {iteration} failed, world stopped: {err}");
                return Err(err);
            }
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                self.bodies = snapshot;
                self.state = RunState::Idle;
                log::error!("step {iteration} failed, world stopped: {reason}");
                return Err(SimError::StepFailed { iteration, reason });
            }
        };

        self.iterations = iteration;
        self.collisions += merges.len() as u64;
        for merge in merges {
            self.live_ids.remove(&merge.a);
            self.live_ids.remove(&merge.b);
            self.live_ids.insert(merge.merged);
            self.push_event(Event::Merged {
                a: merge.a,
                b: merge.b,
                into: merge.merged,
            });
        }
        if iteration % config::MILESTONE_INTERVAL == 0 {
            log::info!(
                "iteration {iteration}: {} bodies, {} collisions",
                self.bodies.len(),
                self.collisions
            );
            self.push_event(Event::Milestone {
                iteration,
                bodies: self.bodies.len(),
            });
        }
        self.last_report = Some(report.clone());
        Ok(Some(report))
    }

    fn advance(&mut self, dt: f64, iteration: u64) -> Result<(StepReport, Vec<Merge>)> {
        let bodies_before = self.bodies.len();
        let workers = self.scheduler.workers();
        let scale = self.gravity_scale;
        let bounds = self.bounds;

        let mut gravity_mode = None;
        let mut gravity_time = Duration::ZERO;
        if self.bodies.len() > 1 {
            let mode = self.scheduler.decide(Phase::Gravity, self.bodies.len());
            let (bodies, force) = (&mut self.bodies, &mut self.force);
            let ((), elapsed) = self.scheduler.execute(Phase::Gravity, mode, || {
                force.apply(bodies, scale, dt, mode, workers)
            });
            gravity_mode = Some(mode);
            gravity_time = elapsed;
        }

        let position_mode = self.scheduler.decide(Phase::Position, self.bodies.len());
        let bodies = &mut self.bodies;
        let ((), position_time) =
            self.scheduler
                .execute(Phase::Position, position_mode, || match position_mode {
                    ExecutionMode::Parallel => bodies
                        .par_iter_mut()
                        .for_each(|body| body.integrate_position(bounds)),
                    ExecutionMode::Sequential => {
                        for body in bodies.iter_mut() {
                            body.integrate_position(bounds);
                        }
                    }
                });

        #[cfg(test)]
        if std::mem::take(&mut self.fault) {
            self.scheduler.pool().install(|| {
                (0..4).into_par_iter().for_each(|i| {
                    if i == 3 {
                        panic!("injected worker fault");
                    }
                })
            });
        }

        let mut merges = Vec::new();
        let mut collision_strategy = None;
        let mut collision_mode = None;
        let mut collision_time = Duration::ZERO;
        if self.bodies.len() > 1 {
            let count = self.bodies.len();
            let strategy = CollisionStrategy::for_count(count);
            let (bodies, ids, resolver) = (&mut self.bodies, &mut self.ids, &self.resolver);
            // only the grid strategy has a parallel detection path
            let (found, mode, elapsed) = if strategy == CollisionStrategy::UniformGrid {
                let mode = self.scheduler.decide(Phase::Collision, count);
                let (found, elapsed) = self.scheduler.execute(Phase::Collision, mode, || {
                    resolver.resolve(bodies, ids, strategy, mode)
                });
                (found, mode, elapsed)
            } else {
                let start = Instant::now();
                let found = resolver.resolve(bodies, ids, strategy, ExecutionMode::Sequential);
                (found, ExecutionMode::Sequential, start.elapsed())
            };
            merges = found?;
            collision_strategy = Some(strategy);
            collision_mode = Some(mode);
            collision_time = elapsed;
        }

        let report = StepReport {
            iteration,
            bodies_before,
            bodies_after: self.bodies.len(),
            gravity_mode,
            position_mode,
            collision_strategy,
            collision_mode,
            merges: merges.len(),
            gravity_time,
            position_time,
            collision_time,
        };
        log::debug!(
            "step {}: gravity {:?}, positions {:?}, collisions {:?}/{:?}, {} merges",
            report.iteration,
            report.gravity_mode,
            report.position_mode,
            report.collision_strategy,
            report.collision_mode,
            report.merges
        );
        Ok((report, merges))
    }

    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats {
            body_count: self.bodies.len(),
            ..WorldStats::default()
        };
        let mut weighted = Vec2::ZERO;
        let mut counts = [0usize; Archetype::ALL.len()];
        for body in &self.bodies {
            stats.total_mass += body.mass();
            weighted += body.position * body.mass();
            stats.momentum += body.momentum();
            stats.kinetic_energy += body.kinetic_energy();
            counts[body.archetype as usize] += 1;
        }
        if stats.total_mass > 0.0 {
            stats.center_of_mass = weighted / stats.total_mass;
        }
        stats.archetype_counts = Archetype::ALL
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(archetype, count)| (*archetype, count))
            .collect();
        stats
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    fn push_event(&mut self, event: Event) {
        if self.events.len() == config::EVENT_LOG_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn empty_world() -> World {
        World::new(&SimConfig {
            initial_bodies: 0,
            workers: Some(2),
            ..SimConfig::default()
        })
        .unwrap()
    }

    fn seeded_world(bodies: usize, seed: u64) -> World {
        World::new(&SimConfig {
            initial_bodies: bodies,
            seed,
            workers: Some(2),
            ..SimConfig::default()
        })
        .unwrap()
    }

    fn body_at(id: u64, mass: f64, x: f64, y: f64) -> Body {
        Body::new(BodyId(id), mass, 1.0, Vec2::new(x, y)).unwrap()
    }

    mod world_new {
        use super::*;

        #[test]
        fn spawns_initial_bodies_idle() {
            let world = seeded_world(12, 7);
            assert_eq!(world.bodies().len(), 12);
            assert_eq!(world.state(), RunState::Idle);
            assert_eq!(world.iteration_count(), 0);
        }

        #[test]
        fn rejects_invalid_config() {
            let result = World::new(&SimConfig {
                height: -5.0,
                ..SimConfig::default()
            });
            assert!(matches!(result, Err(SimError::InvalidConfig(_))));
        }

        #[test]
        fn same_seed_spawns_same_bodies() {
            assert_eq!(seeded_world(20, 99).bodies(), seeded_world(20, 99).bodies());
        }
    }

    mod world_add_body {
        use super::*;

        #[test]
        fn adds_and_reserves_the_id() {
            let mut world = empty_world();
            assert_eq!(world.add_body(body_at(40, 1.0, 10.0, 10.0)).unwrap(), BodyId(40));
            assert!(world.next_body_id().unwrap() > BodyId(40));
        }

        #[test]
        fn rejects_duplicate_id() {
            let mut world = empty_world();
            world.add_body(body_at(3, 1.0, 10.0, 10.0)).unwrap();
            let err = world.add_body(body_at(3, 2.0, 50.0, 50.0)).unwrap_err();
            assert!(matches!(err, SimError::DuplicateBody(BodyId(3))));
            assert_eq!(world.bodies().len(), 1);
        }

        #[test]
        fn duplicate_check_follows_merges() {
            let mut world = empty_world();
            world.add_body(body_at(1, 10.0, 100.0, 100.0)).unwrap();
            world.add_body(body_at(2, 5.0, 101.0, 100.0)).unwrap();
            world.start();
            world.step(0.016).unwrap();
            let merged = world.bodies()[0].id();

            let err = world.add_body(body_at(merged.0, 1.0, 300.0, 300.0)).unwrap_err();
            assert!(matches!(err, SimError::DuplicateBody(id) if id == merged));
            assert!(world.body(BodyId(1)).is_none());
            world.add_body(body_at(1, 1.0, 500.0, 300.0)).unwrap();
            assert_eq!(world.bodies().len(), 2);
        }

        #[test]
        fn duplicate_check_is_cleared_by_reset() {
            let mut world = empty_world();
            world.add_body(body_at(1, 1.0, 10.0, 10.0)).unwrap();
            world.reset(0, ArchetypePolicy::Weighted).unwrap();
            assert_eq!(world.add_body(body_at(1, 1.0, 10.0, 10.0)).unwrap(), BodyId(1));
        }

        #[test]
        fn largest_id_is_accepted_but_exhausts_spawning() {
            let mut world = empty_world();
            world.add_body(body_at(u64::MAX, 1.0, 10.0, 10.0)).unwrap();
            assert!(matches!(world.spawn(Archetype::Moon), Err(SimError::IdsExhausted)));
            assert!(matches!(world.next_body_id(), Err(SimError::IdsExhausted)));
            assert_eq!(world.bodies().len(), 1);
        }

        #[test]
        fn spawned_ids_never_collide_with_added_ones() {
            let mut world = empty_world();
            world.add_body(body_at(5, 1.0, 10.0, 10.0)).unwrap();
            let id = world.spawn(Archetype::Moon).unwrap();
            assert!(id > BodyId(5));
        }
    }

    mod world_lifecycle {
        use super::*;

        #[test]
        fn step_is_a_no_op_while_idle() {
            let mut world = seeded_world(5, 1);
            let before = world.bodies().to_vec();
            assert_eq!(world.step(1.0).unwrap(), None);
            assert_eq!(world.bodies(), before.as_slice());
            assert_eq!(world.iteration_count(), 0);
        }

        #[test]
        fn start_and_stop_toggle_state_and_log_events() {
            let mut world = seeded_world(3, 1);
            world.start();
            world.start();
            world.stop();
            assert!(!world.is_running());
            let events = world.drain_events();
            assert_eq!(
                events,
                vec![Event::Started { bodies: 3 }, Event::Stopped { iteration: 0 }]
            );
            assert!(world.drain_events().is_empty());
        }

        #[test]
        fn reset_repopulates_and_zeroes_counters() {
            let mut world = empty_world();
            world.add_body(body_at(1, 10.0, 100.0, 100.0)).unwrap();
            world.add_body(body_at(2, 5.0, 101.0, 100.0)).unwrap();
            world.start();
            world.step(0.016).unwrap();
            assert_eq!(world.collision_count(), 1);

            world
                .reset(6, ArchetypePolicy::Only(Archetype::Asteroid))
                .unwrap();
            assert_eq!(world.bodies().len(), 6);
            assert_eq!(world.collision_count(), 0);
            assert_eq!(world.iteration_count(), 0);
            assert!(world.is_running());
            assert!(world.bodies().iter().all(|b| b.archetype == Archetype::Asteroid));
            assert!(world.bodies().iter().all(|b| b.id() > BodyId(3)));
        }

        #[test]
        fn event_log_keeps_only_newest() {
            let mut world = empty_world();
            for _ in 0..(config::EVENT_LOG_CAPACITY + 5) {
                world.start();
                world.stop();
            }
            let events = world.drain_events();
            assert_eq!(events.len(), config::EVENT_LOG_CAPACITY);
            assert_eq!(events.last(), Some(&Event::Stopped { iteration: 0 }));
        }
    }

    mod world_step {
        use super::*;

        #[test]
        fn runs_all_phases_and_reports() {
            let mut world = empty_world();
            world.add_body(body_at(1, 10.0, 100.0, 100.0)).unwrap();
            world.add_body(body_at(2, 10.0, 300.0, 100.0)).unwrap();
            world.start();
            let report = world.step(1.0).unwrap().unwrap();
            assert_eq!(report.iteration, 1);
            assert_eq!(report.gravity_mode, Some(ExecutionMode::Sequential));
            assert_eq!(report.position_mode, ExecutionMode::Sequential);
            assert_eq!(report.collision_strategy, Some(CollisionStrategy::BruteForce));
            assert_eq!(report.merges, 0);
            assert_eq!(world.last_report(), Some(&report));
            // the two bodies moved towards each other
            assert!(world.bodies()[0].position.x > 100.0);
            assert!(world.bodies()[1].position.x < 300.0);
        }

        #[test]
        fn single_body_only_integrates() {
            let mut world = empty_world();
            world
                .add_body(body_at(1, 1.0, 100.0, 100.0).with_velocity(Vec2::new(1.0, 0.0)))
                .unwrap();
            world.start();
            let report = world.step(1.0).unwrap().unwrap();
            assert_eq!(report.gravity_mode, None);
            assert_eq!(report.collision_strategy, None);
            assert_eq!(world.bodies()[0].position, Vec2::new(101.0, 100.0));
        }

        #[test]
        fn merges_are_counted_and_logged() {
            let mut world = empty_world();
            world.add_body(body_at(1, 10.0, 100.0, 100.0)).unwrap();
            world.add_body(body_at(2, 5.0, 101.0, 100.0)).unwrap();
            world.start();
            world.drain_events();
            let report = world.step(0.016).unwrap().unwrap();
            assert_eq!(report.merges, 1);
            assert_eq!(world.collision_count(), 1);
            let merged = world.bodies()[0].id();
            assert_eq!(
                world.drain_events(),
                vec![Event::Merged { a: BodyId(1), b: BodyId(2), into: merged }]
            );
            assert_relative_eq!(world.bodies()[0].mass(), 15.0);
        }

        #[test]
        fn milestone_every_hundred_iterations() {
            let mut world = empty_world();
            world.add_body(body_at(1, 1.0, 100.0, 100.0)).unwrap();
            world.start();
            world.drain_events();
            for _ in 0..config::MILESTONE_INTERVAL {
                world.step(0.016).unwrap();
            }
            assert_eq!(
                world.drain_events(),
                vec![Event::Milestone { iteration: config::MILESTONE_INTERVAL, bodies: 1 }]
            );
        }

        #[test]
        fn grid_runs_over_huge_bounds() {
            let mut world = World::new(&SimConfig {
                width: 1.0e12,
                height: 1.0e12,
                initial_bodies: config::GRID_MIN_BODIES + 10,
                workers: Some(2),
                ..SimConfig::default()
            })
            .unwrap();
            world.start();
            let report = world.step(0.016).unwrap().unwrap();
            assert_eq!(report.collision_strategy, Some(CollisionStrategy::UniformGrid));
            assert_eq!(report.bodies_before, config::GRID_MIN_BODIES + 10);
        }

        #[test]
        fn empty_world_steps_leave_counters_at_zero() {
            let mut world = empty_world();
            world.start();
            for _ in 0..10 {
                assert_eq!(world.step(0.016).unwrap(), None);
            }
            assert_eq!(world.iteration_count(), 0);
            assert_eq!(world.collision_count(), 0);
        }
    }

    mod world_step_failure {
        use super::*;

        #[test]
        fn worker_panic_restores_bodies_and_stops() {
            let mut world = empty_world();
            world
                .add_body(body_at(1, 1.0, 100.0, 100.0).with_velocity(Vec2::new(3.0, 0.0)))
                .unwrap();
            world.add_body(body_at(2, 1.0, 400.0, 300.0)).unwrap();
            world.start();
            let before = world.bodies().to_vec();

            world.fault = true;
            let err = world.step(0.016).unwrap_err();
            match err {
                SimError::StepFailed { iteration, reason } => {
                    assert_eq!(iteration, 1);
                    assert!(reason.contains("injected worker fault"));
                }
                other => panic!("unexpected error {other:?}"),
            }
            assert_eq!(world.bodies(), before.as_slice());
            assert_eq!(world.state(), RunState::Idle);
            assert_eq!(world.iteration_count(), 0);
        }

        #[test]
        fn running_out_of_ids_rolls_back_the_step() {
            let mut world = empty_world();
            world.add_body(body_at(1, 10.0, 100.0, 100.0)).unwrap();
            world.add_body(body_at(2, 5.0, 101.0, 100.0)).unwrap();
            world.add_body(body_at(u64::MAX, 1.0, 700.0, 500.0)).unwrap();
            world.start();
            let before = world.bodies().to_vec();

            let err = world.step(0.016).unwrap_err();
            assert!(matches!(err, SimError::IdsExhausted));
            assert_eq!(world.bodies(), before.as_slice());
            assert_eq!(world.collision_count(), 0);
            assert_eq!(world.state(), RunState::Idle);
            assert!(world.body(BodyId(1)).is_some());
        }

        #[test]
        fn rollback_keeps_ids_registered() {
            let mut world = empty_world();
            world.add_body(body_at(1, 10.0, 100.0, 100.0)).unwrap();
            world.add_body(body_at(2, 5.0, 101.0, 100.0)).unwrap();
            world.start();
            world.fault = true;
            assert!(world.step(0.016).is_err());
            let err = world.add_body(body_at(2, 1.0, 300.0, 300.0)).unwrap_err();
            assert!(matches!(err, SimError::DuplicateBody(BodyId(2))));
        }

        #[test]
        fn world_can_resume_after_failure() {
            let mut world = seeded_world(4, 3);
            world.start();
            world.fault = true;
            assert!(world.step(0.016).is_err());
            world.start();
            assert!(world.step(0.016).unwrap().is_some());
            assert_eq!(world.iteration_count(), 1);
        }
    }

    mod world_stats {
        use super::*;

        #[test]
        fn sums_mass_momentum_and_energy() {
            let mut world = empty_world();
            world
                .add_body(body_at(1, 2.0, 0.0, 0.0).with_velocity(Vec2::new(1.0, 0.0)))
                .unwrap();
            world
                .add_body(body_at(2, 6.0, 8.0, 4.0).with_velocity(Vec2::new(0.0, -1.0)))
                .unwrap();
            let stats = world.stats();
            assert_eq!(stats.body_count, 2);
            assert_relative_eq!(stats.total_mass, 8.0);
            assert_relative_eq!(stats.center_of_mass.x, 6.0);
            assert_relative_eq!(stats.center_of_mass.y, 3.0);
            assert_eq!(stats.momentum, Vec2::new(2.0, -6.0));
            assert_relative_eq!(stats.kinetic_energy, 4.0);
        }

        #[test]
        fn counts_archetypes() {
            let mut world = empty_world();
            world.spawn(Archetype::Star).unwrap();
            world.spawn(Archetype::Star).unwrap();
            world.spawn(Archetype::Comet).unwrap();
            let stats = world.stats();
            assert_eq!(
                stats.archetype_counts,
                vec![(Archetype::Comet, 1), (Archetype::Star, 2)]
            );
        }

        #[test]
        fn empty_world_has_zero_stats() {
            assert_eq!(empty_world().stats(), WorldStats::default());
        }
    }
}

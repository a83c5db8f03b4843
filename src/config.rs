use serde::Deserialize;

use crate::{
    body::ArchetypePolicy,
    error::{Result, SimError},
};

pub const G_REAL: f64 = 6.674e-11;

pub const MIN_RADIUS: f64 = 1.0;
pub const RESTITUTION: f64 = 0.8;
pub const ROLL_FACTOR: f64 = 0.01;
pub const ROTATION_LIMIT: f64 = 0.2;
pub const ROTATION_DAMPING: f64 = 0.95;

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;
pub const DEFAULT_GRAVITY_SCALE: f64 = 5.0e10;
pub const DEFAULT_BODY_COUNT: usize = 8;
pub const DEFAULT_SEED: u64 = 0x5eed_0f_9a1a;

// spawn placement keeps bodies inside the central 80% of the bounds
pub const SPAWN_MARGIN: f64 = 0.1;

// collision strategy selection
pub const BRUTE_FORCE_MAX_BODIES: usize = 10;
pub const GRID_MIN_BODIES: usize = 50;

pub const QUADTREE_CAPACITY: usize = 4;
pub const QUADTREE_MAX_DEPTH: usize = 12;
pub const GRID_CELL_SIZE: f64 = 32.0;
pub const GRID_SHARDS: usize = 64;

// adaptive scheduling
pub const PARALLEL_MIN_BODIES: usize = 20;
pub const PARALLEL_ALWAYS_BODIES: usize = 500;
pub const POSITION_PARALLEL_MIN_BODIES: usize = 256;
pub const PARALLEL_SPEEDUP_MIN: f64 = 1.2;
pub const TIMING_HISTORY_LEN: usize = 10;
// decisions a mode's timings may go unrefreshed before it is rerun
pub const TIMING_STALE_DECISIONS: u64 = 64;

pub const EVENT_LOG_CAPACITY: usize = 25;
pub const MILESTONE_INTERVAL: u64 = 100;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub width: f64,
    pub height: f64,
    pub gravity_scale: f64,
    pub seed: u64,
    pub workers: Option<usize>,
    pub initial_bodies: usize,
    pub archetype_policy: ArchetypePolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            gravity_scale: DEFAULT_GRAVITY_SCALE,
            seed: DEFAULT_SEED,
            workers: None,
            initial_bodies: DEFAULT_BODY_COUNT,
            archetype_policy: ArchetypePolicy::Weighted,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "width must be positive and finite, got {}",
                self.width
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "height must be positive and finite, got {}",
                self.height
            )));
        }
        if !(self.gravity_scale.is_finite() && self.gravity_scale >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "gravity_scale must be non-negative and finite, got {}",
                self.gravity_scale
            )));
        }
        if self.workers == Some(0) {
            return Err(SimError::InvalidConfig(
                "workers must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

use thiserror::Error;

use crate::types::BodyId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid body: mass={mass}, density={density} (both must be positive and finite)")]
    InvalidBody { mass: f64, density: f64 },

    #[error("body {0} is already part of the world")]
    DuplicateBody(BodyId),

    #[error("no body ids left to hand out")]
    IdsExhausted,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("step failed at iteration {iteration}: {reason}")]
    StepFailed { iteration: u64, reason: String },
}

pub type Result<T> = std::result::Result<T, SimError>;

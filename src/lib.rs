pub mod body;
pub mod config;
pub mod core;
pub mod error;
pub mod spatial;
pub mod types;

pub use crate::{
    body::{Archetype, ArchetypePolicy, Body},
    config::SimConfig,
    core::{CollisionStrategy, Event, ExecutionMode, RunState, StepReport, World},
    error::{Result, SimError},
    types::{BodyId, Bounds, Vec2, WorldStats},
};

use rayon::prelude::*;
use serde::Serialize;

use crate::{
    body::Body,
    config,
    error::Result,
    spatial::{QuadTree, UniformGrid},
    types::{BodyId, IdGenerator},
};

use super::scheduler::ExecutionMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CollisionStrategy {
    BruteForce,
    QuadTree,
    UniformGrid,
}

impl CollisionStrategy {
    pub fn for_count(body_count: usize) -> Self {
        if body_count < config::BRUTE_FORCE_MAX_BODIES {
            CollisionStrategy::BruteForce
        } else if body_count < config::GRID_MIN_BODIES {
            CollisionStrategy::QuadTree
        } else {
            CollisionStrategy::UniformGrid
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Merge {
    pub a: BodyId,
    pub b: BodyId,
    pub merged: BodyId,
}

#[derive(Debug)]
pub struct CollisionResolver {
    cell_size: f64,
    capacity: usize,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self {
            cell_size: config::GRID_CELL_SIZE,
            capacity: config::QUADTREE_CAPACITY,
        }
    }
}

impl CollisionResolver {
    pub fn detect(
        &self,
        bodies: &[Body],
        strategy: CollisionStrategy,
        mode: ExecutionMode,
    ) -> Vec<(usize, usize)> {
        match strategy {
            CollisionStrategy::BruteForce => detect_brute_force(bodies),
            CollisionStrategy::QuadTree => self.detect_quadtree(bodies),
            CollisionStrategy::UniformGrid => self.detect_grid(bodies, mode),
        }
    }

    // merged bodies are appended after the survivors; on error `bodies` is
    // left as it was
    pub fn resolve(
        &self,
        bodies: &mut Vec<Body>,
        ids: &mut IdGenerator,
        strategy: CollisionStrategy,
        mode: ExecutionMode,
    ) -> Result<Vec<Merge>> {
        if bodies.len() < 2 {
            return Ok(Vec::new());
        }
        let pairs = self.detect(bodies, strategy, mode);
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let mut gone = vec![false; bodies.len()];
        let mut merged_bodies = Vec::with_capacity(pairs.len());
        let mut merges = Vec::with_capacity(pairs.len());
        for (i, j) in pairs {
            let id = ids.next_id()?;
            let merged = Body::merge(&bodies[i], &bodies[j], id);
            log::trace!("merged {} and {} into {}", bodies[i].id(), bodies[j].id(), id);
            merges.push(Merge {
                a: bodies[i].id(),
                b: bodies[j].id(),
                merged: id,
            });
            gone[i] = true;
            gone[j] = true;
            merged_bodies.push(merged);
        }

        let mut index = 0;
        bodies.retain(|_| {
            let keep = !gone[index];
            index += 1;
            keep
        });
        bodies.extend(merged_bodies);
        Ok(merges)
    }

    fn detect_quadtree(&self, bodies: &[Body]) -> Vec<(usize, usize)> {
        let tree = QuadTree::build(bodies, self.capacity);
        let mut consumed = vec![false; bodies.len()];
        let mut pairs = Vec::new();
        for i in 0..bodies.len() {
            if consumed[i] {
                continue;
            }
            let partner = tree
                .query_candidates(i, &bodies[i])
                .into_iter()
                .find(|&j| !consumed[j] && bodies[i].overlaps(&bodies[j]));
            if let Some(j) = partner {
                consumed[i] = true;
                consumed[j] = true;
                pairs.push((i.min(j), i.max(j)));
            }
        }
        pairs
    }

    fn detect_grid(&self, bodies: &[Body], mode: ExecutionMode) -> Vec<(usize, usize)> {
        let parallel = mode == ExecutionMode::Parallel;
        let grid = UniformGrid::build(self.cell_size, bodies, parallel);
        let overlapping = |i: usize| {
            grid.neighbors(i, &bodies[i])
                .into_iter()
                .filter(move |&j| j > i && bodies[i].overlaps(&bodies[j]))
                .map(move |j| (i, j))
        };
        let mut candidates: Vec<(usize, usize)> = if parallel {
            (0..bodies.len())
                .into_par_iter()
                .flat_map_iter(overlapping)
                .collect()
        } else {
            (0..bodies.len()).flat_map(overlapping).collect()
        };
        candidates.sort_unstable();
        select_disjoint(candidates, bodies.len())
    }
}

fn detect_brute_force(bodies: &[Body]) -> Vec<(usize, usize)> {
    let mut consumed = vec![false; bodies.len()];
    let mut pairs = Vec::new();
    for i in 0..bodies.len() {
        if consumed[i] {
            continue;
        }
        for j in (i + 1)..bodies.len() {
            if !consumed[j] && bodies[i].overlaps(&bodies[j]) {
                consumed[i] = true;
                consumed[j] = true;
                pairs.push((i, j));
                break;
            }
        }
    }
    pairs
}

// keeps the first sorted pair for each body
fn select_disjoint(candidates: Vec<(usize, usize)>, len: usize) -> Vec<(usize, usize)> {
    let mut consumed = vec![false; len];
    candidates
        .into_iter()
        .filter(|&(i, j)| {
            if consumed[i] || consumed[j] {
                return false;
            }
            consumed[i] = true;
            consumed[j] = true;
            true
        })
        .collect()
}

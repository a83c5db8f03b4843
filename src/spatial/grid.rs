use std::{collections::HashMap, ops::RangeInclusive};

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::{body::Body, config, types::Vec2};

type CellKey = (i64, i64);

#[derive(Debug)]
pub struct UniformGrid {
    cell_size: f64,
    shards: Vec<Mutex<HashMap<CellKey, Vec<usize>>>>,
}

impl UniformGrid {
    pub fn new(cell_size: f64) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be positive and finite"
        );
        let shards = (0..config::GRID_SHARDS)
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self { cell_size, shards }
    }

    // cells are widened to the largest diameter so no disc spans more than
    // two cells per axis
    pub fn build(cell_size: f64, bodies: &[Body], parallel: bool) -> Self {
        let widest = bodies.iter().map(|b| 2.0 * b.radius()).fold(0.0, f64::max);
        let grid = Self::new(cell_size.max(widest));
        if parallel {
            bodies
                .par_iter()
                .enumerate()
                .for_each(|(index, body)| grid.insert(index, body));
        } else {
            for (index, body) in bodies.iter().enumerate() {
                grid.insert(index, body);
            }
        }
        grid
    }

    pub fn insert(&self, index: usize, body: &Body) {
        let (xs, ys) = self.cell_span(body.position, body.radius());
        for cy in ys {
            for cx in xs.clone() {
                let key = (cx, cy);
                self.shard(key).lock().entry(key).or_default().push(index);
            }
        }
    }

    pub fn neighbors(&self, index: usize, body: &Body) -> Vec<usize> {
        let mut out = Vec::new();
        let (xs, ys) = self.cell_span(body.position, body.radius());
        for cy in ys {
            for cx in xs.clone() {
                let key = (cx, cy);
                if let Some(cell) = self.shard(key).lock().get(&key) {
                    out.extend_from_slice(cell);
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out.retain(|&other| other != index);
        out
    }

    fn shard(&self, (cx, cy): CellKey) -> &Mutex<HashMap<CellKey, Vec<usize>>> {
        let mixed = (cx as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ (cy as u64).wrapping_mul(0xc2b2_ae3d_27d4_eb4f);
        &self.shards[(mixed >> 32) as usize % self.shards.len()]
    }

    fn cell_span(&self, center: Vec2, radius: f64) -> (RangeInclusive<i64>, RangeInclusive<i64>) {
        let xs = self.cell_key(center.x - radius)..=self.cell_key(center.x + radius);
        let ys = self.cell_key(center.y - radius)..=self.cell_key(center.y + radius);
        (xs, ys)
    }

    // float to int casts saturate, so far-off positions share the edge cells
    fn cell_key(&self, v: f64) -> i64 {
        (v / self.cell_size).floor() as i64
    }
}

#[cfg(test)]
impl UniformGrid {
    fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn occupancy(&self, cx: i64, cy: i64) -> usize {
        self.shard((cx, cy))
            .lock()
            .get(&(cx, cy))
            .map_or(0, Vec::len)
    }

    fn occupied_cells(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }
}

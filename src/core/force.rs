use std::ops::Range;

use rayon::prelude::*;

use crate::{
    body::{Body, gravity_impulse},
    types::Vec2,
};

use super::scheduler::ExecutionMode;

// parallel chunks sum into private buffers so no two workers write the same body
#[derive(Debug, Default)]
pub struct ForceField {
    processed: Vec<bool>,
    matrix_len: usize,
}

impl ForceField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(
        &mut self,
        bodies: &mut [Body],
        scale: f64,
        dt: f64,
        mode: ExecutionMode,
        workers: usize,
    ) {
        if bodies.len() < 2 {
            return;
        }
        match mode {
            ExecutionMode::Sequential => self.apply_sequential(bodies, scale, dt),
            ExecutionMode::Parallel => apply_parallel(bodies, scale, dt, workers),
        }
    }

    fn apply_sequential(&mut self, bodies: &mut [Body], scale: f64, dt: f64) {
        let n = bodies.len();
        if self.matrix_len != n {
            log::trace!("resizing processed-pair matrix {} -> {}", self.matrix_len, n);
            self.processed = vec![false; n * n];
            self.matrix_len = n;
        } else {
            self.processed.fill(false);
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let slot = i * n + j;
                if self.processed[slot] {
                    continue;
                }
                self.processed[slot] = true;
                let (left, right) = bodies.split_at_mut(j);
                left[i].apply_gravity(&mut right[0], scale, dt);
            }
        }
    }
}

fn apply_parallel(bodies: &mut [Body], scale: f64, dt: f64, workers: usize) {
    let n = bodies.len();
    // a few chunks per worker so the pool can even out slow ones
    let ranges = partition_pairs(n, workers.max(1) * 4);
    let view: &[Body] = bodies;

    let partials: Vec<Vec<Vec2>> = ranges
        .into_par_iter()
        .map(|range| {
            let mut local = vec![Vec2::ZERO; n];
            for i in range {
                for j in (i + 1)..n {
                    if let Some((dv_i, dv_j)) = gravity_impulse(&view[i], &view[j], scale, dt) {
                        local[i] += dv_i;
                        local[j] += dv_j;
                    }
                }
            }
            local
        })
        .collect();

    for partial in partials {
        for (body, dv) in bodies.iter_mut().zip(partial) {
            body.velocity += dv;
        }
    }
}

pub fn partition_pairs(n: usize, parts: usize) -> Vec<Range<usize>> {
    if n == 0 {
        return Vec::new();
    }
    let total = n * (n - 1) / 2;
    let target = total.div_ceil(parts.max(1)).max(1);

    let mut ranges = Vec::new();
    let mut start = 0;
    let mut acc = 0;
    for i in 0..n {
        acc += n - 1 - i;
        if acc >= target {
            ranges.push(start..i + 1);
            start = i + 1;
            acc = 0;
        }
    }
    if start < n {
        ranges.push(start..n);
    }
    ranges
}

#[cfg(test)]
impl ForceField {
    fn matrix_len(&self) -> usize {
        self.matrix_len
    }
}

mod grid;
mod quadtree;

pub use grid::UniformGrid;
pub use quadtree::QuadTree;

use crate::{body::Body, types::Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    // strict: a disc touching an edge is not inside
    pub fn contains_circle(&self, center: Vec2, radius: f64) -> bool {
        center.x - radius > self.min.x
            && center.x + radius < self.max.x
            && center.y - radius > self.min.y
            && center.y + radius < self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    // NW, NE, SW, SE with y growing downwards
    pub fn quadrants(&self) -> [Rect; 4] {
        let mid = self.center();
        [
            Rect::new(self.min, mid),
            Rect::new(Vec2::new(mid.x, self.min.y), Vec2::new(self.max.x, mid.y)),
            Rect::new(Vec2::new(self.min.x, mid.y), Vec2::new(mid.x, self.max.y)),
            Rect::new(mid, self.max),
        ]
    }

    pub fn enclosing(bodies: &[Body], pad: f64) -> Rect {
        let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for body in bodies.iter().filter(|b| b.position.is_finite()) {
            let r = body.radius();
            min.x = min.x.min(body.position.x - r);
            min.y = min.y.min(body.position.y - r);
            max.x = max.x.max(body.position.x + r);
            max.y = max.y.max(body.position.y + r);
        }
        if !(min.is_finite() && max.is_finite()) {
            return Rect::new(Vec2::ZERO, Vec2::ZERO);
        }
        Rect::new(min - Vec2::new(pad, pad), max + Vec2::new(pad, pad))
    }
}

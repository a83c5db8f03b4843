use crate::{body::Body, config, types::Vec2};

use super::Rect;

#[derive(Clone, Copy, Debug)]
struct Entry {
    index: usize,
    center: Vec2,
    radius: f64,
}

// a disc straddling a split line stays on the node that contains it
#[derive(Debug)]
pub struct QuadTree {
    bounds: Rect,
    capacity: usize,
    depth: usize,
    items: Vec<Entry>,
    children: Option<Box<[QuadTree; 4]>>,
}

impl QuadTree {
    pub fn new(bounds: Rect, capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be at least 1");
        Self::with_depth(bounds, capacity, 0)
    }

    fn with_depth(bounds: Rect, capacity: usize, depth: usize) -> Self {
        Self {
            bounds,
            capacity,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    pub fn build(bodies: &[Body], capacity: usize) -> Self {
        let mut tree = Self::new(Rect::enclosing(bodies, 1.0), capacity);
        for (index, body) in bodies.iter().enumerate() {
            if !tree.insert(index, body) {
                log::debug!("body {} left out of quadtree (non-finite position)", body.id());
            }
        }
        tree
    }

    pub fn insert(&mut self, index: usize, body: &Body) -> bool {
        self.insert_entry(Entry {
            index,
            center: body.position,
            radius: body.radius(),
        })
    }

    fn insert_entry(&mut self, entry: Entry) -> bool {
        if !self.bounds.contains_circle(entry.center, entry.radius) {
            return false;
        }
        if self.children.is_none() {
            if self.items.len() < self.capacity || self.depth >= config::QUADTREE_MAX_DEPTH {
                self.items.push(entry);
                return true;
            }
            self.subdivide();
        }
        if !self.push_down(entry) {
            self.items.push(entry);
        }
        true
    }

    fn subdivide(&mut self) {
        let depth = self.depth + 1;
        let children = self
            .bounds
            .quadrants()
            .map(|quadrant| QuadTree::with_depth(quadrant, self.capacity, depth));
        self.children = Some(Box::new(children));

        for entry in std::mem::take(&mut self.items) {
            if !self.push_down(entry) {
                self.items.push(entry);
            }
        }
    }

    fn push_down(&mut self, entry: Entry) -> bool {
        match self.children.as_mut() {
            Some(children) => children.iter_mut().any(|child| child.insert_entry(entry)),
            None => false,
        }
    }

    pub fn query_candidates(&self, index: usize, body: &Body) -> Vec<usize> {
        let mut out = Vec::new();
        if self.bounds.contains_circle(body.position, body.radius()) {
            self.query_into(body.position, body.radius(), &mut out);
        } else {
            self.collect_all(&mut out);
        }
        out.sort_unstable();
        out.dedup();
        out.retain(|&other| other != index);
        out
    }

    fn query_into(&self, center: Vec2, radius: f64, out: &mut Vec<usize>) {
        out.extend(self.items.iter().map(|entry| entry.index));
        let Some(children) = self.children.as_ref() else {
            return;
        };
        match children
            .iter()
            .find(|child| child.bounds.contains_circle(center, radius))
        {
            Some(child) => child.query_into(center, radius, out),
            None => {
                for child in children.iter() {
                    child.collect_all(out);
                }
            }
        }
    }

    fn collect_all(&self, out: &mut Vec<usize>) {
        out.extend(self.items.iter().map(|entry| entry.index));
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.collect_all(out);
            }
        }
    }
}

#[cfg(test)]
impl QuadTree {
    fn is_subdivided(&self) -> bool {
        self.children.is_some()
    }

    fn local_len(&self) -> usize {
        self.items.len()
    }

    fn len(&self) -> usize {
        self.items.len()
            + self
                .children
                .as_ref()
                .map_or(0, |children| children.iter().map(QuadTree::len).sum())
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

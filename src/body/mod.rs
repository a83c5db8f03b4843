mod archetype;

pub use archetype::{
    Archetype, ArchetypePolicy, ArchetypeProfile, ColorRule, PROFILES, RgbRange, TemperatureBand,
    pick_archetype, spawn_body,
};

use std::f64::consts::{PI, TAU};

use serde::Serialize;

use crate::{
    config,
    error::{Result, SimError},
    types::{BodyId, Bounds, Rgb, Vec2},
};

const DEFAULT_DENSITY: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Body {
    id: BodyId,
    pub name: String,
    pub archetype: Archetype,
    mass: f64,
    density: f64,
    radius: f64,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation_angle: f64,
    pub rotation_speed: f64,
    pub brightness: f64,
    pub pulse: f64,
    pub temperature: f64,
    pub luminous: bool,
    pub color: Rgb,
}

fn valid_scalar(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn derive_radius(mass: f64, density: f64) -> f64 {
    let volume = mass / density;
    let radius = (3.0 * volume / (4.0 * PI)).cbrt();
    if radius.is_finite() {
        radius.max(config::MIN_RADIUS)
    } else {
        config::MIN_RADIUS
    }
}

pub(crate) fn gravity_impulse(a: &Body, b: &Body, scale: f64, dt: f64) -> Option<(Vec2, Vec2)> {
    let delta = b.position - a.position;
    let dist_sq = delta.length_sq();
    let reach = a.radius + b.radius;
    // overlapping pairs belong to the collision phase
    if dist_sq < reach * reach || dist_sq <= f64::EPSILON {
        return None;
    }

    let force = config::G_REAL * scale * a.mass * b.mass / dist_sq;
    let dir = delta / dist_sq.sqrt();
    let dv_a = dir * (force / a.mass * dt);
    let dv_b = -dir * (force / b.mass * dt);
    if dv_a.is_finite() && dv_b.is_finite() {
        Some((dv_a, dv_b))
    } else {
        None
    }
}

impl Body {
    pub fn new(id: BodyId, mass: f64, density: f64, position: Vec2) -> Result<Self> {
        if !valid_scalar(mass) || !valid_scalar(density) {
            return Err(SimError::InvalidBody { mass, density });
        }
        let archetype = Archetype::classify(mass);
        Ok(Self {
            id,
            name: format!("Body{}", id.0),
            archetype,
            mass,
            density,
            radius: derive_radius(mass, density),
            position,
            velocity: Vec2::ZERO,
            rotation_angle: 0.0,
            rotation_speed: 0.0,
            brightness: 1.0,
            pulse: 0.0,
            temperature: 0.0,
            luminous: archetype.is_luminous(),
            color: Rgb::WHITE,
        })
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_rotation(mut self, speed: f64) -> Self {
        self.rotation_speed = speed;
        self
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_mass_density(&mut self, mass: f64, density: f64) -> Result<()> {
        if !valid_scalar(mass) || !valid_scalar(density) {
            return Err(SimError::InvalidBody { mass, density });
        }
        self.mass = mass;
        self.density = density;
        self.radius = derive_radius(mass, density);
        Ok(())
    }

    pub fn momentum(&self) -> Vec2 {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_sq()
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        let reach = self.radius + other.radius;
        self.position.distance_sq(other.position) <= reach * reach
    }

    pub fn apply_gravity(&mut self, other: &mut Body, scale: f64, dt: f64) {
        if let Some((dv_self, dv_other)) = gravity_impulse(self, other, scale, dt) {
            self.velocity += dv_self;
            other.velocity += dv_other;
        }
    }

    pub fn integrate_position(&mut self, bounds: Bounds) {
        self.position += self.velocity;

        self.rotation_angle = (self.rotation_angle + self.rotation_speed).rem_euclid(TAU);
        if self.luminous && self.pulse > 0.0 {
            self.brightness = 0.85 + 0.15 * (self.rotation_angle * 5.0 + self.pulse * 100.0).sin();
        }

        let (min_x, max_x) = axis_limits(self.radius, bounds.width);
        if self.position.x < min_x {
            self.position.x = min_x;
            self.velocity.x = -self.velocity.x * config::RESTITUTION;
            self.rotation_speed += self.velocity.x * config::ROLL_FACTOR;
        } else if self.position.x > max_x {
            self.position.x = max_x;
            self.velocity.x = -self.velocity.x * config::RESTITUTION;
            self.rotation_speed -= self.velocity.x * config::ROLL_FACTOR;
        }

        let (min_y, max_y) = axis_limits(self.radius, bounds.height);
        if self.position.y < min_y {
            self.position.y = min_y;
            self.velocity.y = -self.velocity.y * config::RESTITUTION;
            self.rotation_speed += self.velocity.y * config::ROLL_FACTOR;
        } else if self.position.y > max_y {
            self.position.y = max_y;
            self.velocity.y = -self.velocity.y * config::RESTITUTION;
            self.rotation_speed -= self.velocity.y * config::ROLL_FACTOR;
        }

        if self.rotation_speed.abs() > config::ROTATION_LIMIT {
            self.rotation_speed *= config::ROTATION_DAMPING;
        }
    }

    // mass, momentum and spin angular momentum (m r² ω) are conserved
    pub fn merge(a: &Body, b: &Body, id: BodyId) -> Body {
        let mass = a.mass + b.mass;
        let density = (a.density * a.mass + b.density * b.mass) / mass;
        let position = (a.position * a.mass + b.position * b.mass) / mass;
        let velocity = (a.momentum() + b.momentum()) / mass;
        let spin = a.mass * a.radius * a.radius * a.rotation_speed
            + b.mass * b.radius * b.radius * b.rotation_speed;
        let temperature = (a.temperature * a.mass + b.temperature * b.mass) / mass;

        let archetype = Archetype::classify(mass);
        let mut merged = Body {
            id,
            name: format!("Mrg{}", id.0),
            archetype,
            mass,
            density,
            radius: derive_radius(mass, density),
            position,
            velocity,
            rotation_angle: (a.rotation_angle + b.rotation_angle) * 0.5,
            rotation_speed: 0.0,
            brightness: 1.0,
            pulse: 0.0,
            temperature,
            luminous: archetype.is_luminous(),
            color: a.color.mix(b.color, a.mass, b.mass),
        };
        let radius_sq = merged.radius * merged.radius;
        if radius_sq > 0.0 {
            merged.rotation_speed = spin / (merged.mass * radius_sq);
        }

        let fallback = if a.position.is_finite() { a.position } else { b.position };
        if merged.sanitize(fallback) {
            log::warn!(
                "merge of {} and {} produced non-finite state, reset to defaults",
                a.id,
                b.id
            );
        }
        merged
    }

    fn sanitize(&mut self, fallback_position: Vec2) -> bool {
        let mut touched = false;
        if !valid_scalar(self.mass) {
            self.mass = 1.0;
            touched = true;
        }
        if !valid_scalar(self.density) {
            self.density = DEFAULT_DENSITY;
            touched = true;
        }
        let radius = derive_radius(self.mass, self.density);
        if radius != self.radius {
            touched |= !self.radius.is_finite();
            self.radius = radius;
        }
        if !self.position.is_finite() {
            self.position = if fallback_position.is_finite() {
                fallback_position
            } else {
                Vec2::ZERO
            };
            touched = true;
        }
        if !self.velocity.is_finite() {
            self.velocity = Vec2::ZERO;
            touched = true;
        }
        if !self.rotation_speed.is_finite() {
            self.rotation_speed = 0.0;
            touched = true;
        }
        if !self.rotation_angle.is_finite() {
            self.rotation_angle = 0.0;
            touched = true;
        }
        if !self.temperature.is_finite() {
            self.temperature = 0.0;
            touched = true;
        }
        if touched {
            self.archetype = Archetype::classify(self.mass);
            self.luminous = self.archetype.is_luminous();
        }
        touched
    }
}

fn axis_limits(radius: f64, extent: f64) -> (f64, f64) {
    let lo = radius;
    let hi = extent - radius;
    if hi < lo {
        let mid = extent * 0.5;
        (mid, mid)
    } else {
        (lo, hi)
    }
}

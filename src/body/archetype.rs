use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    config,
    error::Result,
    types::{Bounds, IdGenerator, Rgb, Vec2},
};

use super::Body;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    Asteroid,
    Comet,
    Moon,
    RockyPlanet,
    GasGiant,
    IceGiant,
    WhiteDwarf,
    Star,
}

impl Archetype {
    pub const ALL: [Archetype; 8] = [
        Archetype::Asteroid,
        Archetype::Comet,
        Archetype::Moon,
        Archetype::RockyPlanet,
        Archetype::GasGiant,
        Archetype::IceGiant,
        Archetype::WhiteDwarf,
        Archetype::Star,
    ];

    pub fn classify(mass: f64) -> Archetype {
        match mass {
            m if m < 4.0 => Archetype::Asteroid,
            m if m < 12.0 => Archetype::Moon,
            m if m < 30.0 => Archetype::RockyPlanet,
            m if m < 85.0 => Archetype::GasGiant,
            _ => Archetype::Star,
        }
    }

    pub fn is_luminous(self) -> bool {
        matches!(self, Archetype::Star | Archetype::WhiteDwarf)
    }

    pub fn profile(self) -> &'static ArchetypeProfile {
        // PROFILES is ordered like `Archetype::ALL`
        &PROFILES[self as usize]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchetypePolicy {
    #[default]
    Weighted,
    Uniform,
    Only(Archetype),
}

#[derive(Clone, Copy, Debug)]
pub struct RgbRange {
    pub r: (u8, u8),
    pub g: (u8, u8),
    pub b: (u8, u8),
}

impl RgbRange {
    const fn new(r: (u8, u8), g: (u8, u8), b: (u8, u8)) -> Self {
        Self { r, g, b }
    }

    const fn fixed(color: Rgb) -> Self {
        Self::new((color.r, color.r), (color.g, color.g), (color.b, color.b))
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgb {
        Rgb::new(
            rng.gen_range(self.r.0..=self.r.1),
            rng.gen_range(self.g.0..=self.g.1),
            rng.gen_range(self.b.0..=self.b.1),
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TemperatureBand {
    pub temperature: (f64, f64),
    pub color: RgbRange,
}

#[derive(Clone, Copy, Debug)]
pub enum ColorRule {
    Palette(&'static [RgbRange]),
    Temperature {
        bands: &'static [TemperatureBand],
        fallback: RgbRange,
    },
}

impl ColorRule {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R, temperature: f64) -> Rgb {
        match self {
            ColorRule::Palette(ranges) => {
                if ranges.is_empty() {
                    return Rgb::WHITE;
                }
                ranges[rng.gen_range(0..ranges.len())].sample(rng)
            }
            ColorRule::Temperature { bands, fallback } => bands
                .iter()
                .find(|band| {
                    temperature > band.temperature.0 && temperature <= band.temperature.1
                })
                .map(|band| band.color)
                .unwrap_or(*fallback)
                .sample(rng),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ArchetypeProfile {
    pub archetype: Archetype,
    pub weight: f64,
    pub name_prefix: &'static str,
    pub mass: (f64, f64),
    pub density: (f64, f64),
    pub temperature: (f64, f64),
    pub rotation_speed: (f64, f64),
    pub brightness: (f64, f64),
    pub pulse: (f64, f64),
    pub color: ColorRule,
}

const ROCKY_BANDS: [TemperatureBand; 2] = [
    TemperatureBand {
        temperature: (400.0, f64::INFINITY),
        color: RgbRange::new((180, 230), (80, 130), (50, 100)),
    },
    TemperatureBand {
        temperature: (270.0, 320.0),
        color: RgbRange::new((80, 140), (120, 180), (200, 255)),
    },
];

const STAR_BANDS: [TemperatureBand; 4] = [
    TemperatureBand {
        temperature: (f64::NEG_INFINITY, 3500.0),
        color: RgbRange::new((200, 255), (100, 150), (80, 120)),
    },
    TemperatureBand {
        temperature: (3500.0, 5000.0),
        color: RgbRange::new((220, 255), (160, 200), (100, 140)),
    },
    TemperatureBand {
        temperature: (5000.0, 6500.0),
        color: RgbRange::new((240, 255), (230, 255), (180, 220)),
    },
    TemperatureBand {
        temperature: (6500.0, 8500.0),
        color: RgbRange::new((240, 255), (245, 255), (230, 255)),
    },
];

const WHITE_DWARF_BANDS: [TemperatureBand; 1] = [TemperatureBand {
    temperature: (20000.0, f64::INFINITY),
    color: RgbRange::fixed(Rgb::new(0xE0, 0xF0, 0xFF)),
}];

const ASTEROID_PALETTE: [RgbRange; 1] = [RgbRange::new((120, 180), (115, 165), (110, 160))];
const COMET_PALETTE: [RgbRange; 1] = [RgbRange::new((200, 255), (230, 255), (240, 255))];
const MOON_PALETTE: [RgbRange; 1] = [RgbRange::new((160, 210), (155, 205), (145, 195))];
const ICE_GIANT_PALETTE: [RgbRange; 1] = [RgbRange::new((100, 160), (180, 240), (220, 255))];

const GAS_GIANT_PALETTE: [RgbRange; 3] = [
    RgbRange::new((200, 240), (140, 180), (80, 120)),
    RgbRange::new((180, 220), (150, 190), (120, 160)),
    RgbRange::new((220, 255), (180, 220), (100, 140)),
];

pub static PROFILES: [ArchetypeProfile; 8] = [
    ArchetypeProfile {
        archetype: Archetype::Asteroid,
        weight: 0.30,
        name_prefix: "Ast",
        mass: (0.5, 3.0),
        density: (2.0, 4.5),
        temperature: (200.0, 300.0),
        rotation_speed: (0.01, 0.06),
        brightness: (1.0, 1.0),
        pulse: (0.0, 0.0),
        color: ColorRule::Palette(&ASTEROID_PALETTE),
    },
    ArchetypeProfile {
        archetype: Archetype::Comet,
        weight: 0.15,
        name_prefix: "Com",
        mass: (0.3, 2.3),
        density: (0.5, 1.3),
        temperature: (100.0, 250.0),
        rotation_speed: (0.02, 0.10),
        brightness: (1.0, 1.0),
        pulse: (0.0, 0.0),
        color: ColorRule::Palette(&COMET_PALETTE),
    },
    ArchetypeProfile {
        archetype: Archetype::Moon,
        weight: 0.10,
        name_prefix: "Moon",
        mass: (3.0, 10.0),
        density: (2.5, 4.5),
        temperature: (150.0, 350.0),
        rotation_speed: (0.005, 0.035),
        brightness: (1.0, 1.0),
        pulse: (0.0, 0.0),
        color: ColorRule::Palette(&MOON_PALETTE),
    },
    ArchetypeProfile {
        archetype: Archetype::RockyPlanet,
        weight: 0.15,
        name_prefix: "Rock",
        mass: (8.0, 25.0),
        density: (3.5, 6.5),
        temperature: (250.0, 550.0),
        rotation_speed: (0.01, 0.05),
        brightness: (1.0, 1.0),
        pulse: (0.0, 0.0),
        color: ColorRule::Temperature {
            bands: &ROCKY_BANDS,
            fallback: RgbRange::new((150, 200), (140, 190), (120, 170)),
        },
    },
    ArchetypeProfile {
        archetype: Archetype::GasGiant,
        weight: 0.10,
        name_prefix: "Gas",
        mass: (30.0, 80.0),
        density: (0.7, 1.7),
        temperature: (120.0, 220.0),
        rotation_speed: (0.04, 0.12),
        brightness: (1.0, 1.0),
        pulse: (0.0, 0.0),
        color: ColorRule::Palette(&GAS_GIANT_PALETTE),
    },
    ArchetypeProfile {
        archetype: Archetype::IceGiant,
        weight: 0.08,
        name_prefix: "Ice",
        mass: (35.0, 70.0),
        density: (1.2, 2.0),
        temperature: (50.0, 130.0),
        rotation_speed: (0.03, 0.09),
        brightness: (1.0, 1.0),
        pulse: (0.0, 0.0),
        color: ColorRule::Palette(&ICE_GIANT_PALETTE),
    },
    ArchetypeProfile {
        archetype: Archetype::WhiteDwarf,
        weight: 0.05,
        name_prefix: "WD",
        mass: (70.0, 120.0),
        density: (8.0, 16.0),
        temperature: (10000.0, 30000.0),
        rotation_speed: (0.05, 0.15),
        brightness: (1.0, 1.0),
        pulse: (0.0, 0.0),
        color: ColorRule::Temperature {
            bands: &WHITE_DWARF_BANDS,
            fallback: RgbRange::fixed(Rgb::new(0xFF, 0xF5, 0xE6)),
        },
    },
    ArchetypeProfile {
        archetype: Archetype::Star,
        weight: 0.07,
        name_prefix: "Star",
        mass: (80.0, 250.0),
        density: (1.0, 3.0),
        temperature: (2500.0, 15000.0),
        rotation_speed: (0.01, 0.03),
        brightness: (0.7, 1.0),
        pulse: (0.0, 0.01),
        color: ColorRule::Temperature {
            bands: &STAR_BANDS,
            fallback: RgbRange::new((200, 240), (220, 255), (240, 255)),
        },
    },
];

fn sample_range<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

pub fn pick_archetype<R: Rng + ?Sized>(rng: &mut R, policy: ArchetypePolicy) -> Archetype {
    match policy {
        ArchetypePolicy::Only(archetype) => archetype,
        ArchetypePolicy::Uniform => Archetype::ALL[rng.gen_range(0..Archetype::ALL.len())],
        ArchetypePolicy::Weighted => {
            let total: f64 = PROFILES.iter().map(|p| p.weight).sum();
            let mut roll = rng.gen_range(0.0..total);
            for profile in &PROFILES {
                if roll < profile.weight {
                    return profile.archetype;
                }
                roll -= profile.weight;
            }
            PROFILES[PROFILES.len() - 1].archetype
        }
    }
}

pub fn spawn_body<R: Rng + ?Sized>(
    rng: &mut R,
    ids: &mut IdGenerator,
    bounds: Bounds,
    archetype: Archetype,
) -> Result<Body> {
    let profile = archetype.profile();
    let mass = sample_range(rng, profile.mass);
    let density = sample_range(rng, profile.density);
    let temperature = sample_range(rng, profile.temperature);
    let span = 1.0 - 2.0 * config::SPAWN_MARGIN;
    let position = Vec2::new(
        (rng.gen_range(0.0..1.0) * span + config::SPAWN_MARGIN) * bounds.width,
        (rng.gen_range(0.0..1.0) * span + config::SPAWN_MARGIN) * bounds.height,
    );

    let id = ids.next_id()?;
    let mut body = Body::new(id, mass, density, position)?;
    body.name = format!("{}{}", profile.name_prefix, id.0);
    body.archetype = archetype;
    body.temperature = temperature;
    body.luminous = archetype.is_luminous();
    body.color = profile.color.sample(rng, temperature);
    body.rotation_speed = sample_range(rng, profile.rotation_speed);
    body.rotation_angle = rng.gen_range(0.0..std::f64::consts::TAU);
    body.brightness = sample_range(rng, profile.brightness);
    body.pulse = sample_range(rng, profile.pulse);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    mod archetype_table {
        use super::*;

        #[test]
        fn profiles_follow_enum_order() {
            for (index, archetype) in Archetype::ALL.iter().enumerate() {
                assert_eq!(PROFILES[index].archetype, *archetype);
            }
        }

        #[test]
        fn weights_sum_to_one() {
            let total: f64 = PROFILES.iter().map(|p| p.weight).sum();
            assert!((total - 1.0).abs() < 1e-9);
        }

        #[test]
        fn ranges_are_positive_and_ordered() {
            for profile in &PROFILES {
                assert!(profile.mass.0 > 0.0 && profile.mass.0 <= profile.mass.1);
                assert!(profile.density.0 > 0.0 && profile.density.0 <= profile.density.1);
            }
        }
    }

    mod archetype_classify {
        use super::*;

        #[test]
        fn classifies_by_mass_thresholds() {
            assert_eq!(Archetype::classify(1.0), Archetype::Asteroid);
            assert_eq!(Archetype::classify(4.0), Archetype::Moon);
            assert_eq!(Archetype::classify(15.0), Archetype::RockyPlanet);
            assert_eq!(Archetype::classify(50.0), Archetype::GasGiant);
            assert_eq!(Archetype::classify(85.0), Archetype::Star);
        }

        #[test]
        fn only_stars_and_white_dwarfs_shine() {
            let luminous: Vec<_> = Archetype::ALL.iter().filter(|a| a.is_luminous()).collect();
            assert_eq!(luminous, vec![&Archetype::WhiteDwarf, &Archetype::Star]);
        }
    }

    mod pick_archetype {
        use super::*;

        #[test]
        fn only_policy_is_fixed() {
            let mut rng = StdRng::seed_from_u64(7);
            for _ in 0..20 {
                assert_eq!(
                    pick_archetype(&mut rng, ArchetypePolicy::Only(Archetype::Comet)),
                    Archetype::Comet
                );
            }
        }

        #[test]
        fn weighted_policy_favours_asteroids() {
            let mut rng = StdRng::seed_from_u64(11);
            let draws = 4000;
            let asteroids = (0..draws)
                .filter(|_| pick_archetype(&mut rng, ArchetypePolicy::Weighted) == Archetype::Asteroid)
                .count();
            let share = asteroids as f64 / draws as f64;
            assert!((0.25..0.35).contains(&share), "asteroid share was {share}");
        }

        #[test]
        fn same_seed_gives_same_sequence() {
            let mut a = StdRng::seed_from_u64(3);
            let mut b = StdRng::seed_from_u64(3);
            for _ in 0..50 {
                assert_eq!(
                    pick_archetype(&mut a, ArchetypePolicy::Uniform),
                    pick_archetype(&mut b, ArchetypePolicy::Uniform)
                );
            }
        }
    }

    mod spawn_body {
        use super::*;

        #[test]
        fn stays_inside_profile_ranges() {
            let mut rng = StdRng::seed_from_u64(5);
            let mut ids = IdGenerator::new();
            let bounds = Bounds::new(800.0, 600.0);
            for archetype in Archetype::ALL {
                let body = spawn_body(&mut rng, &mut ids, bounds, archetype).unwrap();
                let profile = archetype.profile();
                assert!(body.mass() >= profile.mass.0 && body.mass() <= profile.mass.1);
                assert!(body.density() >= profile.density.0 && body.density() <= profile.density.1);
                assert_eq!(body.archetype, archetype);
                assert_eq!(body.luminous, archetype.is_luminous());
                assert!(body.name.starts_with(profile.name_prefix));
            }
        }

        #[test]
        fn places_bodies_in_central_region_at_rest() {
            let mut rng = StdRng::seed_from_u64(9);
            let mut ids = IdGenerator::new();
            let bounds = Bounds::new(1000.0, 500.0);
            for _ in 0..200 {
                let body = spawn_body(&mut rng, &mut ids, bounds, Archetype::Asteroid).unwrap();
                assert!(body.position.x >= 100.0 && body.position.x <= 900.0);
                assert!(body.position.y >= 50.0 && body.position.y <= 450.0);
                assert_eq!(body.velocity, Vec2::ZERO);
            }
        }

        #[test]
        fn ids_are_unique() {
            let mut rng = StdRng::seed_from_u64(1);
            let mut ids = IdGenerator::new();
            let bounds = Bounds::new(100.0, 100.0);
            let a = spawn_body(&mut rng, &mut ids, bounds, Archetype::Moon).unwrap();
            let b = spawn_body(&mut rng, &mut ids, bounds, Archetype::Moon).unwrap();
            assert_ne!(a.id(), b.id());
        }

        #[test]
        fn hot_white_dwarf_is_blue_white() {
            let color = WHITE_DWARF_BANDS[0].color;
            let mut rng = StdRng::seed_from_u64(0);
            assert_eq!(color.sample(&mut rng), Rgb::new(0xE0, 0xF0, 0xFF));
        }
    }
}

//! Procedural effect primitives: fractal bolts, fountain particles, the
//! particle budget and ribbon geometry. Pure data and math; the systems
//! layer decides when they run.

mod rng;
mod color;
mod geometry;
pub mod fractal;
mod lightning;
mod fountain;
mod particle;
mod budget;

pub use rng::Rng;
pub use color::Color;
pub use geometry::{build_strip, dash_polyline, strip_to_triangles, polyline_length, polyline_prefix, polyline_slice, EffectsVertex};
pub use lightning::{LightningBolt, LightningConfig, LightningPath, Spark};
pub use fountain::{Ballistics, FountainConfig, FountainPattern, BASE_GRAVITY, WIND_DRIFT};
pub use particle::{Particle, ParticleKind, ParticleVisual};
pub use budget::{ParticleBudget, MAX_PARTICLES};

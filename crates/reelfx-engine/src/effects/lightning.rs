//! Lightning bolts built from fractal paths, with forks and sparks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::color::Color;
use super::fractal;
use super::rng::Rng;
use crate::api::error::ConfigError;

/// Tuning for a lightning strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningConfig {
    /// Sideways push factor for the main path.
    pub displacement: f32,
    /// Subdivision depth of the main path.
    pub iterations: u32,
    pub width: f32,
    pub color: Color,
    /// Alpha lost per second.
    pub fade_speed: f32,
    /// Maximum number of forks per bolt.
    pub branch_count: u32,
    /// Probability each fork slot actually forks.
    pub branch_chance: f32,
    /// Sparks thrown from the bolt's vertices.
    pub spark_count: u32,
    /// Initial spark speed in px/s.
    pub spark_speed: f32,
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self {
            displacement: 80.0,
            iterations: 6,
            width: 3.0,
            color: Color::ELECTRIC_BLUE,
            fade_speed: 1.5,
            branch_count: 2,
            branch_chance: 0.6,
            spark_count: 12,
            spark_speed: 120.0,
        }
    }
}

impl LightningConfig {
    /// Deepest subdivision accepted; 2^10 + 1 points per path.
    pub const MAX_ITERATIONS: u32 = 10;

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_finite("lightning.displacement", self.displacement)?;
        ConfigError::check_positive("lightning.width", self.width)?;
        ConfigError::check_positive("lightning.fade_speed", self.fade_speed)?;
        ConfigError::check_finite("lightning.spark_speed", self.spark_speed)?;
        ConfigError::check_range("lightning.branch_chance", self.branch_chance, 0.0, 1.0)?;
        ConfigError::check_range(
            "lightning.iterations",
            self.iterations as f32,
            0.0,
            Self::MAX_ITERATIONS as f32,
        )
    }
}

/// A short-lived ember flung off a bolt. Stepped per frame with drag,
/// unlike fountain particles.
#[derive(Debug, Clone)]
pub struct Spark {
    pub position: Vec2,
    pub velocity: Vec2,
    pub life: f32,
    pub max_life: f32,
}

impl Spark {
    const DRAG: f32 = 0.04;

    /// Returns false once the spark has burned out.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.life -= dt;
        if self.life <= 0.0 {
            return false;
        }
        self.velocity *= (1.0 - Self::DRAG).powf(dt * 60.0);
        self.position += self.velocity * dt;
        true
    }

    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// One jagged path with fading style.
#[derive(Debug, Clone)]
pub struct LightningPath {
    pub points: Vec<Vec2>,
    pub alpha: f32,
    pub fade_speed: f32,
    pub color: Color,
    pub width: f32,
}

impl LightningPath {
    /// Fade and thin. Returns false when fully transparent.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.alpha -= self.fade_speed * dt;
        self.width *= 0.98f32.powf(dt * 60.0);
        self.alpha > 0.0
    }
}

/// A main path, its forks and sparks.
#[derive(Debug, Clone)]
pub struct LightningBolt {
    pub main: LightningPath,
    pub branches: Vec<LightningPath>,
    pub sparks: Vec<Spark>,
}

impl LightningBolt {
    pub fn strike(start: Vec2, end: Vec2, config: &LightningConfig, rng: &mut Rng) -> Self {
        let points = fractal::generate(start, end, config.displacement, config.iterations, rng);

        let mut branches = Vec::new();
        if points.len() > 2 {
            for _ in 0..config.branch_count {
                if !rng.chance(config.branch_chance) {
                    continue;
                }
                let idx = 1 + rng.next_int((points.len() - 2) as u32) as usize;
                let origin = points[idx];
                let remaining = end - origin;
                let deviation = rng.range(-30.0, 30.0).to_radians();
                let reach = remaining.length() * rng.range(0.3, 0.6);
                let dir = Vec2::from_angle(deviation).rotate(remaining.normalize_or_zero());
                let branch_end = origin + dir * reach;
                branches.push(LightningPath {
                    points: fractal::generate(
                        origin,
                        branch_end,
                        config.displacement * 0.6,
                        config.iterations.saturating_sub(1),
                        rng,
                    ),
                    alpha: 0.7,
                    fade_speed: config.fade_speed * 1.5,
                    color: config.color,
                    width: config.width * 0.5,
                });
            }
        }

        let mut sparks = Vec::with_capacity(config.spark_count as usize);
        for _ in 0..config.spark_count {
            let Some(&at) = rng.pick(&points) else { break };
            let angle = rng.next_f32() * std::f32::consts::TAU;
            let speed = config.spark_speed * rng.range(0.5, 1.0);
            let life = rng.range(0.2, 0.6);
            sparks.push(Spark {
                position: at,
                velocity: Vec2::from_angle(angle) * speed,
                life,
                max_life: life,
            });
        }

        LightningBolt {
            main: LightningPath {
                points,
                alpha: 1.0,
                fade_speed: config.fade_speed,
                color: config.color,
                width: config.width,
            },
            branches,
            sparks,
        }
    }

    /// Advance fading and sparks. Returns false once nothing is visible.
    pub fn tick(&mut self, dt: f32) -> bool {
        let main_alive = self.main.tick(dt);
        self.branches.retain_mut(|b| b.tick(dt));
        self.sparks.retain_mut(|s| s.tick(dt));
        main_alive || !self.branches.is_empty() || !self.sparks.is_empty()
    }
}

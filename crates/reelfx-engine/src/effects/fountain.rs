//! Fountain emission: velocity sampling per pattern plus closed-form
//! projectile motion. Nothing is integrated frame by frame; a particle's
//! state is a pure function of its age.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::Rng;
use crate::api::error::ConfigError;

/// Downward acceleration per unit of speed multiplier (px/s², y down).
pub const BASE_GRAVITY: f32 = 300.0;

/// Horizontal drift scale for wind (px/s² per unit of wind strength).
pub const WIND_DRIFT: f32 = 30.0;

/// Named rule for the directional spread of emitted velocities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FountainPattern {
    /// Three jets: left, straight up, right.
    #[default]
    #[serde(rename = "classic-3")]
    Classic3,
    /// Five jets fanned out.
    #[serde(rename = "fan-5")]
    Fan5,
    /// Seven narrow jets over a wide arc.
    #[serde(rename = "wide-7")]
    Wide7,
    /// One tall column.
    #[serde(rename = "single-vertical")]
    SingleVertical,
    /// Two jets at the configured left/right angles.
    #[serde(rename = "dual-side")]
    DualSide,
    /// Uniform in every direction.
    #[serde(rename = "random-burst")]
    RandomBurst,
    /// Center stream mixed with angled side streams by `center_weight`.
    #[serde(rename = "cascading")]
    Cascading,
}

impl FountainPattern {
    pub const ALL: [FountainPattern; 7] = [
        Self::Classic3,
        Self::Fan5,
        Self::Wide7,
        Self::SingleVertical,
        Self::DualSide,
        Self::RandomBurst,
        Self::Cascading,
    ];
}

/// Fountain tuning as edited in the celebration workshop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FountainConfig {
    pub pattern: FountainPattern,
    pub spread_multiplier: f32,
    pub speed_multiplier: f32,
    pub density_multiplier: f32,
    pub height_multiplier: f32,
    /// Horizontal wind; positive blows right. Zero means still air.
    pub wind_strength: f32,
    /// Left jet angle from vertical, degrees.
    pub left_angle_deg: f32,
    /// Right jet angle from vertical, degrees.
    pub right_angle_deg: f32,
    /// Probability a cascading particle joins the center stream, [0, 1].
    pub center_weight: f32,
}

impl Default for FountainConfig {
    fn default() -> Self {
        Self {
            pattern: FountainPattern::Classic3,
            spread_multiplier: 1.0,
            speed_multiplier: 1.0,
            density_multiplier: 1.0,
            height_multiplier: 1.0,
            wind_strength: 0.0,
            left_angle_deg: 30.0,
            right_angle_deg: 30.0,
            center_weight: 0.5,
        }
    }
}

impl FountainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("fountain.spread_multiplier", self.spread_multiplier),
            ("fountain.speed_multiplier", self.speed_multiplier),
            ("fountain.density_multiplier", self.density_multiplier),
            ("fountain.height_multiplier", self.height_multiplier),
        ] {
            ConfigError::check_positive(field, value)?;
        }
        for (field, value) in [
            ("fountain.wind_strength", self.wind_strength),
            ("fountain.left_angle_deg", self.left_angle_deg),
            ("fountain.right_angle_deg", self.right_angle_deg),
        ] {
            ConfigError::check_finite(field, value)?;
        }
        ConfigError::check_range("fountain.center_weight", self.center_weight, 0.0, 1.0)
    }

    /// Gravity for this fountain (px/s², positive is down).
    pub fn gravity(&self) -> f32 {
        BASE_GRAVITY * self.speed_multiplier
    }

    /// Sample one initial velocity according to the pattern.
    pub fn spawn(&self, rng: &mut Rng) -> Vec2 {
        let s = self.spread_multiplier;
        let m = self.speed_multiplier;
        let h = self.height_multiplier;

        match self.pattern {
            FountainPattern::Classic3 => {
                let dir = jet(rng, 1);
                Vec2::new(dir * rng.range(50.0, 100.0) * s * m, rng.range(-200.0, -120.0) * h * m)
            }
            FountainPattern::Fan5 => {
                let dir = jet(rng, 2);
                Vec2::new(dir * rng.range(30.0, 60.0) * s * m, -rng.range(130.0, 200.0) * h * m)
            }
            FountainPattern::Wide7 => {
                let dir = jet(rng, 3);
                Vec2::new(dir * rng.range(25.0, 50.0) * s * m, -rng.range(110.0, 170.0) * h * m)
            }
            FountainPattern::SingleVertical => {
                Vec2::new((rng.next_f32() - 0.5) * 20.0 * s * m, -rng.range(180.0, 280.0) * h * m)
            }
            FountainPattern::DualSide => self.side_stream(rng),
            FountainPattern::RandomBurst => {
                let theta = rng.next_f32() * std::f32::consts::TAU;
                let mag = rng.range(80.0, 200.0) * m;
                Vec2::new(theta.cos() * mag * s, theta.sin() * mag * h)
            }
            FountainPattern::Cascading => {
                if rng.chance(self.center_weight) {
                    Vec2::new((rng.next_f32() - 0.5) * 30.0 * s * m, -rng.range(160.0, 240.0) * h * m)
                } else {
                    self.side_stream(rng)
                }
            }
        }
    }

    fn side_stream(&self, rng: &mut Rng) -> Vec2 {
        let (sign, angle_deg) = if rng.next_int(2) == 0 {
            (-1.0, self.left_angle_deg)
        } else {
            (1.0, self.right_angle_deg)
        };
        let a = angle_deg.to_radians();
        let mag = rng.range(150.0, 230.0) * self.speed_multiplier;
        Vec2::new(
            sign * a.sin() * mag * self.spread_multiplier,
            -a.cos() * mag * self.height_multiplier,
        )
    }

    /// The motion constants a particle copies at emission.
    pub fn ballistics(&self) -> Ballistics {
        Ballistics {
            gravity: self.gravity(),
            wind: self.wind_strength,
        }
    }

    /// Displacement from the spawn point after `t` seconds.
    pub fn displacement(&self, velocity: Vec2, t: f32) -> Vec2 {
        self.ballistics().displacement(velocity, t)
    }
}

/// Gravity and wind frozen at emission time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ballistics {
    pub gravity: f32,
    pub wind: f32,
}

impl Ballistics {
    /// `x = vx*t + wind*30*t²`, `y = vy*t + g*t²/2`.
    pub fn displacement(&self, velocity: Vec2, t: f32) -> Vec2 {
        let t = t.max(0.0);
        Vec2::new(
            velocity.x * t + self.wind * WIND_DRIFT * t * t,
            velocity.y * t + 0.5 * self.gravity * t * t,
        )
    }
}

/// Jet index in `-half..=half`, uniformly.
fn jet(rng: &mut Rng, half: i32) -> f32 {
    (rng.next_int((half * 2 + 1) as u32) as i32 - half) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_three_unit_multipliers() {
        let cfg = FountainConfig::default();
        let mut rng = Rng::new(42);
        let mut seen = [false; 3];
        for _ in 0..2000 {
            let v = cfg.spawn(&mut rng);
            let dir = if v.x == 0.0 { 0 } else { v.x.signum() as i32 };
            seen[(dir + 1) as usize] = true;
            if dir != 0 {
                assert!((50.0..100.0).contains(&v.x.abs()), "vx = {}", v.x);
            }
            assert!((-200.0..-120.0).contains(&v.y), "vy = {}", v.y);
        }
        assert!(seen.iter().all(|s| *s), "all three jets should fire");
    }

    #[test]
    fn side_jet_speed_stays_below_upper_bound() {
        let cfg = FountainConfig::default();
        let mut rng = Rng::new(0x98726d09596994c5);
        let v = cfg.spawn(&mut rng);
        assert!(v.x != 0.0);
        assert!(v.x.abs() < 100.0, "vx = {}", v.x);
    }

    #[test]
    fn origin_at_time_zero() {
        let cfg = FountainConfig::default();
        let mut rng = Rng::new(1);
        let v = cfg.spawn(&mut rng);
        assert_eq!(cfg.displacement(v, 0.0), Vec2::ZERO);
    }

    #[test]
    fn no_wind_is_linear_in_time() {
        let cfg = FountainConfig { wind_strength: 0.0, ..Default::default() };
        let v = Vec2::new(40.0, -150.0);
        for t in [0.1f32, 0.5, 1.0, 2.5] {
            assert!((cfg.displacement(v, t).x - v.x * t).abs() < 1e-4);
        }
    }

    #[test]
    fn wind_drift_grows_super_linearly() {
        let cfg = FountainConfig { wind_strength: 0.5, ..Default::default() };
        let v = Vec2::new(-20.0, -150.0);
        for t in [0.1f32, 0.4, 1.0] {
            let x0 = cfg.displacement(v, 0.0).x;
            let x1 = cfg.displacement(v, t).x;
            let x2 = cfg.displacement(v, 2.0 * t).x;
            assert!(x2 - x1 > x1 - x0);
        }
    }

    #[test]
    fn gravity_scales_with_speed() {
        let cfg = FountainConfig { speed_multiplier: 2.0, ..Default::default() };
        assert_eq!(cfg.gravity(), 600.0);
        let d = cfg.displacement(Vec2::ZERO, 1.0);
        assert_eq!(d.y, 300.0);
    }

    #[test]
    fn every_pattern_emits_finite_velocities() {
        let mut rng = Rng::new(9);
        for pattern in FountainPattern::ALL {
            let cfg = FountainConfig { pattern, ..Default::default() };
            for _ in 0..200 {
                let v = cfg.spawn(&mut rng);
                assert!(v.is_finite(), "{:?} produced {:?}", pattern, v);
            }
        }
    }

    #[test]
    fn upward_patterns_start_upward() {
        let mut rng = Rng::new(12);
        for pattern in [
            FountainPattern::Classic3,
            FountainPattern::Fan5,
            FountainPattern::Wide7,
            FountainPattern::SingleVertical,
            FountainPattern::DualSide,
            FountainPattern::Cascading,
        ] {
            let cfg = FountainConfig { pattern, ..Default::default() };
            for _ in 0..200 {
                assert!(cfg.spawn(&mut rng).y < 0.0, "{:?}", pattern);
            }
        }
    }

    #[test]
    fn dual_side_follows_configured_angles() {
        let cfg = FountainConfig {
            pattern: FountainPattern::DualSide,
            left_angle_deg: 45.0,
            right_angle_deg: 45.0,
            ..Default::default()
        };
        let mut rng = Rng::new(4);
        for _ in 0..100 {
            let v = cfg.spawn(&mut rng);
            assert!((v.x.abs() - v.y.abs()).abs() < 1e-3);
        }
    }

    #[test]
    fn cascading_all_center_when_weight_is_one() {
        let cfg = FountainConfig {
            pattern: FountainPattern::Cascading,
            center_weight: 1.0,
            ..Default::default()
        };
        let mut rng = Rng::new(21);
        for _ in 0..200 {
            assert!(cfg.spawn(&mut rng).x.abs() <= 15.0);
        }
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert!(FountainConfig::default().validate().is_ok());
        let bad = FountainConfig { speed_multiplier: 0.0, ..Default::default() };
        assert!(bad.validate().is_err());
        let bad = FountainConfig { spread_multiplier: f32::NAN, ..Default::default() };
        assert!(bad.validate().is_err());
        let bad = FountainConfig { center_weight: 1.5, ..Default::default() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn pattern_names_round_trip_through_json() {
        let p: FountainPattern = serde_json::from_str("\"random-burst\"").unwrap();
        assert_eq!(p, FountainPattern::RandomBurst);
        assert_eq!(serde_json::to_string(&FountainPattern::Fan5).unwrap(), "\"fan-5\"");
    }
}

//! Celebration particles: coins, sparkles and friends thrown by a fountain.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::fountain::Ballistics;

/// What a particle represents; picks its fallback glyph and base count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Coin,
    Sparkle,
    Star,
    Gem,
    Confetti,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 5] = [
        Self::Coin,
        Self::Sparkle,
        Self::Star,
        Self::Gem,
        Self::Confetti,
    ];

    /// Drawn when no texture is configured for the kind.
    pub fn fallback_glyph(self) -> char {
        match self {
            Self::Coin => '🪙',
            Self::Sparkle => '✨',
            Self::Star => '⭐',
            Self::Gem => '💎',
            Self::Confetti => '🎉',
        }
    }

    /// Particles emitted at density 1.0 before any tier scaling.
    pub fn base_count(self) -> u32 {
        match self {
            Self::Coin => 40,
            Self::Sparkle => 60,
            Self::Star => 25,
            Self::Gem => 15,
            Self::Confetti => 80,
        }
    }
}

/// Texture when one is configured, otherwise a glyph.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticleVisual {
    Texture(String),
    Glyph(char),
}

/// One emitted particle. Its state is derived from its age; nothing is
/// stepped, so it never drifts from the closed-form path.
#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    /// Spawn point.
    pub origin: Vec2,
    pub velocity: Vec2,
    /// Preview clock time at which the particle appears.
    pub spawn_time: f32,
    /// Seconds over which opacity fades to zero.
    pub lifetime: f32,
    pub visual: ParticleVisual,
    pub size_multiplier: f32,
    /// Rotation speed in radians per second.
    pub spin: f32,
    pub ballistics: Ballistics,
}

impl Particle {
    /// Seconds since spawn; negative while still queued.
    pub fn age(&self, now: f32) -> f32 {
        now - self.spawn_time
    }

    pub fn is_spawned(&self, now: f32) -> bool {
        self.age(now) >= 0.0
    }

    pub fn position(&self, now: f32) -> Vec2 {
        self.origin + self.ballistics.displacement(self.velocity, self.age(now))
    }

    pub fn rotation(&self, now: f32) -> f32 {
        self.spin * self.age(now).max(0.0)
    }

    /// Linear fade from 1 at spawn to 0 at the end of the lifetime.
    pub fn opacity(&self, now: f32) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age(now).max(0.0) / self.lifetime).clamp(0.0, 1.0)
    }

    /// Terminal once fully faded; particles are never recycled.
    pub fn is_expired(&self, now: f32) -> bool {
        self.is_spawned(now) && self.opacity(now) <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(spawn_time: f32) -> Particle {
        Particle {
            kind: ParticleKind::Coin,
            origin: Vec2::new(100.0, 400.0),
            velocity: Vec2::new(60.0, -150.0),
            spawn_time,
            lifetime: 2.0,
            visual: ParticleVisual::Glyph(ParticleKind::Coin.fallback_glyph()),
            size_multiplier: 1.0,
            spin: 1.0,
            ballistics: Ballistics { gravity: 300.0, wind: 0.0 },
        }
    }

    #[test]
    fn position_at_spawn_is_origin() {
        let p = coin(1.5);
        assert_eq!(p.position(1.5), p.origin);
    }

    #[test]
    fn queued_particle_sits_at_origin() {
        let p = coin(1.0);
        assert!(!p.is_spawned(0.5));
        assert_eq!(p.position(0.5), p.origin);
        assert_eq!(p.opacity(0.5), 1.0);
        assert!(!p.is_expired(0.5));
    }

    #[test]
    fn opacity_fades_linearly_then_expires() {
        let p = coin(0.0);
        assert!((p.opacity(0.5) - 0.75).abs() < 1e-6);
        assert!((p.opacity(1.0) - 0.5).abs() < 1e-6);
        assert!(!p.is_expired(1.99));
        assert!(p.is_expired(2.0));
        assert_eq!(p.opacity(5.0), 0.0);
    }

    #[test]
    fn falls_back_under_gravity() {
        let p = coin(0.0);
        // vy*t + 150*t^2 crosses zero at t = 1.0
        let y = p.position(1.0).y;
        assert!((y - p.origin.y).abs() < 1e-3);
        assert!(p.position(1.5).y > p.origin.y);
    }

    #[test]
    fn every_kind_has_a_glyph() {
        for kind in ParticleKind::ALL {
            assert!(!kind.fallback_glyph().is_whitespace());
            assert!(kind.base_count() > 0);
        }
    }
}

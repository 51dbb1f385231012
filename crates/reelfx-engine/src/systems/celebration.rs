//! Tier celebrations: a fountain of particles, an optional title card and
//! a sound cue, all bounded by the tier's duration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::title::TitleCard;
use crate::api::error::ConfigError;
use crate::api::types::Tier;
use crate::assets::AssetRef;
use crate::effects::{Color, FountainConfig, FountainPattern, Particle, ParticleBudget, ParticleKind, ParticleVisual, Rng};
use crate::extensions::Easing;
use crate::renderer::{FrameBuffers, RenderInstance, SpriteVisual};

/// Base on-screen particle size in pixels.
pub const PARTICLE_SIZE: f32 = 24.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleTypeConfig {
    pub kind: ParticleKind,
    pub enabled: bool,
    /// Scales the kind's base count.
    pub density: f32,
    pub size_multiplier: f32,
    /// Image to draw instead of the glyph.
    pub texture: AssetRef,
}

impl ParticleTypeConfig {
    pub fn new(kind: ParticleKind, density: f32) -> Self {
        Self { kind, enabled: true, density, size_multiplier: 1.0, texture: AssetRef::None }
    }
}

impl Default for ParticleTypeConfig {
    fn default() -> Self {
        Self::new(ParticleKind::Coin, 1.0)
    }
}

/// Everything a tier celebration plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    pub tier: Tier,
    /// Seconds until every node of the celebration is removed.
    pub duration: f32,
    /// Spawns are spread over this many seconds from the trigger.
    pub emission_window: f32,
    pub fountain: FountainConfig,
    pub particles: Vec<ParticleTypeConfig>,
    pub title: Option<String>,
    pub title_color: Color,
    /// Pop-in curve of the title card.
    pub title_easing: Easing,
    pub sound: Option<u32>,
    /// Draw the outcome's winning paylines with the celebration.
    pub paylines: bool,
    pub sequential: bool,
    pub pause_between_lines: f32,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self::for_tier(Tier::Small)
    }
}

impl TierConfig {
    /// Stock settings, growing with the tier.
    pub fn for_tier(tier: Tier) -> Self {
        use ParticleKind::*;
        let (duration, window, pattern, title, kinds): (f32, f32, FountainPattern, Option<&str>, &[ParticleKind]) =
            match tier {
                Tier::Small => (2.0, 0.6, FountainPattern::Classic3, None, &[Coin, Sparkle]),
                Tier::Big => (3.5, 1.0, FountainPattern::Fan5, Some("BIG WIN"), &[Coin, Sparkle, Star]),
                Tier::Mega => (5.0, 1.5, FountainPattern::Wide7, Some("MEGA WIN"), &[Coin, Sparkle, Star, Gem]),
                Tier::Super => (
                    7.0,
                    2.5,
                    FountainPattern::Cascading,
                    Some("SUPER WIN"),
                    &[Coin, Sparkle, Star, Gem, Confetti],
                ),
            };
        let density = match tier {
            Tier::Small => 0.5,
            Tier::Big => 1.0,
            Tier::Mega => 1.5,
            Tier::Super => 5.0,
        };
        Self {
            tier,
            duration,
            emission_window: window,
            fountain: FountainConfig { pattern, ..Default::default() },
            particles: kinds.iter().map(|k| ParticleTypeConfig::new(*k, density)).collect(),
            title: title.map(str::to_string),
            title_color: Color::GOLD,
            title_easing: Easing::BackOut,
            sound: None,
            paylines: true,
            sequential: true,
            pause_between_lines: 0.3,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("tier.duration", self.duration)?;
        ConfigError::check_range("tier.emission_window", self.emission_window, 0.0, self.duration)?;
        ConfigError::check_non_negative("tier.pause_between_lines", self.pause_between_lines)?;
        self.fountain.validate()?;
        for p in &self.particles {
            ConfigError::check_non_negative("tier.particles.density", p.density)?;
            ConfigError::check_positive("tier.particles.size_multiplier", p.size_multiplier)?;
        }
        Ok(())
    }

    /// Uncapped particle count per configured type.
    pub fn nominal_counts(&self) -> Vec<u32> {
        self.particles
            .iter()
            .map(|p| {
                if !p.enabled {
                    return 0;
                }
                let n = p.kind.base_count() as f32 * p.density * self.fountain.density_multiplier;
                n.round().max(0.0) as u32
            })
            .collect()
    }
}

/// A running tier celebration.
pub struct Celebration {
    pub tier: Tier,
    particles: Vec<Particle>,
    title: Option<TitleCard>,
    started_at: f32,
    deadline: f32,
}

impl Celebration {
    /// Emit every particle up front with staggered spawn times. `origin` is
    /// the fountain mouth, `title_anchor` where the card is centered.
    pub fn launch(
        config: &TierConfig,
        origin: Vec2,
        title_anchor: Vec2,
        now: f32,
        budget: &ParticleBudget,
        rng: &mut Rng,
    ) -> Self {
        let counts = budget.allocate(&config.nominal_counts());
        let ballistics = config.fountain.ballistics();
        let deadline = now + config.duration;
        let mut particles = Vec::with_capacity(counts.iter().sum::<u32>() as usize);
        for (ptype, count) in config.particles.iter().zip(counts) {
            let visual = ptype.texture.visual_for(ptype.kind);
            for _ in 0..count {
                let velocity = config.fountain.spawn(rng);
                let spawn_time = now + rng.next_f32() * config.emission_window;
                particles.push(Particle {
                    kind: ptype.kind,
                    origin,
                    velocity,
                    spawn_time,
                    // Late spawns fade faster so every particle is clear by the deadline.
                    lifetime: (deadline - spawn_time).max(0.0),
                    visual: visual.clone(),
                    size_multiplier: ptype.size_multiplier * rng.range(0.8, 1.2),
                    spin: rng.range(-4.0, 4.0),
                    ballistics,
                });
            }
        }
        log::info!("{:?} celebration: {} particles", config.tier, particles.len());

        Self {
            tier: config.tier,
            particles,
            title: config
                .title
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .map(|t| TitleCard {
                    pop: config.title_easing,
                    ..TitleCard::new(t, config.title_color, title_anchor, now, config.duration)
                }),
            started_at: now,
            deadline,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn title(&self) -> Option<&TitleCard> {
        self.title.as_ref()
    }

    pub fn started_at(&self) -> f32 {
        self.started_at
    }

    pub fn deadline(&self) -> f32 {
        self.deadline
    }

    pub fn is_finished(&self, now: f32) -> bool {
        now >= self.deadline
    }

    /// Drop particles that have faded out. Returns how many remain.
    pub fn sweep(&mut self, now: f32) -> usize {
        if self.is_finished(now) {
            self.particles.clear();
        } else {
            self.particles.retain(|p| !p.is_expired(now));
        }
        self.particles.len()
    }

    pub fn render(&self, now: f32, owner: f32, out: &mut FrameBuffers) {
        if self.is_finished(now) {
            return;
        }
        for p in &self.particles {
            if !p.is_spawned(now) {
                continue;
            }
            let alpha = p.opacity(now);
            if alpha <= 0.0 {
                continue;
            }
            let pos = p.position(now);
            let visual = SpriteVisual::Particle(p.kind);
            out.push_sprite(
                visual,
                RenderInstance {
                    x: pos.x,
                    y: pos.y,
                    rotation: p.rotation(now),
                    scale: PARTICLE_SIZE * p.size_multiplier,
                    alpha,
                    visual: visual.code(),
                    textured: if matches!(p.visual, ParticleVisual::Texture(_)) { 1.0 } else { 0.0 },
                    owner,
                },
            );
        }
        if let Some(title) = &self.title {
            title.render(now, owner, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::MAX_PARTICLES;

    fn launch(config: &TierConfig, seed: u64) -> Celebration {
        let mut rng = Rng::new(seed);
        Celebration::launch(config, Vec2::new(400.0, 500.0), Vec2::new(400.0, 250.0), 10.0, &ParticleBudget::default(), &mut rng)
    }

    #[test]
    fn stock_tiers_validate() {
        for tier in Tier::ALL {
            let config = TierConfig::for_tier(tier);
            assert!(config.validate().is_ok(), "{tier:?}");
        }
        assert!(TierConfig::for_tier(Tier::Small).title.is_none());
    }

    #[test]
    fn nominal_counts_scale_with_density() {
        let mut config = TierConfig::for_tier(Tier::Big);
        assert_eq!(config.nominal_counts(), vec![40, 60, 25]);
        config.fountain.density_multiplier = 0.5;
        config.particles[2].enabled = false;
        assert_eq!(config.nominal_counts(), vec![20, 30, 0]);
    }

    #[test]
    fn super_tier_hits_the_cap() {
        let config = TierConfig::for_tier(Tier::Super);
        let nominal: u32 = config.nominal_counts().iter().sum();
        assert!(nominal > MAX_PARTICLES);
        let fx = launch(&config, 7);
        assert_eq!(fx.particles().len(), MAX_PARTICLES as usize);
    }

    #[test]
    fn spawns_are_staggered_within_window() {
        let config = TierConfig::for_tier(Tier::Mega);
        let fx = launch(&config, 3);
        assert!(fx.particles().iter().all(|p| (10.0..=11.5).contains(&p.spawn_time)));
        let late = fx.particles().iter().filter(|p| p.spawn_time > 10.75).count();
        assert!(late > 0);
        assert_eq!(fx.deadline(), 15.0);
    }

    #[test]
    fn textures_fall_back_to_glyphs() {
        let mut config = TierConfig::for_tier(Tier::Small);
        config.particles[0].texture = AssetRef::Url("coin.png".into());
        let fx = launch(&config, 1);
        for p in fx.particles() {
            match p.kind {
                ParticleKind::Coin => assert_eq!(p.visual, ParticleVisual::Texture("coin.png".into())),
                _ => assert_eq!(p.visual, ParticleVisual::Glyph(p.kind.fallback_glyph())),
            }
        }
    }

    #[test]
    fn sweep_clears_at_deadline() {
        let config = TierConfig::for_tier(Tier::Big);
        let mut fx = launch(&config, 5);
        assert!(fx.sweep(10.5) > 0);
        assert_eq!(fx.sweep(13.5), 0);
        assert!(fx.is_finished(13.5));
    }

    #[test]
    fn late_spawns_are_faded_out_by_the_deadline() {
        let config = TierConfig::for_tier(Tier::Super);
        let fx = launch(&config, 42);
        let just_before = fx.deadline() - 0.001;
        for p in fx.particles() {
            assert!((p.spawn_time + p.lifetime - fx.deadline()).abs() < 1e-3);
            assert!(p.opacity(just_before) < 0.01, "opacity {} at spawn {}", p.opacity(just_before), p.spawn_time);
        }
    }

    #[test]
    fn render_skips_unspawned_particles() {
        let config = TierConfig::for_tier(Tier::Big);
        let fx = launch(&config, 5);
        let mut out = FrameBuffers::new();
        fx.render(10.0, 1.0, &mut out);
        out.instances.finish();
        let at_start = out.instances.instance_count();

        let mut later = FrameBuffers::new();
        fx.render(11.2, 1.0, &mut later);
        later.instances.finish();
        assert!(later.instances.instance_count() > at_start);
        assert_eq!(fx.title().map(|t| t.text.as_str()), Some("BIG WIN"));
    }
}

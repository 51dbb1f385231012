//! Win highlight: twinkles orbiting each winning symbol, a pulsing glow
//! and an optional pulsing frame.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::error::ConfigError;
use crate::core::grid::{Cell, Rect};
use crate::effects::{Color, Rng};
use crate::renderer::{FrameBuffers, Glow, GlowBackend, RenderInstance, SpriteVisual};

/// Host frames per second the orbit speed is tuned against.
const REFERENCE_FPS: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub particle_count: u32,
    pub orbit_radius: f32,
    /// Radians per reference frame, scaled by 0.02.
    pub orbit_speed: f32,
    pub particle_size: f32,
    pub glow: bool,
    pub glow_color: Color,
    pub glow_radius: f32,
    pub glow_strength: f32,
    /// Glow and frame pulses per second.
    pub pulse_speed: f32,
    pub frame: bool,
    pub frame_color: Color,
    pub frame_thickness: f32,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            particle_count: 8,
            orbit_radius: 60.0,
            orbit_speed: 2.0,
            particle_size: 10.0,
            glow: true,
            glow_color: Color::GOLD,
            glow_radius: 14.0,
            glow_strength: 0.8,
            pulse_speed: 1.5,
            frame: true,
            frame_color: Color::GOLD,
            frame_thickness: 3.0,
        }
    }
}

impl HighlightConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_non_negative("highlight.orbit_radius", self.orbit_radius)?;
        ConfigError::check_finite("highlight.orbit_speed", self.orbit_speed)?;
        ConfigError::check_positive("highlight.particle_size", self.particle_size)?;
        ConfigError::check_non_negative("highlight.glow_radius", self.glow_radius)?;
        ConfigError::check_range("highlight.glow_strength", self.glow_strength, 0.0, 1.0)?;
        ConfigError::check_non_negative("highlight.pulse_speed", self.pulse_speed)?;
        ConfigError::check_non_negative("highlight.frame_thickness", self.frame_thickness)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbiter {
    pub angle: f32,
    pub phase: f32,
    pub speed_mult: f32,
    pub distance_mult: f32,
}

/// A symbol the highlight is attached to.
#[derive(Debug, Clone)]
pub struct HighlightTarget {
    pub cell: Cell,
    pub rect: Rect,
    pub orbiters: Vec<Orbiter>,
    /// Glow filter currently attached.
    pub glowing: bool,
}

pub struct WinHighlightEffect {
    config: HighlightConfig,
    targets: Vec<HighlightTarget>,
    time: f32,
}

impl WinHighlightEffect {
    pub fn new(config: &HighlightConfig) -> Self {
        Self { config: *config, targets: Vec::new(), time: 0.0 }
    }

    pub fn targets(&self) -> &[HighlightTarget] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Attach to a symbol. Attaching twice to the same cell is a no-op.
    pub fn apply_to(&mut self, cell: Cell, rect: Rect, rng: &mut Rng) -> bool {
        if self.targets.iter().any(|t| t.cell == cell) {
            return false;
        }
        let n = self.config.particle_count;
        let orbiters = (0..n)
            .map(|i| Orbiter {
                angle: i as f32 / n as f32 * TAU,
                phase: rng.next_f32() * TAU,
                speed_mult: rng.range(0.7, 1.3),
                distance_mult: rng.range(0.8, 1.2),
            })
            .collect();
        self.targets.push(HighlightTarget { cell, rect, orbiters, glowing: self.config.glow });
        true
    }

    /// Detach from a symbol and strip its glow. Safe to call repeatedly.
    pub fn remove(&mut self, cell: Cell) -> bool {
        let Some(idx) = self.targets.iter().position(|t| t.cell == cell) else {
            return false;
        };
        self.targets.swap_remove(idx);
        true
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        let step = self.config.orbit_speed * 0.02 * dt * REFERENCE_FPS;
        for target in &mut self.targets {
            for orbiter in &mut target.orbiters {
                orbiter.angle = (orbiter.angle + step * orbiter.speed_mult) % TAU;
            }
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn orbiter_position(&self, center: Vec2, orbiter: &Orbiter) -> Vec2 {
        let wobble = (self.time * 3.0 + orbiter.phase).sin() * 4.0;
        let distance = self.config.orbit_radius * orbiter.distance_mult + wobble;
        center + Vec2::from_angle(orbiter.angle) * distance
    }

    /// Orbiter size and alpha at the current time.
    pub fn orbiter_pulse(&self, orbiter: &Orbiter) -> (f32, f32) {
        let scale = 1.0 + 0.3 * (self.time * 4.0 + orbiter.phase).sin();
        let alpha = 0.65 + 0.35 * (self.time * 5.0 + orbiter.phase).sin();
        (self.config.particle_size * scale, alpha.clamp(0.0, 1.0))
    }

    fn pulse(&self) -> f32 {
        (self.time * self.config.pulse_speed * TAU).sin()
    }

    /// Glow radius and strength at the current time.
    pub fn glow_at(&self) -> (f32, f32) {
        let s = self.pulse();
        (
            self.config.glow_radius * (1.0 + 0.25 * s),
            self.config.glow_strength * (0.8 + 0.2 * s),
        )
    }

    /// Frame thickness and alpha at the current time.
    pub fn frame_at(&self) -> (f32, f32) {
        let s = self.pulse();
        (self.config.frame_thickness * (1.0 + 0.3 * s), 0.7 + 0.3 * s)
    }

    pub fn render(&self, owner: f32, glow: &dyn GlowBackend, out: &mut FrameBuffers) {
        let (radius, strength) = self.glow_at();
        let (thickness, frame_alpha) = self.frame_at();
        for target in &self.targets {
            if target.glowing {
                glow.draw(
                    &Glow { rect: target.rect, color: self.config.glow_color, radius, strength },
                    out,
                );
            }
            if self.config.frame {
                out.stroke_rect(target.rect, thickness, self.config.frame_color.fade(frame_alpha));
            }
            let center = target.rect.center();
            for orbiter in &target.orbiters {
                let pos = self.orbiter_position(center, orbiter);
                let (size, alpha) = self.orbiter_pulse(orbiter);
                out.push_sprite(
                    SpriteVisual::Orbiter,
                    RenderInstance {
                        x: pos.x,
                        y: pos.y,
                        rotation: orbiter.angle,
                        scale: size,
                        alpha,
                        visual: SpriteVisual::Orbiter.code(),
                        textured: 0.0,
                        owner,
                    },
                );
            }
        }
    }
}

//! Glow around highlighted symbols.
//!
//! Hosts that can run a real glow filter get [`NativeGlow`], which just
//! forwards a request per target. Everyone else gets [`CompositeGlow`]: a
//! flood of the glow color through a color matrix, spread over a few
//! fading rings that stand in for the blur. The backend is picked once
//! when the preview is built.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::frame::FrameBuffers;
use crate::core::grid::Rect;
use crate::effects::Color;

/// What the host rendering backend can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// The host can apply a native glow filter to a display object.
    pub native_glow: bool,
}

/// One glow to draw around `rect`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub rect: Rect,
    pub color: Color,
    /// Blur radius in pixels.
    pub radius: f32,
    /// Multiplies the glow alpha.
    pub strength: f32,
}

/// Native glow request. 12 floats = 3 vec4s.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GlowInstance {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub strength: f32,
    pub _pad: [f32; 2],
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl GlowInstance {
    pub const FLOATS: usize = 12;
}

/// Draws glows for the preview.
pub trait GlowBackend {
    fn name(&self) -> &'static str;

    fn draw(&self, glow: &Glow, out: &mut FrameBuffers);
}

pub struct NativeGlow;

impl GlowBackend for NativeGlow {
    fn name(&self) -> &'static str {
        "native"
    }

    fn draw(&self, glow: &Glow, out: &mut FrameBuffers) {
        out.glows.push(GlowInstance {
            x: glow.rect.min.x,
            y: glow.rect.min.y,
            width: glow.rect.size.x,
            height: glow.rect.size.y,
            radius: glow.radius,
            strength: glow.strength,
            _pad: [0.0; 2],
            r: glow.color.r,
            g: glow.color.g,
            b: glow.color.b,
            a: glow.color.a,
        });
    }
}

/// 4x5 row-major color matrix, the same layout as an SVG `feColorMatrix`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub [f32; 20]);

impl ColorMatrix {
    pub const IDENTITY: ColorMatrix = ColorMatrix([
        1.0, 0.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    /// Replace the source color with `color`, keeping the source's coverage.
    pub fn tint(color: Color) -> ColorMatrix {
        ColorMatrix([
            0.0, 0.0, 0.0, 0.0, color.r,
            0.0, 0.0, 0.0, 0.0, color.g,
            0.0, 0.0, 0.0, 0.0, color.b,
            0.0, 0.0, 0.0, color.a, 0.0,
        ])
    }

    pub fn apply(&self, c: Color) -> Color {
        let m = &self.0;
        let row = |i: usize| m[i] * c.r + m[i + 1] * c.g + m[i + 2] * c.b + m[i + 3] * c.a + m[i + 4];
        Color::new(
            row(0).clamp(0.0, 1.0),
            row(5).clamp(0.0, 1.0),
            row(10).clamp(0.0, 1.0),
            row(15).clamp(0.0, 1.0),
        )
    }
}

pub struct CompositeGlow {
    /// Rings used to approximate the blur falloff.
    pub rings: u32,
}

impl Default for CompositeGlow {
    fn default() -> Self {
        Self { rings: 4 }
    }
}

impl GlowBackend for CompositeGlow {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn draw(&self, glow: &Glow, out: &mut FrameBuffers) {
        if self.rings == 0 || glow.radius <= 0.0 {
            return;
        }
        let flood = ColorMatrix::tint(glow.color).apply(Color::WHITE);
        let step = glow.radius / self.rings as f32;
        for i in 0..self.rings {
            let falloff = 1.0 - i as f32 / self.rings as f32;
            let color = flood.fade(glow.strength * falloff * falloff);
            let ring = glow.rect.inflate(step * (i as f32 + 0.5));
            let c = ring.corners();
            out.ribbon(&[c[0], c[1], c[2], c[3], c[0]], step * 0.5, color);
        }
    }
}

/// Pick the glow backend for a host. Called once per preview.
pub fn select_glow(capabilities: &Capabilities) -> Box<dyn GlowBackend> {
    let backend: Box<dyn GlowBackend> = if capabilities.native_glow {
        Box::new(NativeGlow)
    } else {
        Box::new(CompositeGlow::default())
    };
    log::info!("glow backend: {}", backend.name());
    backend
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn glow() -> Glow {
        Glow {
            rect: Rect::new(Vec2::new(10.0, 10.0), Vec2::splat(100.0)),
            color: Color::GOLD,
            radius: 12.0,
            strength: 1.0,
        }
    }

    #[test]
    fn selection_follows_capabilities() {
        assert_eq!(select_glow(&Capabilities { native_glow: true }).name(), "native");
        assert_eq!(select_glow(&Capabilities::default()).name(), "composite");
    }

    #[test]
    fn native_forwards_a_request() {
        let mut out = FrameBuffers::new();
        NativeGlow.draw(&glow(), &mut out);
        assert_eq!(out.glows.len(), 1);
        assert_eq!(out.glows[0].radius, 12.0);
        assert!(out.effects.is_empty());
        assert_eq!(std::mem::size_of::<GlowInstance>(), GlowInstance::FLOATS * 4);
    }

    #[test]
    fn composite_draws_tinted_rings() {
        let mut out = FrameBuffers::new();
        CompositeGlow::default().draw(&glow(), &mut out);
        assert!(out.glows.is_empty());
        assert!(!out.effects.is_empty());
        let first = out.effects[0];
        assert_eq!((first.r, first.g, first.b), (Color::GOLD.r, Color::GOLD.g, Color::GOLD.b));
    }

    #[test]
    fn tint_matrix_floods_color() {
        let tinted = ColorMatrix::tint(Color::MAGENTA.with_alpha(0.5)).apply(Color::rgb(0.2, 0.9, 0.4));
        assert_eq!(tinted, Color::new(1.0, 0.0, 1.0, 0.5));
        let same = ColorMatrix::IDENTITY.apply(Color::GOLD);
        assert_eq!(same, Color::GOLD);
    }
}

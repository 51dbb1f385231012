//! Per-frame output buffers handed to the host.

use glam::Vec2;

use super::glow::GlowInstance;
use super::instance::{RenderBuffer, RenderInstance, SpriteVisual};
use crate::core::grid::Rect;
use crate::effects::{build_strip, strip_to_triangles, Color, EffectsVertex};
#[cfg(feature = "vectors")]
use crate::systems::vector::VectorState;

/// Everything one frame draws, rebuilt from scratch by every tick.
pub struct FrameBuffers {
    pub instances: RenderBuffer,
    /// Ribbon triangles: bolts, sparks, composite glow rings.
    pub effects: Vec<EffectsVertex>,
    /// Native glow filter requests.
    pub glows: Vec<GlowInstance>,
    /// Two floats per reel: vertical offset and phase code.
    pub reels: Vec<f32>,
    /// Surface translation (anticipation shake).
    pub shake: Vec2,
    #[cfg(feature = "vectors")]
    pub vectors: VectorState,
}

impl FrameBuffers {
    pub fn new() -> Self {
        Self {
            instances: RenderBuffer::new(),
            effects: Vec::with_capacity(4096),
            glows: Vec::new(),
            reels: Vec::new(),
            shake: Vec2::ZERO,
            #[cfg(feature = "vectors")]
            vectors: VectorState::new(),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.effects.clear();
        self.glows.clear();
        self.reels.clear();
        self.shake = Vec2::ZERO;
        #[cfg(feature = "vectors")]
        self.vectors.clear();
    }

    pub fn push_sprite(&mut self, visual: SpriteVisual, instance: RenderInstance) {
        self.instances.push(visual, instance);
    }

    /// Widen a polyline into the effects buffer.
    pub fn ribbon(&mut self, points: &[Vec2], half_width: f32, color: Color) {
        if color.a <= 0.0 {
            return;
        }
        let strip = build_strip(points, half_width, color);
        strip_to_triangles(&strip, &mut self.effects);
    }

    /// Stroke an open polyline; lyon when available, a ribbon otherwise.
    pub fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        #[cfg(feature = "vectors")]
        self.vectors.stroke_polyline(points, width, color);
        #[cfg(not(feature = "vectors"))]
        self.ribbon(points, width * 0.5, color);
    }

    /// Stroke the outline of a rectangle.
    pub fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color) {
        let corners = rect.corners();
        #[cfg(feature = "vectors")]
        self.vectors.stroke_polygon(&corners, width, color);
        #[cfg(not(feature = "vectors"))]
        self.ribbon(&[corners[0], corners[1], corners[2], corners[3], corners[0]], width * 0.5, color);
    }

    /// Fill a rectangle; without lyon, a ribbon as tall as the rect.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        #[cfg(feature = "vectors")]
        self.vectors.fill_rect(rect.min, rect.size, color);
        #[cfg(not(feature = "vectors"))]
        {
            let mid = rect.min.y + rect.size.y * 0.5;
            let left = Vec2::new(rect.min.x, mid);
            self.ribbon(&[left, left + Vec2::new(rect.size.x, 0.0)], rect.size.y * 0.5, color);
        }
    }

    /// Vector vertex count; zero without the `vectors` feature.
    pub fn vector_vertex_count(&self) -> usize {
        #[cfg(feature = "vectors")]
        return self.vectors.vertex_count();
        #[cfg(not(feature = "vectors"))]
        return 0;
    }
}

impl Default for FrameBuffers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strokes_land_somewhere() {
        let mut out = FrameBuffers::new();
        out.stroke_polyline(&[Vec2::ZERO, Vec2::new(50.0, 0.0)], 4.0, Color::GOLD);
        out.stroke_rect(Rect::new(Vec2::ZERO, Vec2::splat(20.0)), 2.0, Color::WHITE);
        out.fill_rect(Rect::new(Vec2::ZERO, Vec2::splat(20.0)), Color::WHITE.fade(0.2));
        assert!(out.vector_vertex_count() > 0 || !out.effects.is_empty());
    }

    #[test]
    fn clear_empties_everything() {
        let mut out = FrameBuffers::new();
        out.ribbon(&[Vec2::ZERO, Vec2::new(10.0, 0.0)], 2.0, Color::WHITE);
        out.push_sprite(SpriteVisual::Spark, RenderInstance::default());
        out.shake = Vec2::ONE;
        out.clear();
        assert!(out.effects.is_empty());
        assert_eq!(out.instances.instance_count(), 0);
        assert_eq!(out.shake, Vec2::ZERO);
    }

    #[test]
    fn transparent_ribbons_are_skipped() {
        let mut out = FrameBuffers::new();
        out.ribbon(&[Vec2::ZERO, Vec2::new(10.0, 0.0)], 2.0, Color::TRANSPARENT);
        assert!(out.effects.is_empty());
    }
}

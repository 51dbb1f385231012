//! Lyon tessellation for payline strokes, highlight boxes and frames.
//!
//! Shapes are tessellated on the CPU into a flat triangle list that the
//! host draws as-is. Cleared every frame.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor, LineJoin,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};

use crate::effects::Color;

/// Per-vertex data for vector rendering.
/// 6 floats = 24 bytes per vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct VectorVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorVertex {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    fn at(x: f32, y: f32, color: Color) -> Self {
        Self { x, y, r: color.r, g: color.g, b: color.b, a: color.a }
    }
}

struct FillVertexCtor {
    color: Color,
}

impl FillVertexConstructor<VectorVertex> for FillVertexCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> VectorVertex {
        VectorVertex::at(vertex.position().x, vertex.position().y, self.color)
    }
}

struct StrokeVertexCtor {
    color: Color,
}

impl StrokeVertexConstructor<VectorVertex> for StrokeVertexCtor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> VectorVertex {
        VectorVertex::at(vertex.position().x, vertex.position().y, self.color)
    }
}

fn polyline_path(points: &[Vec2], closed: bool) -> Path {
    let mut builder = Path::builder();
    builder.begin(point(points[0].x, points[0].y));
    for p in &points[1..] {
        builder.line_to(point(p.x, p.y));
    }
    if closed {
        builder.close();
    } else {
        builder.end(false);
    }
    builder.build()
}

/// Holds lyon tessellators and the output vertex buffer.
pub struct VectorState {
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    geometry: VertexBuffers<VectorVertex, u32>,
    buffer: Vec<f32>,
}

impl VectorState {
    pub fn new() -> Self {
        Self {
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            geometry: VertexBuffers::new(),
            buffer: Vec::with_capacity(8192 * VectorVertex::FLOATS),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.buffer.len() / VectorVertex::FLOATS
    }

    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    /// Flush indexed geometry to the flat buffer as a triangle list.
    fn flush_geometry(&mut self) {
        for idx in &self.geometry.indices {
            let v = &self.geometry.vertices[*idx as usize];
            self.buffer.extend_from_slice(&[v.x, v.y, v.r, v.g, v.b, v.a]);
        }
        self.geometry.vertices.clear();
        self.geometry.indices.clear();
    }

    pub fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 || color.a <= 0.0 {
            return;
        }
        let path = polyline_path(points, true);
        let result = self.fill_tess.tessellate_path(
            &path,
            &FillOptions::tolerance(0.5),
            &mut BuffersBuilder::new(&mut self.geometry, FillVertexCtor { color }),
        );
        if result.is_ok() {
            self.flush_geometry();
        } else {
            self.discard_geometry();
        }
    }

    pub fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        let points = [pos, Vec2::new(pos.x + size.x, pos.y), pos + size, Vec2::new(pos.x, pos.y + size.y)];
        self.fill_polygon(&points, color);
    }

    /// Stroke an open polyline with round joins (payline paths).
    pub fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        if points.len() < 2 {
            return;
        }
        self.stroke_path(&polyline_path(points, false), width, color);
    }

    /// Stroke a closed polygon (highlight boxes, frames).
    pub fn stroke_polygon(&mut self, points: &[Vec2], width: f32, color: Color) {
        if points.len() < 3 {
            return;
        }
        self.stroke_path(&polyline_path(points, true), width, color);
    }

    fn stroke_path(&mut self, path: &Path, width: f32, color: Color) {
        if width <= 0.0 || color.a <= 0.0 {
            return;
        }
        let options = StrokeOptions::tolerance(0.5)
            .with_line_width(width)
            .with_line_join(LineJoin::Round);
        let result = self.stroke_tess.tessellate_path(
            path,
            &options,
            &mut BuffersBuilder::new(&mut self.geometry, StrokeVertexCtor { color }),
        );
        if result.is_ok() {
            self.flush_geometry();
        } else {
            self.discard_geometry();
        }
    }

    fn discard_geometry(&mut self) {
        log::debug!("vector tessellation failed, shape skipped");
        self.geometry.vertices.clear();
        self.geometry.indices.clear();
    }
}

impl Default for VectorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn vector_vertex_is_24_bytes() {
        assert_eq!(size_of::<VectorVertex>(), 24);
        assert_eq!(VectorVertex::STRIDE_BYTES, 24);
    }

    #[test]
    fn fill_rect_produces_two_triangles() {
        let mut state = VectorState::new();
        state.fill_rect(Vec2::ZERO, Vec2::new(100.0, 50.0), Color::GOLD);
        assert_eq!(state.vertex_count(), 6);
        assert_eq!(&state.buffer()[2..6], &Color::GOLD.to_array());
    }

    #[test]
    fn strokes_produce_vertices() {
        let mut state = VectorState::new();
        state.stroke_polyline(&[Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(100.0, 80.0)], 4.0, Color::WHITE);
        assert!(state.vertex_count() > 0);
        let before = state.vertex_count();
        state.stroke_polygon(&[Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)], 2.0, Color::WHITE);
        assert!(state.vertex_count() > before);
    }

    #[test]
    fn invisible_or_degenerate_shapes_are_skipped() {
        let mut state = VectorState::new();
        state.stroke_polyline(&[Vec2::ZERO], 4.0, Color::WHITE);
        state.stroke_polyline(&[Vec2::ZERO, Vec2::ONE], 0.0, Color::WHITE);
        state.fill_rect(Vec2::ZERO, Vec2::ONE, Color::TRANSPARENT);
        assert_eq!(state.vertex_count(), 0);
    }

    #[test]
    fn clear_resets_buffer() {
        let mut state = VectorState::new();
        state.fill_rect(Vec2::ZERO, Vec2::new(10.0, 10.0), Color::WHITE);
        state.clear();
        assert_eq!(state.vertex_count(), 0);
    }
}

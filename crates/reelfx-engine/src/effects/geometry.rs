//! Ribbon meshes for bolts, branches and spark streaks.
//!
//! A polyline is widened into a triangle strip (one left/right vertex pair per
//! point, mitred at interior joints, with short caps at both ends) and then
//! unrolled into a plain triangle list for the host renderer.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::color::Color;

/// One effects vertex: position, ribbon UV, RGBA. 8 floats = 32 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct EffectsVertex {
    pub x: f32,
    pub y: f32,
    /// 0.0 on the left edge of the ribbon, 1.0 on the right.
    pub u: f32,
    /// 0.0 at the caps, 1.0 along the body (lets the shader soften the ends).
    pub v: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl EffectsVertex {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    fn new(pos: Vec2, u: f32, v: f32, color: Color) -> Self {
        Self { x: pos.x, y: pos.y, u, v, r: color.r, g: color.g, b: color.b, a: color.a }
    }
}

fn direction(a: Vec2, b: Vec2) -> (Vec2, Vec2) {
    let d = (b - a).normalize_or_zero();
    (d, d.perp())
}

/// Widen a polyline into a triangle strip of `EffectsVertex`.
/// `half_width` is measured from the centre line to each edge.
pub fn build_strip(points: &[Vec2], half_width: f32, color: Color) -> Vec<EffectsVertex> {
    if points.len() < 2 || half_width <= 0.0 {
        return Vec::new();
    }

    let n = points.len();
    let mut verts = Vec::with_capacity((n + 2) * 2);
    let mut push_pair = |center: Vec2, perp: Vec2, v: f32| {
        verts.push(EffectsVertex::new(center + perp * half_width, 0.0, v, color));
        verts.push(EffectsVertex::new(center - perp * half_width, 1.0, v, color));
    };

    let (d0, p0) = direction(points[0], points[1]);
    push_pair(points[0] - d0 * half_width, p0, 0.0);
    push_pair(points[0], p0, 1.0);

    for i in 1..n - 1 {
        let (_, p_prev) = direction(points[i - 1], points[i]);
        let (_, p_next) = direction(points[i], points[i + 1]);
        let joint = (p_prev + p_next).try_normalize().unwrap_or(p_next);
        push_pair(points[i], joint, 1.0);
    }

    let (d_last, p_last) = direction(points[n - 2], points[n - 1]);
    push_pair(points[n - 1], p_last, 1.0);
    push_pair(points[n - 1] + d_last * half_width, p_last, 0.0);

    verts
}

/// Unroll a triangle strip into a triangle list with consistent winding.
pub fn strip_to_triangles(strip: &[EffectsVertex], out: &mut Vec<EffectsVertex>) {
    if strip.len() < 3 {
        return;
    }
    out.reserve((strip.len() - 2) * 3);
    for i in 0..strip.len() - 2 {
        if i % 2 == 0 {
            out.extend_from_slice(&[strip[i], strip[i + 1], strip[i + 2]]);
        } else {
            out.extend_from_slice(&[strip[i + 1], strip[i], strip[i + 2]]);
        }
    }
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Vec2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// The leading part of a polyline, `length` units long measured from the
/// first point. The last point is interpolated inside its segment.
pub fn polyline_prefix(points: &[Vec2], length: f32) -> Vec<Vec2> {
    let mut out = Vec::with_capacity(points.len());
    let Some(&first) = points.first() else {
        return out;
    };
    out.push(first);
    let mut remaining = length.max(0.0);
    for w in points.windows(2) {
        let seg = w[0].distance(w[1]);
        if remaining >= seg {
            out.push(w[1]);
            remaining -= seg;
        } else {
            if remaining > 0.0 && seg > 0.0 {
                out.push(w[0].lerp(w[1], remaining / seg));
            }
            break;
        }
    }
    out
}

/// The part of a polyline between arc lengths `from` and `to`.
pub fn polyline_slice(points: &[Vec2], from: f32, to: f32) -> Vec<Vec2> {
    let mut out = Vec::new();
    if points.len() < 2 || to <= from {
        return out;
    }
    let mut walked = 0.0;
    for w in points.windows(2) {
        let seg = w[0].distance(w[1]);
        let (seg_start, seg_end) = (walked, walked + seg);
        walked = seg_end;
        if seg <= 0.0 || seg_end <= from {
            continue;
        }
        if out.is_empty() {
            out.push(w[0].lerp(w[1], ((from - seg_start) / seg).clamp(0.0, 1.0)));
        }
        if seg_end >= to {
            out.push(w[0].lerp(w[1], ((to - seg_start) / seg).clamp(0.0, 1.0)));
            break;
        }
        out.push(w[1]);
    }
    out
}

/// Split a polyline into the "on" runs of a `[dash, gap]` pattern.
pub fn dash_polyline(points: &[Vec2], dash: f32, gap: f32) -> Vec<Vec<Vec2>> {
    let total = polyline_length(points);
    if dash <= 0.0 || total <= 0.0 {
        return Vec::new();
    }
    let mut dashes = Vec::new();
    let mut at = 0.0;
    while at < total {
        let run = polyline_slice(points, at, (at + dash).min(total));
        if run.len() >= 2 {
            dashes.push(run);
        }
        at += dash + gap.max(0.0);
    }
    dashes
}

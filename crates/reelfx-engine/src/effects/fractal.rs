//! Midpoint-displacement polylines for lightning and electricity.

use glam::Vec2;

use super::rng::Rng;

/// Segments shorter than this are returned as-is; their perpendicular is undefined.
pub const MIN_SEGMENT_LENGTH: f32 = 1e-4;

/// Per-level decay applied to the displacement factor.
pub const DISPLACEMENT_DECAY: f32 = 0.8;

/// Deepest subdivision [`generate`] performs; larger requests are clamped.
pub const MAX_DEPTH: u32 = 16;

/// Subdivide `start..end` `iterations` times, pushing every midpoint sideways
/// by a random amount in `[-1, 1) * displacement * (segment_length / 100)`.
///
/// The result always holds `2^depth + 1` points, where `depth` is
/// `iterations` clamped to [`MAX_DEPTH`]. It begins at `start` and ends at
/// `end`. Only `rng` is advanced.
pub fn generate(start: Vec2, end: Vec2, displacement: f32, iterations: u32, rng: &mut Rng) -> Vec<Vec2> {
    let iterations = iterations.min(MAX_DEPTH);
    let mut points = Vec::with_capacity((1usize << iterations) + 1);
    points.push(start);
    subdivide(start, end, displacement, iterations, rng, &mut points);
    points
}

/// Appends every point after `start` (interior midpoints and `end`).
fn subdivide(start: Vec2, end: Vec2, displacement: f32, iterations: u32, rng: &mut Rng, out: &mut Vec<Vec2>) {
    if iterations == 0 {
        out.push(end);
        return;
    }

    let delta = end - start;
    let length = delta.length();
    if length < MIN_SEGMENT_LENGTH {
        // Keep the point count contract: collapse the whole sub-tree onto the segment.
        let count = 1usize << iterations;
        for i in 1..=count {
            out.push(start.lerp(end, i as f32 / count as f32));
        }
        return;
    }

    let perp = delta.perp() / length;
    let offset = rng.signed() * displacement * (length / 100.0);
    let mid = (start + end) * 0.5 + perp * offset;

    let next = displacement * DISPLACEMENT_DECAY;
    subdivide(start, mid, next, iterations - 1, rng, out);
    subdivide(mid, end, next, iterations - 1, rng, out);
}

/// Upper bound on the distance between consecutive points of a path from
/// [`generate`]. Each level turns a chord of length `L` into two chords of at
/// most `L / 2 + d * L / 100`.
pub fn max_step(start: Vec2, end: Vec2, displacement: f32, iterations: u32) -> f32 {
    let mut bound = start.distance(end);
    let mut d = displacement.abs();
    for _ in 0..iterations.min(MAX_DEPTH) {
        bound *= 0.5 + d / 100.0;
        d *= DISPLACEMENT_DECAY;
    }
    bound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_iterations_returns_endpoints() {
        let mut rng = Rng::new(1);
        let pts = generate(Vec2::ZERO, Vec2::new(50.0, 0.0), 30.0, 0, &mut rng);
        assert_eq!(pts, vec![Vec2::ZERO, Vec2::new(50.0, 0.0)]);
    }

    #[test]
    fn point_count_and_endpoints() {
        let a = Vec2::new(10.0, 20.0);
        let b = Vec2::new(310.0, 220.0);
        for iterations in [0u32, 1, 2, 3, 6] {
            let mut rng = Rng::new(42 + iterations as u64);
            let pts = generate(a, b, 40.0, iterations, &mut rng);
            assert_eq!(pts.len(), (1usize << iterations) + 1);
            assert_eq!(pts[0], a);
            assert_eq!(*pts.last().unwrap(), b);
        }
    }

    #[test]
    fn depth_is_clamped() {
        let mut rng = Rng::new(8);
        let a = Vec2::ZERO;
        let b = Vec2::new(200.0, 0.0);
        for iterations in [MAX_DEPTH + 1, 64, u32::MAX] {
            let pts = generate(a, b, 20.0, iterations, &mut rng);
            assert_eq!(pts.len(), (1usize << MAX_DEPTH) + 1);
            assert_eq!(*pts.last().unwrap(), b);
        }
        assert_eq!(max_step(a, b, 20.0, 200), max_step(a, b, 20.0, MAX_DEPTH));
    }

    #[test]
    fn consecutive_steps_are_bounded() {
        let a = Vec2::ZERO;
        let b = Vec2::new(400.0, 0.0);
        for iterations in [0u32, 1, 2, 3, 6] {
            let bound = max_step(a, b, 60.0, iterations);
            for seed in 1..20u64 {
                let mut rng = Rng::new(seed);
                let pts = generate(a, b, 60.0, iterations, &mut rng);
                for w in pts.windows(2) {
                    assert!(w[0].distance(w[1]) <= bound + 1e-3);
                }
            }
        }
    }

    #[test]
    fn degenerate_segment_is_not_displaced() {
        let mut rng = Rng::new(5);
        let p = Vec2::new(3.0, 3.0);
        let pts = generate(p, p, 100.0, 3, &mut rng);
        assert_eq!(pts.len(), 9);
        assert!(pts.iter().all(|q| *q == p));
    }

    #[test]
    fn same_seed_same_bolt() {
        let mut r1 = Rng::new(11);
        let mut r2 = Rng::new(11);
        let a = generate(Vec2::ZERO, Vec2::new(0.0, 300.0), 50.0, 5, &mut r1);
        let b = generate(Vec2::ZERO, Vec2::new(0.0, 300.0), 50.0, 5, &mut r2);
        assert_eq!(a, b);
    }

    #[test]
    fn displacement_moves_interior_points() {
        let mut rng = Rng::new(8);
        let pts = generate(Vec2::ZERO, Vec2::new(200.0, 0.0), 80.0, 4, &mut rng);
        assert!(pts[1..pts.len() - 1].iter().any(|p| p.y.abs() > 0.01));
    }
}

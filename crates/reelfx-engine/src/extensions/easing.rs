// extensions/easing.rs
//
// Pure easing curves for reel motion, payline reveals and title cards.
// No dependencies on preview state, just math.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Constant velocity (no easing).
    #[default]
    Linear,
    /// Slow start.
    QuadIn,
    /// Slow end.
    QuadOut,
    /// Stronger slow end.
    CubicOut,
    /// Smooth sine in and out, used for pulses.
    SineInOut,
    /// Overshoot then settle.
    BackOut,
    /// CSS `ease-out`, i.e. `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,
    /// Reel landing spring: `2^(-10t) * sin((t - 0.075) * 2π / 0.3) + 1`.
    ElasticOut,
}

impl Easing {
    /// Apply the easing function to a normalized time value `t` in [0, 1].
    /// Back and Elastic overshoot 1 before settling.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Easing::BackOut => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
            Easing::EaseOut => CubicBezier::EASE_OUT.apply(t),
            Easing::ElasticOut => elastic_out(t),
        }
    }
}

/// The reel bounce spring. Starts at 0, rings around 1 and settles there.
#[inline]
pub fn elastic_out(t: f32) -> f32 {
    const PERIOD: f32 = 0.3;
    2.0_f32.powf(-10.0 * t) * ((t - PERIOD / 4.0) * (2.0 * PI / PERIOD)).sin() + 1.0
}

/// CSS-style timing function through (0,0), (x1,y1), (x2,y2), (1,1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl CubicBezier {
    pub const EASE_OUT: CubicBezier = CubicBezier { x1: 0.0, y1: 0.0, x2: 0.58, y2: 1.0 };

    fn coord(s: f32, p1: f32, p2: f32) -> f32 {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
    }

    fn coord_slope(s: f32, p1: f32, p2: f32) -> f32 {
        let inv = 1.0 - s;
        3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
    }

    /// Curve parameter whose x equals `x`. Newton first, bisection when the
    /// slope is too flat to trust.
    fn solve_s(&self, x: f32) -> f32 {
        let mut s = x;
        for _ in 0..8 {
            let err = Self::coord(s, self.x1, self.x2) - x;
            if err.abs() < 1e-6 {
                return s;
            }
            let slope = Self::coord_slope(s, self.x1, self.x2);
            if slope.abs() < 1e-6 {
                break;
            }
            s -= err / slope;
        }

        let (mut lo, mut hi) = (0.0f32, 1.0f32);
        s = x;
        for _ in 0..40 {
            let v = Self::coord(s, self.x1, self.x2);
            if (v - x).abs() < 1e-6 {
                break;
            }
            if v < x {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) * 0.5;
        }
        s
    }

    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        Self::coord(self.solve_s(t), self.y1, self.y2)
    }
}

/// Reel spin progress curve: quadratic ease-in, a linear cruise, quadratic
/// ease-out. The cruise speed is chosen so the three pieces meet with equal
/// value and slope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinCurve {
    /// Fraction of the spin spent accelerating.
    ease_in: f32,
    /// Fraction of the spin spent decelerating.
    ease_out: f32,
    /// Slope of the linear middle section.
    cruise: f32,
}

impl SpinCurve {
    /// Build from fractions of the total spin. Fractions summing past 1 are
    /// scaled down proportionally.
    pub fn new(ease_in: f32, ease_out: f32) -> Self {
        let mut a = ease_in.max(0.0);
        let mut b = ease_out.max(0.0);
        let sum = a + b;
        if sum > 1.0 {
            a /= sum;
            b /= sum;
        }
        Self {
            ease_in: a,
            ease_out: b,
            cruise: 1.0 / (1.0 - a / 2.0 - b / 2.0),
        }
    }

    /// Build from durations in seconds.
    pub fn from_durations(spin: f32, ease_in: f32, ease_out: f32) -> Self {
        if spin <= 0.0 {
            return Self::new(0.0, 0.0);
        }
        Self::new(ease_in / spin, ease_out / spin)
    }

    pub fn ease_in(&self) -> f32 {
        self.ease_in
    }

    pub fn ease_out(&self) -> f32 {
        self.ease_out
    }

    pub fn apply(&self, p: f32) -> f32 {
        let p = p.clamp(0.0, 1.0);
        let (a, b, v) = (self.ease_in, self.ease_out, self.cruise);
        if p < a {
            v * p * p / (2.0 * a)
        } else if p <= 1.0 - b {
            v * (p - a / 2.0)
        } else {
            let rest = 1.0 - p;
            1.0 - v * rest * rest / (2.0 * b)
        }
    }
}

// extensions/mod.rs
//
// Timing curves shared by every animation system. Decoupled from preview
// state so they can be tested (and reused by the host) as plain math.

pub mod easing;

pub use easing::{Easing, CubicBezier, SpinCurve, elastic_out};

//! Win title card: pops in with a back-out scale, holds, fades out over the
//! last fifth of the celebration.

use glam::Vec2;

use crate::effects::Color;
use crate::extensions::Easing;
use crate::renderer::{FrameBuffers, RenderInstance, SpriteVisual};

/// Seconds the pop-in takes.
pub const POP_DURATION: f32 = 0.4;

/// Share of the duration spent fading out.
pub const FADE_SHARE: f32 = 0.2;

/// Font size the card is laid out at, in pixels.
pub const TITLE_SIZE: f32 = 72.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TitleCard {
    pub text: String,
    pub color: Color,
    pub anchor: Vec2,
    pub start: f32,
    pub duration: f32,
    /// Scale curve over the pop-in.
    pub pop: Easing,
}

impl TitleCard {
    pub fn new(text: impl Into<String>, color: Color, anchor: Vec2, start: f32, duration: f32) -> Self {
        Self { text: text.into(), color, anchor, start, duration, pop: Easing::BackOut }
    }

    pub fn scale(&self, now: f32) -> f32 {
        let local = now - self.start;
        if local <= 0.0 {
            return 0.0;
        }
        self.pop.apply(local / POP_DURATION)
    }

    pub fn alpha(&self, now: f32) -> f32 {
        let local = now - self.start;
        if local < 0.0 || local >= self.duration {
            return 0.0;
        }
        let fade_start = self.duration * (1.0 - FADE_SHARE);
        if local <= fade_start {
            1.0
        } else {
            1.0 - (local - fade_start) / (self.duration - fade_start)
        }
    }

    pub fn render(&self, now: f32, owner: f32, out: &mut FrameBuffers) {
        let alpha = self.alpha(now);
        let scale = self.scale(now);
        if alpha <= 0.0 || scale <= 0.0 {
            return;
        }
        out.push_sprite(
            SpriteVisual::Title,
            RenderInstance {
                x: self.anchor.x,
                y: self.anchor.y,
                rotation: 0.0,
                scale: TITLE_SIZE * scale,
                alpha: alpha * self.color.a,
                visual: SpriteVisual::Title.code(),
                textured: 0.0,
                owner,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> TitleCard {
        TitleCard::new("MEGA WIN", Color::GOLD, Vec2::new(400.0, 300.0), 1.0, 5.0)
    }

    #[test]
    fn pops_in_with_overshoot() {
        let c = card();
        assert_eq!(c.scale(1.0), 0.0);
        let peak = (1..40).map(|i| c.scale(1.0 + i as f32 * 0.01)).fold(0.0, f32::max);
        assert!(peak > 1.0);
        assert!((c.scale(1.0 + POP_DURATION) - 1.0).abs() < 1e-5);
        assert!((c.scale(4.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn pop_curve_is_configurable() {
        let c = TitleCard { pop: Easing::Linear, ..card() };
        assert!((c.scale(1.0 + POP_DURATION * 0.5) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn fades_over_final_fifth() {
        let c = card();
        assert_eq!(c.alpha(0.5), 0.0);
        assert_eq!(c.alpha(2.0), 1.0);
        assert_eq!(c.alpha(5.0), 1.0);
        assert!((c.alpha(5.5) - 0.5).abs() < 1e-5);
        assert_eq!(c.alpha(6.0), 0.0);
    }

    #[test]
    fn render_skips_invisible_card() {
        let c = card();
        let mut out = FrameBuffers::new();
        c.render(0.0, 1.0, &mut out);
        c.render(3.0, 1.0, &mut out);
        out.instances.finish();
        assert_eq!(out.instances.instance_count(), 1);
        assert_eq!(out.instances.instances()[0].scale, TITLE_SIZE);
    }
}

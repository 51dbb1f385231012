//! Bolt and spark output. Particles, highlights and paylines draw
//! themselves; bolts are plain data from the effects layer and are turned
//! into ribbons and sprites here.

use crate::effects::{LightningBolt, LightningPath};
use crate::renderer::{FrameBuffers, RenderInstance, SpriteVisual};

/// Spark sprite size in pixels.
const SPARK_SIZE: f32 = 6.0;

/// Soft halo drawn under every bolt path, as a multiple of its width.
const HALO_WIDTH: f32 = 3.0;

fn render_path(path: &LightningPath, out: &mut FrameBuffers) {
    if path.alpha <= 0.0 {
        return;
    }
    out.ribbon(&path.points, path.width * HALO_WIDTH * 0.5, path.color.fade(path.alpha * 0.3));
    out.ribbon(&path.points, path.width * 0.5, path.color.fade(path.alpha));
}

/// Ribbons for the main path and its forks, sprites for the sparks.
pub fn render_bolt(bolt: &LightningBolt, owner: f32, out: &mut FrameBuffers) {
    render_path(&bolt.main, out);
    for branch in &bolt.branches {
        render_path(branch, out);
    }
    for spark in &bolt.sparks {
        let alpha = spark.alpha();
        if alpha <= 0.0 {
            continue;
        }
        out.push_sprite(
            SpriteVisual::Spark,
            RenderInstance {
                x: spark.position.x,
                y: spark.position.y,
                rotation: spark.velocity.to_angle(),
                scale: SPARK_SIZE * (0.5 + 0.5 * alpha),
                alpha,
                visual: SpriteVisual::Spark.code(),
                textured: 0.0,
                owner,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{LightningConfig, Rng};
    use glam::Vec2;

    #[test]
    fn bolt_emits_ribbons_and_sparks() {
        let mut rng = Rng::new(42);
        let config = LightningConfig { branch_count: 0, ..Default::default() };
        let bolt = LightningBolt::strike(Vec2::ZERO, Vec2::new(300.0, 0.0), &config, &mut rng);
        let mut out = FrameBuffers::new();
        render_bolt(&bolt, 3.0, &mut out);
        out.instances.finish();

        // halo + core, 65 points each: (65 + 2) pairs -> 132 triangles
        assert_eq!(out.effects.len(), 2 * 132 * 3);
        assert_eq!(out.instances.instance_count(), config.spark_count);
        assert!(out.instances.instances().iter().all(|i| i.owner == 3.0));
    }

    #[test]
    fn faded_bolt_draws_nothing() {
        let mut rng = Rng::new(1);
        let config = LightningConfig { spark_count: 0, ..Default::default() };
        let mut bolt = LightningBolt::strike(Vec2::ZERO, Vec2::new(100.0, 50.0), &config, &mut rng);
        while bolt.tick(0.1) {}
        let mut out = FrameBuffers::new();
        render_bolt(&bolt, 1.0, &mut out);
        assert!(out.effects.is_empty());
    }
}

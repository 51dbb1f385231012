use bytemuck::{Pod, Zeroable};

use crate::effects::ParticleKind;

/// What a sprite instance shows. Encoded into [`RenderInstance::visual`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteVisual {
    Particle(ParticleKind),
    /// Twinkle orbiting a highlighted symbol.
    Orbiter,
    /// Spark thrown off a lightning bolt.
    Spark,
    /// Win title card; the host looks its text up by owner handle.
    Title,
}

impl SpriteVisual {
    pub fn code(self) -> f32 {
        match self {
            SpriteVisual::Particle(kind) => kind as u32 as f32,
            SpriteVisual::Orbiter => 5.0,
            SpriteVisual::Spark => 6.0,
            SpriteVisual::Title => 7.0,
        }
    }

    /// Drawn in the additive pass.
    pub fn is_additive(self) -> bool {
        matches!(
            self,
            SpriteVisual::Particle(ParticleKind::Sparkle | ParticleKind::Star)
                | SpriteVisual::Orbiter
                | SpriteVisual::Spark
        )
    }
}

/// Per-instance render data read by the host renderer.
/// 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    pub x: f32,
    pub y: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Rendered size in preview pixels.
    pub scale: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    /// [`SpriteVisual::code`].
    pub visual: f32,
    /// 1.0 when the configured texture should be drawn, 0.0 for the glyph.
    pub textured: f32,
    /// Handle of the effect that owns the instance.
    pub owner: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Sprite instances for one frame: alpha-blended first, then additive
/// from `additive_split` on.
#[derive(Debug, Default)]
pub struct RenderBuffer {
    alpha: Vec<RenderInstance>,
    additive: Vec<RenderInstance>,
    instances: Vec<RenderInstance>,
    additive_split: u32,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self {
            alpha: Vec::with_capacity(512),
            additive: Vec::with_capacity(512),
            instances: Vec::with_capacity(1024),
            additive_split: 0,
        }
    }

    pub fn clear(&mut self) {
        self.alpha.clear();
        self.additive.clear();
        self.instances.clear();
        self.additive_split = 0;
    }

    pub fn push(&mut self, visual: SpriteVisual, instance: RenderInstance) {
        if visual.is_additive() {
            self.additive.push(instance);
        } else {
            self.alpha.push(instance);
        }
    }

    /// Concatenate both passes into the readable buffer.
    pub fn finish(&mut self) {
        self.instances.clear();
        self.instances.extend_from_slice(&self.alpha);
        self.additive_split = self.alpha.len() as u32;
        self.instances.extend_from_slice(&self.additive);
    }

    pub fn instances(&self) -> &[RenderInstance] {
        &self.instances
    }

    pub fn additive_split(&self) -> u32 {
        self.additive_split
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for the host to read.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

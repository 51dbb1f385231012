pub mod api;
pub mod core;
pub mod effects;
pub mod systems;
pub mod renderer;
pub mod assets;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::config::{PreviewConfig, SpinOutcome, DEFAULT_SURFACE_TAG};
pub use api::error::ConfigError;
pub use api::preview::{ChangeCallback, Preview, PreviewAction};
pub use api::types::{EffectHandle, PreviewEvent, ResultType, SoundEvent, Tier, WinAnimationKind};
pub use core::grid::{Cell, GridConfig, Rect};
pub use core::schedule::{Scheduler, TimerId};
pub use core::stage::{NodeId, NodeKind, OverlayNode, Stage, Surface};
pub use core::time::FrameClock;
pub use renderer::{Capabilities, FrameBuffers, GlowInstance, RenderBuffer, RenderInstance, SpriteVisual};
pub use assets::{normalize_asset_ref, AssetRef};
pub use effects::{Color, EffectsVertex, LightningConfig, ParticleKind, Rng, MAX_PARTICLES};
pub use systems::celebration::{ParticleTypeConfig, TierConfig};
pub use systems::highlight::HighlightConfig;
pub use systems::payline::{Payline, PaylineStyle, StrokeStyle};
pub use systems::reels::{AnticipationConfig, ReelConfig};

#[cfg(feature = "vectors")]
pub use systems::vector::{VectorState, VectorVertex};

// Extensions: timing curves shared by every system
pub use extensions::{Easing, CubicBezier, SpinCurve};

pub mod instance;
pub mod frame;
pub mod glow;

pub use frame::FrameBuffers;
pub use glow::{select_glow, Capabilities, ColorMatrix, CompositeGlow, Glow, GlowBackend, GlowInstance, NativeGlow};
pub use instance::{RenderBuffer, RenderInstance, SpriteVisual};

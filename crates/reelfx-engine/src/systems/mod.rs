pub mod payline;
pub mod reels;
pub mod highlight;
pub mod title;
pub mod celebration;
pub mod render;
#[cfg(feature = "vectors")]
pub mod vector;

pub mod asset_ref;

pub use asset_ref::{normalize_asset_ref, AssetRef};

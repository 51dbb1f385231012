pub mod config;
pub mod error;
pub mod preview;
pub mod types;

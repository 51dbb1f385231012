pub mod time;
pub mod schedule;
pub mod grid;
pub mod stage;

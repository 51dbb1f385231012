//! Reel grid geometry: cell coordinates to preview pixels.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::error::ConfigError;

/// A grid cell addressed by reel (column) and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub reel: u32,
    pub row: u32,
}

impl Cell {
    pub const fn new(reel: u32, row: u32) -> Self {
        Self { reel, row }
    }
}

/// Axis-aligned rectangle in preview pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Grow by `amount` on every side.
    pub fn inflate(&self, amount: f32) -> Rect {
        Rect {
            min: self.min - Vec2::splat(amount),
            size: self.size + Vec2::splat(amount * 2.0),
        }
    }

    /// Corners clockwise from the top-left.
    pub fn corners(&self) -> [Vec2; 4] {
        let max = self.max();
        [self.min, Vec2::new(max.x, self.min.y), max, Vec2::new(self.min.x, max.y)]
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.y >= self.min.y && p.x <= max.x && p.y <= max.y
    }
}

/// Layout of the symbol grid inside the preview surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Top-left corner of cell (0, 0).
    pub origin: [f32; 2],
    pub cell_width: f32,
    pub cell_height: f32,
    /// Gap between neighbouring cells.
    pub spacing: f32,
    pub reels: u32,
    pub rows: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin: [40.0, 40.0],
            cell_width: 120.0,
            cell_height: 120.0,
            spacing: 8.0,
            reels: 5,
            rows: 3,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reels == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid { reels: self.reels, rows: self.rows });
        }
        ConfigError::check_finite("grid.origin.x", self.origin[0])?;
        ConfigError::check_finite("grid.origin.y", self.origin[1])?;
        ConfigError::check_positive("grid.cell_width", self.cell_width)?;
        ConfigError::check_positive("grid.cell_height", self.cell_height)?;
        ConfigError::check_non_negative("grid.spacing", self.spacing)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.reel < self.reels && cell.row < self.rows
    }

    /// Bounding box of a cell.
    pub fn cell_rect(&self, cell: Cell) -> Rect {
        let min = Vec2::new(
            self.origin[0] + cell.reel as f32 * (self.cell_width + self.spacing),
            self.origin[1] + cell.row as f32 * (self.cell_height + self.spacing),
        );
        Rect::new(min, Vec2::new(self.cell_width, self.cell_height))
    }

    /// Pixel center of a cell.
    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        self.cell_rect(cell).center()
    }

    /// Bounding box of the whole grid.
    pub fn bounds(&self) -> Rect {
        let size = Vec2::new(
            self.reels as f32 * self.cell_width + self.reels.saturating_sub(1) as f32 * self.spacing,
            self.rows as f32 * self.cell_height + self.rows.saturating_sub(1) as f32 * self.spacing,
        );
        Rect::new(Vec2::from(self.origin), size)
    }
}

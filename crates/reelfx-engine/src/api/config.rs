use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::types::{ResultType, Tier};
use crate::core::grid::{Cell, GridConfig};
use crate::effects::{LightningConfig, MAX_PARTICLES};
use crate::systems::celebration::TierConfig;
use crate::systems::highlight::HighlightConfig;
use crate::systems::payline::{Payline, PaylineStyle};
use crate::systems::reels::ReelConfig;

/// Surface the preview draws on unless configured otherwise.
pub const DEFAULT_SURFACE_TAG: &str = "preview-grid";

/// Scripted result of a preview spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub result: ResultType,
    /// Symbol ids per reel, top to bottom.
    pub symbols: Vec<Vec<u32>>,
    /// Indices into the configured paylines.
    #[serde(default)]
    pub winning_lines: Vec<usize>,
}

/// Everything the preview needs, injected by value. The editor builds this
/// from its settings and hands over a fresh copy whenever they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Tag of the surface effects are drawn on.
    pub surface_tag: String,
    pub grid: GridConfig,
    pub reels: ReelConfig,
    pub paylines: Vec<Payline>,
    pub payline_style: PaylineStyle,
    pub highlight: HighlightConfig,
    pub lightning: LightningConfig,
    pub tiers: Vec<TierConfig>,
    pub outcomes: Vec<SpinOutcome>,
    /// Particle cap across all kinds of one celebration.
    pub max_particles: u32,
    /// Simulation step in seconds.
    pub fixed_dt: f32,
    /// Lifetime of highlight, lightning and fountain win animations.
    pub win_animation_duration: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        let grid = GridConfig::default();
        let paylines = vec![
            Payline::row(1, grid.reels),
            Payline::row(0, grid.reels),
            Payline::row(2, grid.reels),
            Payline::new(vec![
                Cell::new(0, 0),
                Cell::new(1, 1),
                Cell::new(2, 2),
                Cell::new(3, 1),
                Cell::new(4, 0),
            ]),
        ];
        let column = |reel: u32, hit: Option<u32>| -> Vec<u32> {
            (0..grid.rows).map(|row| hit.unwrap_or(reel * grid.rows + row) % 10).collect()
        };
        let outcome = |result: ResultType, lines: Vec<usize>, hit: Option<u32>| SpinOutcome {
            result,
            symbols: (0..grid.reels).map(|reel| column(reel, hit)).collect(),
            winning_lines: lines,
        };
        Self {
            surface_tag: DEFAULT_SURFACE_TAG.to_string(),
            grid,
            reels: ReelConfig::default(),
            paylines,
            payline_style: PaylineStyle::default(),
            highlight: HighlightConfig::default(),
            lightning: LightningConfig::default(),
            tiers: Tier::ALL.iter().map(|t| TierConfig::for_tier(*t)).collect(),
            outcomes: vec![
                outcome(ResultType::Lose, vec![], None),
                outcome(ResultType::SmallWin, vec![0], Some(3)),
                outcome(ResultType::BigWin, vec![0, 1], Some(5)),
                outcome(ResultType::MegaWin, vec![0, 1, 2], Some(7)),
                outcome(ResultType::SuperWin, vec![0, 1, 2, 3], Some(9)),
            ],
            max_particles: MAX_PARTICLES,
            fixed_dt: 1.0 / 60.0,
            win_animation_duration: 3.0,
        }
    }
}

impl PreviewConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PreviewConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.surface_tag.trim().is_empty() {
            return Err(ConfigError::EmptySurfaceTag);
        }
        self.grid.validate()?;
        self.reels.validate()?;
        self.payline_style.validate()?;
        self.highlight.validate()?;
        self.lightning.validate()?;
        ConfigError::check_positive("fixed_dt", self.fixed_dt)?;
        ConfigError::check_positive("win_animation_duration", self.win_animation_duration)?;
        ConfigError::check_positive("max_particles", self.max_particles as f32)?;

        for (line, payline) in self.paylines.iter().enumerate() {
            if let Some(cell) = payline.positions.iter().find(|c| !self.grid.contains(**c)) {
                return Err(ConfigError::PaylineOutOfGrid {
                    line,
                    reel: cell.reel,
                    row: cell.row,
                    reels: self.grid.reels,
                    rows: self.grid.rows,
                });
            }
        }

        for (i, tier) in self.tiers.iter().enumerate() {
            if self.tiers[..i].iter().any(|t| t.tier == tier.tier) {
                return Err(ConfigError::DuplicateTier(tier.tier));
            }
            tier.validate()?;
        }

        for outcome in &self.outcomes {
            if outcome.symbols.len() != self.grid.reels as usize {
                return Err(ConfigError::OutcomeShape {
                    result: outcome.result,
                    got: outcome.symbols.len(),
                    expected: self.grid.reels as usize,
                });
            }
            if let Some(&line) = outcome.winning_lines.iter().find(|l| **l >= self.paylines.len()) {
                return Err(ConfigError::UnknownPayline {
                    result: outcome.result,
                    line,
                    available: self.paylines.len(),
                });
            }
        }
        Ok(())
    }

    /// Settings for `tier`; stock settings when the tier isn't configured.
    pub fn tier(&self, tier: Tier) -> TierConfig {
        self.tiers
            .iter()
            .find(|t| t.tier == tier)
            .cloned()
            .unwrap_or_else(|| TierConfig::for_tier(tier))
    }

    pub fn outcome(&self, result: ResultType) -> Option<&SpinOutcome> {
        self.outcomes.iter().find(|o| o.result == result)
    }
}

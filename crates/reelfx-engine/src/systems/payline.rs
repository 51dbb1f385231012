//! Payline paths: grid cells to a stroked polyline that draws itself in.
//!
//! The reveal mirrors an SVG dash-offset animation: the offset runs from the
//! path length down to zero with CSS `ease-out`, so the visible length is
//! `length - offset`. Timing is relative to the run's start; the preview
//! anchors it to its clock.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::error::ConfigError;
use crate::core::grid::{Cell, GridConfig};
use crate::effects::{dash_polyline, polyline_length, polyline_prefix, Color};
use crate::extensions::Easing;
use crate::renderer::FrameBuffers;

/// Dash pattern for [`StrokeStyle::Dashed`]: 10 on, 5 off.
pub const DASH_PATTERN: [f32; 2] = [10.0, 5.0];

/// Delay between consecutive symbol highlights on one line.
pub const HIGHLIGHT_STAGGER: f32 = 0.2;

/// Period of the pulsing stroke, seconds.
pub const PULSE_PERIOD: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Glowing,
    Pulsing,
}

/// An ordered list of grid cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payline {
    pub positions: Vec<Cell>,
}

impl Payline {
    pub fn new(positions: Vec<Cell>) -> Self {
        Self { positions }
    }

    /// A straight line across `row`.
    pub fn row(row: u32, reels: u32) -> Self {
        Self::new((0..reels).map(|reel| Cell::new(reel, row)).collect())
    }

    /// Pixel centers of the cells, in order.
    pub fn points(&self, grid: &GridConfig) -> Vec<Vec2> {
        self.positions.iter().map(|c| grid.cell_center(*c)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaylineStyle {
    pub style: StrokeStyle,
    pub width: f32,
    pub color: Color,
    /// Reveal duration in seconds.
    pub speed: f32,
    /// Curve the dash offset follows while a line draws in.
    pub reveal_easing: Easing,
    pub symbol_highlight: bool,
    /// Seconds each symbol highlight stays up.
    pub symbol_highlight_duration: f32,
    pub highlight_color: Color,
    pub highlight_border: f32,
    /// Drop-shadow color for [`StrokeStyle::Glowing`].
    pub glow_color: Color,
}

impl Default for PaylineStyle {
    fn default() -> Self {
        Self {
            style: StrokeStyle::Solid,
            width: 4.0,
            color: Color::GOLD,
            speed: 0.8,
            reveal_easing: Easing::EaseOut,
            symbol_highlight: true,
            symbol_highlight_duration: 1.5,
            highlight_color: Color::GOLD,
            highlight_border: 3.0,
            glow_color: Color::GOLD.with_alpha(0.6),
        }
    }
}

impl PaylineStyle {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("payline_style.width", self.width)?;
        ConfigError::check_positive("payline_style.speed", self.speed)?;
        ConfigError::check_non_negative("payline_style.symbol_highlight_duration", self.symbol_highlight_duration)?;
        ConfigError::check_non_negative("payline_style.highlight_border", self.highlight_border)
    }

    /// Stroke width and opacity at `elapsed` seconds into a line.
    pub fn stroke_at(&self, elapsed: f32) -> (f32, f32) {
        match self.style {
            StrokeStyle::Solid | StrokeStyle::Dashed => (self.width, 1.0),
            StrokeStyle::Glowing => (self.width * 1.2, 1.0),
            StrokeStyle::Pulsing => {
                let s = (elapsed * std::f32::consts::TAU / PULSE_PERIOD).sin();
                (self.width * 1.1 * (1.0 + 0.15 * s), 0.75 + 0.25 * s)
            }
        }
    }
}

/// One symbol highlight box to show, relative to the run's start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightCue {
    pub line: usize,
    pub cell: Cell,
    pub at: f32,
    pub duration: f32,
}

/// Reveal plan for one payline.
#[derive(Debug, Clone)]
pub struct LinePlan {
    /// Index into the configured payline list.
    pub line: usize,
    pub cells: Vec<Cell>,
    pub points: Vec<Vec2>,
    pub length: f32,
    pub reveal_start: f32,
}

impl LinePlan {
    /// Dash offset at `elapsed` seconds into the run: `length` before the
    /// reveal starts, eased down to zero over `style.speed` seconds.
    pub fn dash_offset(&self, elapsed: f32, style: &PaylineStyle) -> f32 {
        let local = elapsed - self.reveal_start;
        if local <= 0.0 {
            return self.length;
        }
        let p = if style.speed > 0.0 { (local / style.speed).min(1.0) } else { 1.0 };
        self.length * (1.0 - style.reveal_easing.apply(p)).max(0.0)
    }

    pub fn revealed_length(&self, elapsed: f32, style: &PaylineStyle) -> f32 {
        self.length - self.dash_offset(elapsed, style)
    }

    /// Polylines visible at `elapsed`: the revealed prefix, cut into dashes
    /// for the dashed style.
    pub fn visible_runs(&self, elapsed: f32, style: &PaylineStyle) -> Vec<Vec<Vec2>> {
        let shown = self.revealed_length(elapsed, style);
        if shown <= 0.0 {
            return Vec::new();
        }
        let prefix = polyline_prefix(&self.points, shown);
        match style.style {
            StrokeStyle::Dashed => dash_polyline(&prefix, DASH_PATTERN[0], DASH_PATTERN[1]),
            _ if prefix.len() >= 2 => vec![prefix],
            _ => Vec::new(),
        }
    }
}

/// A drawn set of paylines: per-line plans plus the highlight schedule.
#[derive(Debug, Clone)]
pub struct PaylineRun {
    pub style: PaylineStyle,
    lines: Vec<LinePlan>,
    highlights: Vec<HighlightCue>,
}

/// Lay out the reveal of `paylines` (given as `(index, payline)` pairs).
/// Sequential runs start line `i` at `i * pause_between_lines`; otherwise
/// every line starts at zero.
pub fn draw<'a>(
    paylines: impl IntoIterator<Item = (usize, &'a Payline)>,
    style: &PaylineStyle,
    grid: &GridConfig,
    sequential: bool,
    pause_between_lines: f32,
) -> PaylineRun {
    let mut lines = Vec::new();
    let mut highlights = Vec::new();
    for (i, (line, payline)) in paylines.into_iter().enumerate() {
        let reveal_start = if sequential { i as f32 * pause_between_lines.max(0.0) } else { 0.0 };
        let points = payline.points(grid);
        if style.symbol_highlight {
            highlights.extend(payline.positions.iter().enumerate().map(|(k, cell)| HighlightCue {
                line,
                cell: *cell,
                at: reveal_start + k as f32 * HIGHLIGHT_STAGGER,
                duration: style.symbol_highlight_duration,
            }));
        }
        lines.push(LinePlan {
            line,
            cells: payline.positions.clone(),
            length: polyline_length(&points),
            points,
            reveal_start,
        });
    }
    log::debug!("payline run: {} lines, {} highlights", lines.len(), highlights.len());
    PaylineRun { style: *style, lines, highlights }
}

impl PaylineRun {
    pub fn lines(&self) -> &[LinePlan] {
        &self.lines
    }

    pub fn highlights(&self) -> &[HighlightCue] {
        &self.highlights
    }

    /// Seconds until the last line has fully drawn in.
    pub fn reveal_end(&self) -> f32 {
        self.lines
            .iter()
            .map(|l| l.reveal_start + self.style.speed)
            .fold(0.0, f32::max)
    }

    pub fn render(&self, elapsed: f32, out: &mut FrameBuffers) {
        for plan in &self.lines {
            let runs = plan.visible_runs(elapsed, &self.style);
            if runs.is_empty() {
                continue;
            }
            let (width, alpha) = self.style.stroke_at(elapsed - plan.reveal_start);
            if self.style.style == StrokeStyle::Glowing {
                for run in &runs {
                    out.stroke_polyline(run, width * 3.0, self.style.glow_color.fade(0.5));
                }
            }
            let color = self.style.color.fade(alpha);
            for run in &runs {
                out.stroke_polyline(run, width, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridConfig {
        GridConfig::default()
    }

    fn four_rows() -> Vec<Payline> {
        (0..4).map(|r| Payline::row(r % 3, 5)).collect()
    }

    #[test]
    fn sequential_reveal_offsets() {
        let lines = four_rows();
        let run = draw(lines.iter().enumerate(), &PaylineStyle::default(), &grid(), true, 0.3);
        let starts: Vec<f32> = run.lines().iter().map(|l| l.reveal_start).collect();
        for (got, want) in starts.iter().zip([0.0, 0.3, 0.6, 0.9]) {
            assert!((got - want).abs() < 1e-5, "{starts:?}");
        }
    }

    #[test]
    fn simultaneous_reveal_starts_together() {
        let lines = four_rows();
        let run = draw(lines.iter().enumerate(), &PaylineStyle::default(), &grid(), false, 0.3);
        assert!(run.lines().iter().all(|l| l.reveal_start == 0.0));
        assert!((run.reveal_end() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn path_runs_through_cell_centers() {
        let line = Payline::new(vec![Cell::new(0, 0), Cell::new(1, 1), Cell::new(2, 0)]);
        let run = draw([(0, &line)], &PaylineStyle::default(), &grid(), false, 0.0);
        let plan = &run.lines()[0];
        assert_eq!(plan.points[1], Vec2::new(228.0, 228.0));
        let leg = Vec2::new(128.0, 128.0).length();
        assert!((plan.length - 2.0 * leg).abs() < 1e-3);
    }

    #[test]
    fn dash_offset_eases_to_zero() {
        let line = Payline::row(0, 5);
        let style = PaylineStyle::default();
        let run = draw([(0, &line)], &style, &grid(), false, 0.0);
        let plan = &run.lines()[0];
        assert_eq!(plan.dash_offset(-1.0, &style), plan.length);
        assert_eq!(plan.dash_offset(0.0, &style), plan.length);
        assert_eq!(plan.dash_offset(0.8, &style), 0.0);
        assert_eq!(plan.dash_offset(5.0, &style), 0.0);
        // ease-out front-loads the reveal
        assert!(plan.revealed_length(0.4, &style) > plan.length * 0.5);

        let linear = PaylineStyle { reveal_easing: Easing::Linear, ..style };
        assert!((plan.revealed_length(0.4, &linear) - plan.length * 0.5).abs() < 1e-3);
    }

    #[test]
    fn highlights_stagger_within_line() {
        let lines = four_rows();
        let run = draw(lines.iter().enumerate(), &PaylineStyle::default(), &grid(), true, 0.3);
        let second: Vec<f32> = run.highlights().iter().filter(|h| h.line == 1).map(|h| h.at).collect();
        assert_eq!(second.len(), 5);
        for (k, at) in second.iter().enumerate() {
            assert!((at - (0.3 + k as f32 * HIGHLIGHT_STAGGER)).abs() < 1e-5);
        }
        assert!(run.highlights().iter().all(|h| h.duration == 1.5));
    }

    #[test]
    fn highlights_can_be_disabled() {
        let style = PaylineStyle { symbol_highlight: false, ..Default::default() };
        let line = Payline::row(1, 5);
        assert!(draw([(0, &line)], &style, &grid(), false, 0.0).highlights().is_empty());
    }

    #[test]
    fn dashed_reveal_keeps_gaps() {
        let style = PaylineStyle { style: StrokeStyle::Dashed, ..Default::default() };
        let line = Payline::row(0, 5);
        let run = draw([(0, &line)], &style, &grid(), false, 0.0);
        let plan = &run.lines()[0];
        let full = plan.visible_runs(10.0, &style);
        // 512px / 15px pattern
        assert_eq!(full.len(), 35);
        let partial = plan.visible_runs(0.1, &style);
        assert!(!partial.is_empty() && partial.len() < full.len());
    }

    #[test]
    fn stroke_variants() {
        let mut style = PaylineStyle::default();
        assert_eq!(style.stroke_at(0.3), (4.0, 1.0));
        style.style = StrokeStyle::Glowing;
        assert!((style.stroke_at(0.0).0 - 4.8).abs() < 1e-6);
        style.style = StrokeStyle::Pulsing;
        let (w0, a0) = style.stroke_at(0.0);
        let (w1, a1) = style.stroke_at(PULSE_PERIOD * 0.25);
        assert!((w0 - 4.4).abs() < 1e-5 && (a0 - 0.75).abs() < 1e-6);
        assert!(w1 > w0 && a1 > a0);
    }

    #[test]
    fn single_cell_line_draws_nothing() {
        let line = Payline::new(vec![Cell::new(2, 1)]);
        let run = draw([(0, &line)], &PaylineStyle::default(), &grid(), false, 0.0);
        assert_eq!(run.lines()[0].length, 0.0);
        let mut out = FrameBuffers::new();
        run.render(5.0, &mut out);
        assert_eq!(out.vector_vertex_count(), 0);
        assert!(out.effects.is_empty());
        assert_eq!(run.highlights().len(), 1);
    }

    #[test]
    fn render_emits_geometry_once_revealed() {
        let line = Payline::row(0, 5);
        let run = draw([(0, &line)], &PaylineStyle::default(), &grid(), false, 0.0);
        let mut out = FrameBuffers::new();
        run.render(0.0, &mut out);
        assert_eq!(out.vector_vertex_count(), 0);
        assert!(out.effects.is_empty());
        run.render(1.0, &mut out);
        assert!(out.vector_vertex_count() > 0 || !out.effects.is_empty());
    }
}

//! The preview facade.
//!
//! A `Preview` owns one injected config, a seeded RNG, the fixed-step clock,
//! the scheduler and every running effect. Triggers return an
//! [`EffectHandle`]; all timers, overlay nodes, particles, bolts and reel
//! motion created by a trigger hang off that handle and go away together.

use glam::Vec2;

use super::config::{PreviewConfig, SpinOutcome};
use super::error::ConfigError;
use super::types::{EffectHandle, PreviewEvent, ResultType, SoundEvent, Tier, WinAnimationKind};
use crate::core::grid::{Cell, GridConfig, Rect};
use crate::core::schedule::Scheduler;
use crate::core::stage::{NodeKind, Stage};
use crate::core::time::FrameClock;
use crate::effects::{LightningBolt, ParticleBudget, Rng};
use crate::renderer::{select_glow, Capabilities, FrameBuffers, GlowBackend};
use crate::systems::celebration::{Celebration, TierConfig};
use crate::systems::highlight::WinHighlightEffect;
use crate::systems::payline::{self, PaylineRun};
use crate::systems::reels::{ReelEvent, ReelSpinController, SHAKE_INTERVAL};
use crate::systems::render::render_bolt;

/// Called with the new config after every successful `update_config`.
pub type ChangeCallback = Box<dyn FnMut(&PreviewConfig)>;

/// Time between lightning strikes along a line of winning symbols.
const STRIKE_STAGGER: f32 = 0.1;

/// Time between lightning volleys.
const STRIKE_INTERVAL: f32 = 0.8;

/// Opacity of the fill behind a symbol highlight box, relative to its border.
const HIGHLIGHT_FILL: f32 = 0.2;

/// Extra time a spin gets past its nominal end before it is force-stopped.
const SPIN_GRACE: f32 = 1.0;

/// Deferred work, always owned by an effect handle.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewAction {
    StartReel(usize),
    ShakeTick,
    EndShake,
    ShowHighlight { cell: Cell, duration: f32 },
    Strike { from: Vec2, to: Vec2 },
    /// Hard deadline: tear the effect down.
    Finish,
}

/// One trigger's worth of running state.
struct Effect {
    handle: EffectHandle,
    deadline: f32,
    celebration: Option<Celebration>,
    paylines: Option<(PaylineRun, f32)>,
    spin: Option<ReelSpinController>,
    highlight: Option<WinHighlightEffect>,
    bolts: Vec<LightningBolt>,
    title: Option<String>,
}

impl Effect {
    fn new(handle: EffectHandle, deadline: f32) -> Self {
        Self {
            handle,
            deadline,
            celebration: None,
            paylines: None,
            spin: None,
            highlight: None,
            bolts: Vec::new(),
            title: None,
        }
    }
}

pub struct Preview {
    config: PreviewConfig,
    capabilities: Capabilities,
    glow: Box<dyn GlowBackend>,
    rng: Rng,
    clock: FrameClock,
    stage: Stage,
    scheduler: Scheduler<PreviewAction>,
    effects: Vec<Effect>,
    next_handle: u32,
    budget: ParticleBudget,
    last_outcome: Option<ResultType>,
    events: Vec<PreviewEvent>,
    sounds: Vec<SoundEvent>,
    frame: FrameBuffers,
    on_change: Option<ChangeCallback>,
}

impl Preview {
    /// Validate `config` and build a preview. The glow backend is chosen
    /// here, once, from `capabilities`.
    pub fn new(config: PreviewConfig, capabilities: Capabilities, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "preview ready: {}x{} grid on '{}', seed {seed}",
            config.grid.reels,
            config.grid.rows,
            config.surface_tag
        );
        Ok(Self {
            clock: FrameClock::new(config.fixed_dt),
            budget: ParticleBudget::new(config.max_particles),
            glow: select_glow(&capabilities),
            capabilities,
            config,
            rng: Rng::new(seed),
            stage: Stage::new(),
            scheduler: Scheduler::new(),
            effects: Vec::new(),
            next_handle: 1,
            last_outcome: None,
            events: Vec::new(),
            sounds: Vec::new(),
            frame: FrameBuffers::new(),
            on_change: None,
        })
    }

    pub fn set_on_change(&mut self, callback: ChangeCallback) {
        self.on_change = Some(callback);
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn glow_backend(&self) -> &'static str {
        self.glow.name()
    }

    pub fn now(&self) -> f32 {
        self.clock.now()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn frame(&self) -> &FrameBuffers {
        &self.frame
    }

    /// Swap in a new config. Running effects keep the settings they started
    /// with.
    pub fn update_config(&mut self, config: PreviewConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if config.fixed_dt != self.config.fixed_dt {
            self.clock.retime(config.fixed_dt);
        }
        self.budget = ParticleBudget::new(config.max_particles);
        self.config = config;
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.config);
        }
        log::info!("preview config updated");
        Ok(())
    }

    // -- surfaces --------------------------------------------------------

    pub fn add_surface(&mut self, tag: impl Into<String>, bounds: Rect) {
        self.stage.add_surface(tag, bounds);
    }

    pub fn remove_surface(&mut self, tag: &str) -> bool {
        self.stage.remove_surface(tag)
    }

    /// Top-left of the configured surface, or a warning if it is missing.
    fn surface_origin(&self, what: &str) -> Option<Vec2> {
        match self.stage.surface(&self.config.surface_tag) {
            Some(surface) => Some(surface.bounds.min),
            None => {
                log::warn!("surface '{}' not found, {what} skipped", self.config.surface_tag);
                None
            }
        }
    }

    /// The grid in surface coordinates.
    fn placed_grid(&self, origin: Vec2) -> GridConfig {
        let mut grid = self.config.grid;
        grid.origin = [grid.origin[0] + origin.x, grid.origin[1] + origin.y];
        grid
    }

    fn alloc_handle(&mut self) -> EffectHandle {
        let handle = EffectHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1).max(1);
        handle
    }

    // -- triggers --------------------------------------------------------

    /// Play the celebration for `tier`: fountain, title card, sound cue and
    /// the winning paylines of the matching outcome.
    pub fn trigger_animation(&mut self, tier: Tier) -> Option<EffectHandle> {
        let origin = self.surface_origin("celebration")?;
        let tier_config = self.config.tier(tier);
        let handle = self.alloc_handle();
        let now = self.now();
        let grid = self.placed_grid(origin);
        let bounds = grid.bounds();

        let mut effect = Effect::new(handle, now + tier_config.duration);
        let celebration = Celebration::launch(
            &tier_config,
            Vec2::new(bounds.center().x, bounds.max().y),
            bounds.center(),
            now,
            &self.budget,
            &mut self.rng,
        );
        if let Some(title) = celebration.title() {
            let rect = Rect::new(title.anchor - Vec2::new(bounds.size.x * 0.4, 48.0), Vec2::new(bounds.size.x * 0.8, 96.0));
            self.stage.add_node(
                &self.config.surface_tag,
                handle,
                NodeKind::WinTitle { text: title.text.clone() },
                rect,
                now,
                effect.deadline,
            );
            effect.title = Some(title.text.clone());
        }
        effect.celebration = Some(celebration);

        if tier_config.paylines {
            let lines = self
                .config
                .outcomes
                .iter()
                .find(|o| o.result.tier() == Some(tier))
                .map(|o| o.winning_lines.clone())
                .unwrap_or_default();
            if !lines.is_empty() {
                effect.paylines = Some((self.draw_paylines(handle, &lines, &grid, &tier_config, now, effect.deadline), now));
            }
        }

        if let Some(sound) = tier_config.sound {
            self.sounds.push(SoundEvent(sound));
        }
        self.scheduler.schedule_at(handle, effect.deadline, PreviewAction::Finish);
        log::info!("{tier:?} celebration started as effect {}", handle.0);
        self.effects.push(effect);
        Some(handle)
    }

    fn draw_paylines(
        &mut self,
        handle: EffectHandle,
        lines: &[usize],
        grid: &GridConfig,
        tier: &TierConfig,
        now: f32,
        deadline: f32,
    ) -> PaylineRun {
        let paylines = lines.iter().filter_map(|&i| self.config.paylines.get(i).map(|p| (i, p)));
        let run = payline::draw(paylines, &self.config.payline_style, grid, tier.sequential, tier.pause_between_lines);
        for plan in run.lines() {
            let rect = plan
                .points
                .iter()
                .fold(None::<(Vec2, Vec2)>, |acc, p| match acc {
                    None => Some((*p, *p)),
                    Some((lo, hi)) => Some((lo.min(*p), hi.max(*p))),
                })
                .map(|(lo, hi)| Rect::new(lo, hi - lo))
                .unwrap_or_default();
            self.stage.add_node(
                &self.config.surface_tag,
                handle,
                NodeKind::PaylinePath { line: plan.line },
                rect,
                now,
                deadline,
            );
        }
        for cue in run.highlights() {
            if now + cue.at < deadline {
                self.scheduler.schedule(
                    handle,
                    now,
                    cue.at,
                    PreviewAction::ShowHighlight { cell: cue.cell, duration: cue.duration },
                );
            }
        }
        run
    }

    /// Spin the reels onto the scripted outcome for `result`. `on_complete`
    /// runs once, after the last reel settles; it is dropped unfired if the
    /// spin is disposed first.
    pub fn preview_spin(
        &mut self,
        result: ResultType,
        on_complete: Option<Box<dyn FnOnce()>>,
    ) -> Option<EffectHandle> {
        self.surface_origin("spin")?;
        let reels = self.config.reels;
        let targets = match self.config.outcome(result) {
            Some(SpinOutcome { symbols, .. }) => symbols.clone(),
            None => self.random_symbols(),
        };
        let handle = self.alloc_handle();
        let now = self.now();

        let reel_count = targets.len();
        let controller = ReelSpinController::new(&reels, targets, on_complete);
        let ticks = reels.anticipation.ticks();
        for k in 0..ticks {
            self.scheduler.schedule(handle, now, k as f32 * SHAKE_INTERVAL, PreviewAction::ShakeTick);
        }
        let start = reels.anticipation.total();
        if ticks > 0 {
            self.scheduler.schedule(handle, now, start, PreviewAction::EndShake);
        }
        for i in 0..reel_count {
            self.scheduler.schedule(
                handle,
                now,
                start + i as f32 * reels.reel_start_delay,
                PreviewAction::StartReel(i),
            );
        }
        let last_start = start + reel_count.saturating_sub(1) as f32 * reels.reel_start_delay;
        let deadline = now + last_start + reels.spin_duration + reels.stop_jitter + reels.bounce_duration + SPIN_GRACE;
        self.scheduler.schedule_at(handle, deadline, PreviewAction::Finish);

        if let Some(sound) = reels.spin_sound {
            self.sounds.push(SoundEvent(sound));
        }
        let mut effect = Effect::new(handle, deadline);
        effect.spin = Some(controller);
        self.effects.push(effect);
        self.last_outcome = Some(result);
        log::info!("{result:?} spin started as effect {}", handle.0);
        Some(handle)
    }

    fn random_symbols(&mut self) -> Vec<Vec<u32>> {
        let grid = self.config.grid;
        (0..grid.reels)
            .map(|_| (0..grid.rows).map(|_| self.rng.next_int(10)).collect())
            .collect()
    }

    /// Cells to decorate for win animations: the winning lines of the last
    /// spin's outcome, else of the first outcome that has any, else the
    /// first payline.
    fn winning_cells(&self) -> Vec<Cell> {
        let from_outcome = |o: &SpinOutcome| -> Vec<usize> { o.winning_lines.clone() };
        let lines = self
            .last_outcome
            .and_then(|r| self.config.outcome(r))
            .map(from_outcome)
            .filter(|l| !l.is_empty())
            .or_else(|| {
                self.config
                    .outcomes
                    .iter()
                    .map(from_outcome)
                    .find(|l| !l.is_empty())
            })
            .unwrap_or_else(|| if self.config.paylines.is_empty() { vec![] } else { vec![0] });

        let mut cells: Vec<Cell> = Vec::new();
        for cell in lines
            .iter()
            .filter_map(|&i| self.config.paylines.get(i))
            .flat_map(|p| p.positions.iter())
        {
            if !cells.contains(cell) {
                cells.push(*cell);
            }
        }
        cells
    }

    /// Play a standalone win animation on the winning symbols.
    pub fn play_win_animation(&mut self, kind: WinAnimationKind) -> Option<EffectHandle> {
        let origin = self.surface_origin("win animation")?;
        let grid = self.placed_grid(origin);
        let cells = self.winning_cells();
        let handle = self.alloc_handle();
        let now = self.now();
        let duration = self.config.win_animation_duration;
        let mut effect = Effect::new(handle, now + duration);

        match kind {
            WinAnimationKind::Highlight => {
                let mut highlight = WinHighlightEffect::new(&self.config.highlight);
                for cell in &cells {
                    highlight.apply_to(*cell, grid.cell_rect(*cell), &mut self.rng);
                }
                effect.highlight = Some(highlight);
            }
            WinAnimationKind::Lightning => {
                let points: Vec<Vec2> = cells.iter().map(|c| grid.cell_center(*c)).collect();
                let pairs: Vec<(Vec2, Vec2)> = match points.as_slice() {
                    [] => Vec::new(),
                    [only] => vec![(Vec2::new(only.x, grid.bounds().min.y), *only)],
                    _ => points.windows(2).map(|w| (w[0], w[1])).collect(),
                };
                let mut volley = 0.0;
                while volley < duration * 0.7 && !pairs.is_empty() {
                    for (i, (from, to)) in pairs.iter().enumerate() {
                        self.scheduler.schedule(
                            handle,
                            now,
                            volley + i as f32 * STRIKE_STAGGER,
                            PreviewAction::Strike { from: *from, to: *to },
                        );
                    }
                    volley += STRIKE_INTERVAL;
                }
            }
            WinAnimationKind::Fountain => {
                let mut tier = TierConfig::for_tier(Tier::Big);
                tier.duration = duration;
                tier.emission_window = tier.emission_window.min(duration);
                tier.title = None;
                let bounds = grid.bounds();
                effect.celebration = Some(Celebration::launch(
                    &tier,
                    Vec2::new(bounds.center().x, bounds.max().y),
                    bounds.center(),
                    now,
                    &self.budget,
                    &mut self.rng,
                ));
            }
        }

        self.scheduler.schedule_at(handle, effect.deadline, PreviewAction::Finish);
        log::info!("{kind:?} win animation started as effect {} on {} cells", handle.0, cells.len());
        self.effects.push(effect);
        Some(handle)
    }

    // -- lifetime --------------------------------------------------------

    pub fn is_active(&self, handle: EffectHandle) -> bool {
        self.effects.iter().any(|e| e.handle == handle)
    }

    pub fn active_effects(&self) -> usize {
        self.effects.len()
    }

    /// Title text of a running celebration, for the host to lay out.
    pub fn title_text(&self, handle: EffectHandle) -> Option<&str> {
        self.effects.iter().find(|e| e.handle == handle)?.title.as_deref()
    }

    /// Release everything `handle` owns. Disposing twice is a no-op.
    pub fn dispose(&mut self, handle: EffectHandle) -> bool {
        let timers = self.scheduler.cancel_owner(handle);
        let nodes = self.stage.remove_owned(handle);
        let Some(idx) = self.effects.iter().position(|e| e.handle == handle) else {
            return false;
        };
        let mut effect = self.effects.swap_remove(idx);
        if let Some(spin) = effect.spin.as_mut() {
            spin.stop();
            if let Some(surface) = self.stage.surface_mut(&self.config.surface_tag) {
                surface.offset = Vec2::ZERO;
            }
        }
        self.events.push(PreviewEvent::effect_cancelled(handle));
        log::info!("effect {} disposed ({timers} timers, {nodes} nodes)", handle.0);
        true
    }

    /// Stop everything.
    pub fn dispose_all(&mut self) {
        let handles: Vec<EffectHandle> = self.effects.iter().map(|e| e.handle).collect();
        for handle in handles {
            self.dispose(handle);
        }
        self.scheduler.clear();
        self.stage.clear_nodes();
    }

    fn finish(&mut self, handle: EffectHandle) {
        self.scheduler.cancel_owner(handle);
        self.stage.remove_owned(handle);
        if let Some(idx) = self.effects.iter().position(|e| e.handle == handle) {
            let mut effect = self.effects.swap_remove(idx);
            if let Some(spin) = effect.spin.as_mut() {
                if !spin.is_complete() {
                    log::warn!("spin {} overran its deadline, stopped", handle.0);
                    spin.stop();
                }
            }
            self.events.push(PreviewEvent::effect_finished(handle));
        }
    }

    pub fn drain_events(&mut self) -> Vec<PreviewEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }

    // -- frame -----------------------------------------------------------

    /// Advance by a host frame delta and rebuild the frame buffers.
    pub fn tick(&mut self, dt: f32) {
        let steps = self.clock.accumulate(dt);
        for _ in 0..steps {
            let now = self.clock.step();
            self.step(now, self.clock.dt());
        }
        self.rebuild_frame();
    }

    fn step(&mut self, now: f32, dt: f32) {
        for (handle, action) in self.scheduler.drain_due(now) {
            self.run_action(handle, action, now);
        }

        let mut finished = Vec::new();
        for effect in &mut self.effects {
            if let Some(spin) = effect.spin.as_mut() {
                for ev in spin.update(now) {
                    match ev {
                        ReelEvent::Settled(reel) => {
                            self.events.push(PreviewEvent::reel_settled(effect.handle, reel));
                            if let Some(sound) = self.config.reels.stop_sound {
                                self.sounds.push(SoundEvent(sound));
                            }
                        }
                        ReelEvent::SpinComplete => {
                            self.events.push(PreviewEvent::spin_complete(effect.handle, spin.reel_count()));
                            finished.push(effect.handle);
                        }
                    }
                }
            }
            if let Some(highlight) = effect.highlight.as_mut() {
                highlight.update(dt);
            }
            if let Some(celebration) = effect.celebration.as_mut() {
                celebration.sweep(now);
            }
            effect.bolts.retain_mut(|b| b.tick(dt));
        }
        for handle in finished {
            self.finish(handle);
        }

        self.stage.sweep(now);
    }

    fn run_action(&mut self, handle: EffectHandle, action: PreviewAction, now: f32) {
        if action == PreviewAction::Finish {
            self.finish(handle);
            return;
        }
        let Some(effect) = self.effects.iter_mut().find(|e| e.handle == handle) else {
            return;
        };
        match action {
            PreviewAction::StartReel(i) => {
                if let Some(spin) = effect.spin.as_mut() {
                    spin.start_reel(i, now, &mut self.rng);
                }
            }
            PreviewAction::ShakeTick | PreviewAction::EndShake => {
                let Some(spin) = effect.spin.as_mut() else { return };
                if action == PreviewAction::ShakeTick {
                    spin.shake_tick(&mut self.rng);
                } else {
                    spin.end_shake();
                }
                if let Some(surface) = self.stage.surface_mut(&self.config.surface_tag) {
                    surface.offset = spin.shake();
                }
            }
            PreviewAction::ShowHighlight { cell, duration } => {
                let deadline = (now + duration).min(effect.deadline);
                let Some(origin) = self.stage.surface(&self.config.surface_tag).map(|s| s.bounds.min) else {
                    return;
                };
                let rect = self.placed_grid(origin).cell_rect(cell);
                let style = &self.config.payline_style;
                self.stage.add_node(
                    &self.config.surface_tag,
                    handle,
                    NodeKind::SymbolHighlight { cell, color: style.highlight_color, border: style.highlight_border },
                    rect,
                    now,
                    deadline,
                );
            }
            PreviewAction::Strike { from, to } => {
                effect.bolts.push(LightningBolt::strike(from, to, &self.config.lightning, &mut self.rng));
            }
            PreviewAction::Finish => {}
        }
    }

    fn rebuild_frame(&mut self) {
        let now = self.now();
        let out = &mut self.frame;
        out.clear();
        if let Some(surface) = self.stage.surface(&self.config.surface_tag) {
            out.shake = surface.offset;
            for node in surface.nodes() {
                if let NodeKind::SymbolHighlight { color, border, .. } = &node.kind {
                    out.fill_rect(node.rect, color.fade(HIGHLIGHT_FILL));
                    out.stroke_rect(node.rect, *border, *color);
                }
            }
        }
        for effect in &self.effects {
            let owner = effect.handle.0 as f32;
            if let Some((run, started_at)) = &effect.paylines {
                run.render(now - started_at, out);
            }
            if let Some(celebration) = &effect.celebration {
                celebration.render(now, owner, out);
            }
            if let Some(highlight) = &effect.highlight {
                highlight.render(owner, self.glow.as_ref(), out);
            }
            for bolt in &effect.bolts {
                render_bolt(bolt, owner, out);
            }
            if let Some(spin) = &effect.spin {
                spin.write_buffer(&mut out.reels);
            }
        }
        out.instances.finish();
    }
}

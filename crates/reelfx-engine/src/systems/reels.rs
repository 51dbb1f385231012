//! Reel spin state machine.
//!
//! Each reel runs `Idle -> Pending -> Spinning -> Bouncing -> Idle`. The
//! controller does no timekeeping of its own: the preview's scheduler calls
//! [`ReelSpinController::start_reel`] at each reel's staggered start and the
//! anticipation ticks, and [`ReelSpinController::update`] every frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::error::ConfigError;
use crate::effects::Rng;
use crate::extensions::{elastic_out, SpinCurve};

/// Symbols scrolled past per spin.
pub const SPIN_SYMBOLS: f32 = 10.0;

/// Interval between anticipation shake ticks, seconds.
pub const SHAKE_INTERVAL: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnticipationConfig {
    pub enabled: bool,
    /// Peak-to-peak shake in pixels.
    pub intensity: f32,
    pub duration: f32,
}

impl Default for AnticipationConfig {
    fn default() -> Self {
        Self { enabled: false, intensity: 6.0, duration: 1.0 }
    }
}

impl AnticipationConfig {
    /// Shake ticks to run, `round(duration * 10)`.
    pub fn ticks(&self) -> u32 {
        if !self.enabled {
            return 0;
        }
        (self.duration * 10.0).round().max(0.0) as u32
    }

    /// Seconds from the first tick until the container is reset.
    pub fn total(&self) -> f32 {
        self.ticks() as f32 * SHAKE_INTERVAL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    pub symbol_height: f32,
    pub spin_duration: f32,
    pub ease_in_duration: f32,
    pub ease_out_duration: f32,
    /// Delay between consecutive reel starts.
    pub reel_start_delay: f32,
    pub bounce_distance: f32,
    pub bounce_duration: f32,
    /// Each reel spins up to this many extra seconds, picked at random.
    pub stop_jitter: f32,
    pub anticipation: AnticipationConfig,
    pub spin_sound: Option<u32>,
    pub stop_sound: Option<u32>,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            symbol_height: 128.0,
            spin_duration: 2.0,
            ease_in_duration: 0.3,
            ease_out_duration: 0.5,
            reel_start_delay: 0.15,
            bounce_distance: 20.0,
            bounce_duration: 0.5,
            stop_jitter: 0.0,
            anticipation: AnticipationConfig::default(),
            spin_sound: None,
            stop_sound: None,
        }
    }
}

impl ReelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("reels.symbol_height", self.symbol_height)?;
        ConfigError::check_positive("reels.spin_duration", self.spin_duration)?;
        ConfigError::check_non_negative("reels.ease_in_duration", self.ease_in_duration)?;
        ConfigError::check_non_negative("reels.ease_out_duration", self.ease_out_duration)?;
        ConfigError::check_non_negative("reels.reel_start_delay", self.reel_start_delay)?;
        ConfigError::check_finite("reels.bounce_distance", self.bounce_distance)?;
        ConfigError::check_positive("reels.bounce_duration", self.bounce_duration)?;
        ConfigError::check_non_negative("reels.stop_jitter", self.stop_jitter)?;
        ConfigError::check_non_negative("reels.anticipation.intensity", self.anticipation.intensity)?;
        ConfigError::check_non_negative("reels.anticipation.duration", self.anticipation.duration)
    }

    pub fn spin_distance(&self) -> f32 {
        self.symbol_height * SPIN_SYMBOLS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelPhase {
    Idle,
    /// Waiting for its staggered start.
    Pending,
    Spinning,
    Bouncing,
}

impl ReelPhase {
    /// Wire code for the host reel buffer.
    pub fn code(self) -> f32 {
        match self {
            ReelPhase::Idle => 0.0,
            ReelPhase::Pending => 1.0,
            ReelPhase::Spinning => 2.0,
            ReelPhase::Bouncing => 3.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReelState {
    pub phase: ReelPhase,
    /// Container y offset relative to the resting position.
    pub offset_y: f32,
    pub initial_y: f32,
    /// Visible symbol ids, top to bottom.
    pub symbols: Vec<u32>,
    started_at: f32,
    spin_time: f32,
    bounce_started: f32,
}

impl ReelState {
    fn idle(symbols: Vec<u32>) -> Self {
        Self {
            phase: ReelPhase::Idle,
            offset_y: 0.0,
            initial_y: 0.0,
            symbols,
            started_at: 0.0,
            spin_time: 0.0,
            bounce_started: 0.0,
        }
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, ReelPhase::Spinning | ReelPhase::Bouncing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelEvent {
    /// Reel finished bouncing and is at rest.
    Settled(usize),
    /// Every reel settled; fired once per spin.
    SpinComplete,
}

/// Drives every reel of one spin and fires the completion callback once.
pub struct ReelSpinController {
    config: ReelConfig,
    curve: SpinCurve,
    reels: Vec<ReelState>,
    targets: Vec<Vec<u32>>,
    completed: usize,
    on_complete: Option<Box<dyn FnOnce()>>,
    shake: Vec2,
}

impl ReelSpinController {
    /// Prepare a spin landing on `targets` (one symbol column per reel).
    /// All reels start `Pending`.
    pub fn new(config: &ReelConfig, targets: Vec<Vec<u32>>, on_complete: Option<Box<dyn FnOnce()>>) -> Self {
        let reels = targets
            .iter()
            .map(|_| ReelState { phase: ReelPhase::Pending, ..ReelState::idle(Vec::new()) })
            .collect();
        Self {
            curve: SpinCurve::from_durations(config.spin_duration, config.ease_in_duration, config.ease_out_duration),
            config: *config,
            reels,
            targets,
            completed: 0,
            on_complete,
            shake: Vec2::ZERO,
        }
    }

    pub fn reels(&self) -> &[ReelState] {
        &self.reels
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.reels.len()
    }

    /// Current anticipation offset of the grid container.
    pub fn shake(&self) -> Vec2 {
        self.shake
    }

    /// One anticipation tick: jitter by up to half the intensity each way.
    pub fn shake_tick(&mut self, rng: &mut Rng) {
        let half = self.config.anticipation.intensity * 0.5;
        self.shake = Vec2::new(rng.signed() * half, rng.signed() * half);
    }

    pub fn end_shake(&mut self) {
        self.shake = Vec2::ZERO;
    }

    /// Start a pending reel. Jitter adds up to `stop_jitter` seconds.
    pub fn start_reel(&mut self, index: usize, now: f32, rng: &mut Rng) -> bool {
        let jitter = if self.config.stop_jitter > 0.0 { rng.range(0.0, self.config.stop_jitter) } else { 0.0 };
        let Some(reel) = self.reels.get_mut(index) else {
            return false;
        };
        if reel.phase != ReelPhase::Pending {
            return false;
        }
        reel.phase = ReelPhase::Spinning;
        reel.started_at = now;
        reel.spin_time = self.config.spin_duration + jitter;
        log::debug!("reel {index} spinning for {:.2}s", reel.spin_time);
        true
    }

    /// Spin progress `p` in [0, 1] to the container offset.
    pub fn spin_offset(&self, initial_y: f32, p: f32) -> f32 {
        initial_y - self.config.spin_distance() * self.curve.apply(p)
    }

    /// Bounce offset `t` seconds after landing.
    pub fn bounce_offset(&self, t: f32) -> f32 {
        let p = (t / self.config.bounce_duration).clamp(0.0, 1.0);
        self.config.bounce_distance * (1.0 - elastic_out(p))
    }

    /// Advance every reel to `now`. Reels may settle in any order.
    pub fn update(&mut self, now: f32) -> Vec<ReelEvent> {
        let mut events = Vec::new();
        for index in 0..self.reels.len() {
            match self.reels[index].phase {
                ReelPhase::Spinning => self.advance_spin(index, now, &mut events),
                ReelPhase::Bouncing => self.settle_bounce(index, now, &mut events),
                ReelPhase::Idle | ReelPhase::Pending => {}
            }
        }
        events
    }

    fn advance_spin(&mut self, index: usize, now: f32, events: &mut Vec<ReelEvent>) {
        let (started_at, spin_time, initial_y) = {
            let reel = &self.reels[index];
            (reel.started_at, reel.spin_time, reel.initial_y)
        };
        let p = if spin_time > 0.0 { (now - started_at) / spin_time } else { 1.0 };
        if p < 1.0 {
            let offset = self.spin_offset(initial_y, p);
            self.reels[index].offset_y = offset;
            return;
        }
        let symbols = self.targets.get(index).cloned().unwrap_or_default();
        let reel = &mut self.reels[index];
        reel.offset_y = initial_y;
        reel.symbols = symbols;
        reel.phase = ReelPhase::Bouncing;
        reel.bounce_started = started_at + spin_time;
        self.settle_bounce(index, now, events);
    }

    fn settle_bounce(&mut self, index: usize, now: f32, events: &mut Vec<ReelEvent>) {
        let t = now - self.reels[index].bounce_started;
        if t < self.config.bounce_duration {
            let offset = self.bounce_offset(t);
            self.reels[index].offset_y = offset;
            return;
        }
        let reel = &mut self.reels[index];
        reel.offset_y = reel.initial_y;
        reel.phase = ReelPhase::Idle;
        self.completed += 1;
        events.push(ReelEvent::Settled(index));
        if self.completed == self.reels.len() {
            if let Some(callback) = self.on_complete.take() {
                callback();
            }
            events.push(ReelEvent::SpinComplete);
        }
    }

    /// Cancel the spin: every reel back to rest, callback dropped unfired.
    pub fn stop(&mut self) {
        for reel in &mut self.reels {
            reel.phase = ReelPhase::Idle;
            reel.offset_y = reel.initial_y;
        }
        self.on_complete = None;
        self.shake = Vec2::ZERO;
    }

    /// Two floats per reel: offset and phase code.
    pub fn write_buffer(&self, out: &mut Vec<f32>) {
        for reel in &self.reels {
            out.extend_from_slice(&[reel.offset_y, reel.phase.code()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn targets(n: usize) -> Vec<Vec<u32>> {
        (0..n).map(|i| vec![i as u32, i as u32 + 1, i as u32 + 2]).collect()
    }

    fn counting(counter: &Rc<Cell<u32>>) -> Option<Box<dyn FnOnce()>> {
        let counter = Rc::clone(counter);
        Some(Box::new(move || counter.set(counter.get() + 1)))
    }

    #[test]
    fn completion_fires_exactly_once_with_jitter() {
        for seed in 1..20u64 {
            let mut rng = Rng::new(seed);
            let config = ReelConfig { stop_jitter: 0.7, ..Default::default() };
            let fired = Rc::new(Cell::new(0));
            let mut spin = ReelSpinController::new(&config, targets(5), counting(&fired));

            // start in a shuffled order at random times
            let mut order: Vec<usize> = (0..5).collect();
            for i in (1..order.len()).rev() {
                order.swap(i, rng.next_int(i as u32 + 1) as usize);
            }
            for (k, &reel) in order.iter().enumerate() {
                assert!(spin.start_reel(reel, k as f32 * rng.range(0.0, 0.3), &mut rng));
            }

            let mut complete_events = 0;
            let mut settled = Vec::new();
            let mut now = 0.0;
            while now < 10.0 {
                now += 1.0 / 60.0;
                for ev in spin.update(now) {
                    match ev {
                        ReelEvent::Settled(i) => settled.push(i),
                        ReelEvent::SpinComplete => complete_events += 1,
                    }
                }
            }
            assert_eq!(fired.get(), 1, "seed {seed}");
            assert_eq!(complete_events, 1);
            settled.sort_unstable();
            assert_eq!(settled, vec![0, 1, 2, 3, 4]);
            assert!(spin.reels().iter().all(|r| r.phase == ReelPhase::Idle && r.offset_y == 0.0));
        }
    }

    #[test]
    fn landing_swaps_in_target_symbols() {
        let mut rng = Rng::new(3);
        let mut spin = ReelSpinController::new(&ReelConfig::default(), targets(2), None);
        spin.start_reel(0, 0.0, &mut rng);
        spin.update(1.0);
        assert_eq!(spin.reels()[0].phase, ReelPhase::Spinning);
        assert!(spin.reels()[0].offset_y < 0.0);
        assert!(spin.reels()[0].symbols.is_empty());

        spin.update(2.05);
        assert_eq!(spin.reels()[0].phase, ReelPhase::Bouncing);
        assert_eq!(spin.reels()[0].symbols, vec![0, 1, 2]);
        assert_eq!(spin.reels()[1].phase, ReelPhase::Pending);
        assert!(!spin.is_complete());
    }

    #[test]
    fn spin_offset_is_continuous() {
        let config = ReelConfig { ease_in_duration: 0.5, ease_out_duration: 0.7, ..Default::default() };
        let spin = ReelSpinController::new(&config, targets(1), None);
        assert_eq!(spin.spin_offset(0.0, 0.0), 0.0);
        assert!((spin.spin_offset(0.0, 1.0) + config.spin_distance()).abs() < 1e-3);
        let mut prev = spin.spin_offset(0.0, 0.0);
        for i in 1..=1000 {
            let y = spin.spin_offset(0.0, i as f32 / 1000.0);
            assert!(y <= prev);
            assert!(prev - y < 5.0);
            prev = y;
        }
    }

    #[test]
    fn bounce_starts_and_ends_at_rest() {
        let spin = ReelSpinController::new(&ReelConfig::default(), targets(1), None);
        assert!((spin.bounce_offset(0.0) - 20.0).abs() < 1e-3);
        assert!(spin.bounce_offset(0.5).abs() < 0.1);
        // overshoots past rest during the ring
        let min = (1..50).map(|i| spin.bounce_offset(i as f32 * 0.01)).fold(f32::MAX, f32::min);
        assert!(min < 0.0);
    }

    #[test]
    fn stop_drops_callback() {
        let mut rng = Rng::new(9);
        let fired = Rc::new(Cell::new(0));
        let mut spin = ReelSpinController::new(&ReelConfig::default(), targets(3), counting(&fired));
        spin.start_reel(0, 0.0, &mut rng);
        spin.update(0.5);
        spin.stop();
        assert!(spin.update(20.0).is_empty());
        assert_eq!(fired.get(), 0);
        assert!(spin.reels().iter().all(|r| r.offset_y == 0.0));
    }

    #[test]
    fn reels_start_only_once() {
        let mut rng = Rng::new(1);
        let mut spin = ReelSpinController::new(&ReelConfig::default(), targets(1), None);
        assert!(spin.start_reel(0, 0.0, &mut rng));
        assert!(!spin.start_reel(0, 0.1, &mut rng));
        assert!(!spin.start_reel(4, 0.1, &mut rng));
    }

    #[test]
    fn anticipation_shake_and_ticks() {
        let config = ReelConfig {
            anticipation: AnticipationConfig { enabled: true, intensity: 8.0, duration: 1.26 },
            ..Default::default()
        };
        assert_eq!(config.anticipation.ticks(), 13);
        assert_eq!(AnticipationConfig::default().ticks(), 0);

        let mut rng = Rng::new(5);
        let mut spin = ReelSpinController::new(&config, targets(1), None);
        for _ in 0..50 {
            spin.shake_tick(&mut rng);
            assert!(spin.shake().x.abs() <= 4.0 && spin.shake().y.abs() <= 4.0);
        }
        spin.end_shake();
        assert_eq!(spin.shake(), Vec2::ZERO);
    }
}

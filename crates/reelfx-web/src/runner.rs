use reelfx_engine::{
    Capabilities, ConfigError, EffectHandle, Preview, PreviewConfig, PreviewEvent,
    Rect, ResultType, Tier, WinAnimationKind,
};
use glam::Vec2;

/// Owns one preview and the flat buffers the host reads after each tick.
///
/// The `wasm_bindgen` exports in `lib.rs` keep a single runner in a
/// `thread_local!`; handles cross the boundary as `u32`, with 0 meaning
/// "nothing started".
pub struct PreviewRunner {
    preview: Preview,
    /// Events drained during the last tick, 4 floats each.
    event_buffer: Vec<PreviewEvent>,
    /// Sound ids queued since the last tick, including those raised by
    /// triggers between ticks.
    sound_buffer: Vec<u32>,
}

impl PreviewRunner {
    pub fn new(config: PreviewConfig, capabilities: Capabilities, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            preview: Preview::new(config, capabilities, seed)?,
            event_buffer: Vec::new(),
            sound_buffer: Vec::new(),
        })
    }

    /// Parse and validate `json`, falling back to defaults when it is empty.
    pub fn from_json(json: &str, capabilities: Capabilities, seed: u64) -> Result<Self, ConfigError> {
        let config = if json.trim().is_empty() {
            PreviewConfig::default()
        } else {
            PreviewConfig::from_json(json)?
        };
        Self::new(config, capabilities, seed)
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn preview_mut(&mut self) -> &mut Preview {
        &mut self.preview
    }

    pub fn update_config(&mut self, json: &str) -> Result<(), ConfigError> {
        self.preview.update_config(PreviewConfig::from_json(json)?)
    }

    pub fn config_json(&self) -> Result<String, ConfigError> {
        self.preview.config().to_json()
    }

    pub fn add_surface(&mut self, tag: &str, x: f32, y: f32, width: f32, height: f32) {
        self.preview.add_surface(tag, Rect::new(Vec2::new(x, y), Vec2::new(width, height)));
    }

    pub fn remove_surface(&mut self, tag: &str) -> bool {
        self.preview.remove_surface(tag)
    }

    // ---- Triggers ----

    pub fn trigger_animation(&mut self, tier: u32) -> u32 {
        let Some(tier) = Tier::from_index(tier) else {
            log::warn!("unknown tier index {tier}");
            return 0;
        };
        to_wire(self.preview.trigger_animation(tier))
    }

    pub fn preview_spin(&mut self, result: u32, on_complete: Option<Box<dyn FnOnce()>>) -> u32 {
        let Some(result) = ResultType::from_index(result) else {
            log::warn!("unknown result index {result}");
            return 0;
        };
        to_wire(self.preview.preview_spin(result, on_complete))
    }

    pub fn play_win_animation(&mut self, kind: u32) -> u32 {
        let Some(kind) = WinAnimationKind::from_index(kind) else {
            log::warn!("unknown win animation index {kind}");
            return 0;
        };
        to_wire(self.preview.play_win_animation(kind))
    }

    pub fn dispose(&mut self, handle: u32) -> bool {
        handle != 0 && self.preview.dispose(EffectHandle(handle))
    }

    pub fn dispose_all(&mut self) {
        self.preview.dispose_all();
    }

    pub fn title_text(&self, handle: u32) -> Option<String> {
        self.preview.title_text(EffectHandle(handle)).map(str::to_owned)
    }

    /// Run one frame tick: advance the preview, then repack events and
    /// sounds into their flat buffers.
    pub fn tick(&mut self, dt: f32) {
        self.preview.tick(dt);

        self.event_buffer.clear();
        self.event_buffer.extend(self.preview.drain_events());

        self.sound_buffer.clear();
        self.sound_buffer.extend(self.preview.drain_sounds().into_iter().map(|s| s.0));
    }

    // ---- Pointer accessors for SharedArrayBuffer reads ----

    pub fn instances_ptr(&self) -> *const f32 {
        self.preview.frame().instances.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.preview.frame().instances.instance_count()
    }

    pub fn additive_split(&self) -> u32 {
        self.preview.frame().instances.additive_split()
    }

    pub fn effects_ptr(&self) -> *const f32 {
        self.preview.frame().effects.as_ptr() as *const f32
    }

    pub fn effects_vertex_count(&self) -> u32 {
        self.preview.frame().effects.len() as u32
    }

    pub fn glows_ptr(&self) -> *const f32 {
        self.preview.frame().glows.as_ptr() as *const f32
    }

    pub fn glow_count(&self) -> u32 {
        self.preview.frame().glows.len() as u32
    }

    pub fn reels_ptr(&self) -> *const f32 {
        self.preview.frame().reels.as_ptr()
    }

    pub fn reel_count(&self) -> u32 {
        (self.preview.frame().reels.len() / 2) as u32
    }

    pub fn shake_x(&self) -> f32 {
        self.preview.frame().shake.x
    }

    pub fn shake_y(&self) -> f32 {
        self.preview.frame().shake.y
    }

    #[cfg(feature = "vectors")]
    pub fn vector_vertices_ptr(&self) -> *const f32 {
        self.preview.frame().vectors.buffer_ptr()
    }

    #[cfg(feature = "vectors")]
    pub fn vector_vertex_count(&self) -> u32 {
        self.preview.frame().vector_vertex_count() as u32
    }

    pub fn events_ptr(&self) -> *const f32 {
        self.event_buffer.as_ptr() as *const f32
    }

    pub fn events_len(&self) -> u32 {
        self.event_buffer.len() as u32
    }

    pub fn events(&self) -> &[PreviewEvent] {
        &self.event_buffer
    }

    pub fn sound_events_ptr(&self) -> *const u32 {
        self.sound_buffer.as_ptr()
    }

    pub fn sound_events_len(&self) -> u32 {
        self.sound_buffer.len() as u32
    }

    pub fn sounds(&self) -> &[u32] {
        &self.sound_buffer
    }
}

fn to_wire(handle: Option<EffectHandle>) -> u32 {
    handle.map_or(0, |h| h.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> PreviewRunner {
        let mut r = PreviewRunner::from_json("", Capabilities::default(), 11).unwrap();
        r.add_surface("preview-grid", 0.0, 0.0, 800.0, 600.0);
        r
    }

    #[test]
    fn bad_json_is_rejected() {
        assert!(PreviewRunner::from_json("{ not json", Capabilities::default(), 1).is_err());
        let mut r = runner();
        assert!(r.update_config(r#"{"fixed_dt": -1.0}"#).is_err());
    }

    #[test]
    fn unknown_indices_start_nothing() {
        let mut r = runner();
        assert_eq!(r.trigger_animation(9), 0);
        assert_eq!(r.preview_spin(42, None), 0);
        assert_eq!(r.play_win_animation(7), 0);
        assert!(!r.dispose(0));
    }

    #[test]
    fn tick_fills_buffers() {
        let mut r = runner();
        let handle = r.trigger_animation(1);
        assert_ne!(handle, 0);
        assert_eq!(r.title_text(handle).as_deref(), Some("BIG WIN"));
        for _ in 0..30 {
            r.tick(1.0 / 60.0);
        }
        assert!(r.instance_count() > 0);
        assert!(r.additive_split() <= r.instance_count());
        assert!(!r.instances_ptr().is_null());
    }

    #[test]
    fn spin_reports_reels_and_events() {
        let mut r = runner();
        let handle = r.preview_spin(0, None);
        r.tick(1.0 / 60.0);
        assert_eq!(r.reel_count(), 5);

        let mut settled = 0;
        for _ in 0..300 {
            r.tick(1.0 / 60.0);
            settled += r.events().iter().filter(|e| e.kind == PreviewEvent::REEL_SETTLED).count();
        }
        assert_eq!(settled, 5);
        assert!(!r.dispose(handle));
        assert_eq!(r.reel_count(), 0);
    }

    #[test]
    fn config_round_trips_through_json() {
        let mut r = runner();
        let json = r.config_json().unwrap();
        assert!(r.update_config(&json).is_ok());
    }
}

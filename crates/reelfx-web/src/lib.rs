pub mod runner;

pub use runner::PreviewRunner;

use std::cell::RefCell;

use reelfx_engine::Capabilities;
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<PreviewRunner>> = RefCell::new(None);
    /// JS callbacks raised while the runner is borrowed, run by `flush_callbacks`.
    static PENDING: RefCell<Vec<(js_sys::Function, JsValue)>> = RefCell::new(Vec::new());
}

fn defer_call(f: js_sys::Function, arg: JsValue) {
    PENDING.with(|q| q.borrow_mut().push((f, arg)));
}

/// Call queued JS callbacks now that the runner is free to be re-entered.
fn flush_callbacks() {
    let pending = PENDING.with(|q| std::mem::take(&mut *q.borrow_mut()));
    for (f, arg) in pending {
        if let Err(err) = f.call1(&JsValue::NULL, &arg) {
            web_sys::console::error_2(&JsValue::from_str("reelfx: callback threw"), &err);
        }
    }
}

/// Run `f` against the live runner. Before `preview_init` this warns on the
/// browser console and returns `fallback`.
fn with_runner<R>(fallback: R, f: impl FnOnce(&mut PreviewRunner) -> R) -> R {
    RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(runner) => f(runner),
        None => {
            web_sys::console::warn_1(&JsValue::from_str("reelfx: preview not initialized, call preview_init() first"));
            fallback
        }
    })
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Build the preview from config JSON (empty for defaults). `native_glow`
/// reports whether the host can draw glows natively; the backend is picked
/// once here.
#[wasm_bindgen]
pub fn preview_init(config_json: &str, native_glow: bool, seed: u32) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let runner = PreviewRunner::from_json(config_json, Capabilities { native_glow }, seed as u64).map_err(js_error)?;
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("reelfx: initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn preview_update_config(config_json: &str) -> Result<(), JsValue> {
    let result = with_runner(Ok(()), |r| r.update_config(config_json).map_err(js_error));
    flush_callbacks();
    result
}

#[wasm_bindgen]
pub fn preview_config_json() -> Result<String, JsValue> {
    with_runner(Ok(String::new()), |r| r.config_json().map_err(js_error))
}

/// `callback(configJson)` runs after every successful config update.
#[wasm_bindgen]
pub fn preview_set_on_change(callback: js_sys::Function) {
    with_runner((), |r| {
        r.preview_mut().set_on_change(Box::new(move |config| {
            let json = config.to_json().unwrap_or_default();
            defer_call(callback.clone(), JsValue::from_str(&json));
        }));
    });
}

#[wasm_bindgen]
pub fn preview_add_surface(tag: &str, x: f32, y: f32, width: f32, height: f32) {
    with_runner((), |r| r.add_surface(tag, x, y, width, height));
}

#[wasm_bindgen]
pub fn preview_remove_surface(tag: &str) -> bool {
    with_runner(false, |r| r.remove_surface(tag))
}

// ---- Triggers ----

#[wasm_bindgen]
pub fn preview_trigger_animation(tier: u32) -> u32 {
    with_runner(0, |r| r.trigger_animation(tier))
}

/// `on_complete` runs once after the last reel settles; never if the spin is
/// disposed first.
#[wasm_bindgen]
pub fn preview_spin(result: u32, on_complete: Option<js_sys::Function>) -> u32 {
    let on_complete = on_complete.map(|f| -> Box<dyn FnOnce()> {
        Box::new(move || defer_call(f, JsValue::UNDEFINED))
    });
    with_runner(0, |r| r.preview_spin(result, on_complete))
}

#[wasm_bindgen]
pub fn preview_play_win_animation(kind: u32) -> u32 {
    with_runner(0, |r| r.play_win_animation(kind))
}

#[wasm_bindgen]
pub fn preview_dispose(handle: u32) -> bool {
    with_runner(false, |r| r.dispose(handle))
}

#[wasm_bindgen]
pub fn preview_dispose_all() {
    with_runner((), |r| r.dispose_all());
}

#[wasm_bindgen]
pub fn preview_tick(dt: f32) {
    with_runner((), |r| r.tick(dt));
    flush_callbacks();
}

#[wasm_bindgen]
pub fn preview_title_text(handle: u32) -> Option<String> {
    with_runner(None, |r| r.title_text(handle))
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_instances_ptr() -> *const f32 {
    with_runner(std::ptr::null(), |r| r.instances_ptr())
}

#[wasm_bindgen]
pub fn get_instance_count() -> u32 {
    with_runner(0, |r| r.instance_count())
}

#[wasm_bindgen]
pub fn get_additive_split() -> u32 {
    with_runner(0, |r| r.additive_split())
}

#[wasm_bindgen]
pub fn get_effects_ptr() -> *const f32 {
    with_runner(std::ptr::null(), |r| r.effects_ptr())
}

#[wasm_bindgen]
pub fn get_effects_vertex_count() -> u32 {
    with_runner(0, |r| r.effects_vertex_count())
}

#[wasm_bindgen]
pub fn get_glows_ptr() -> *const f32 {
    with_runner(std::ptr::null(), |r| r.glows_ptr())
}

#[wasm_bindgen]
pub fn get_glow_count() -> u32 {
    with_runner(0, |r| r.glow_count())
}

#[wasm_bindgen]
pub fn get_reels_ptr() -> *const f32 {
    with_runner(std::ptr::null(), |r| r.reels_ptr())
}

#[wasm_bindgen]
pub fn get_reel_count() -> u32 {
    with_runner(0, |r| r.reel_count())
}

#[wasm_bindgen]
pub fn get_shake_x() -> f32 {
    with_runner(0.0, |r| r.shake_x())
}

#[wasm_bindgen]
pub fn get_shake_y() -> f32 {
    with_runner(0.0, |r| r.shake_y())
}

#[wasm_bindgen]
pub fn get_events_ptr() -> *const f32 {
    with_runner(std::ptr::null(), |r| r.events_ptr())
}

#[wasm_bindgen]
pub fn get_events_len() -> u32 {
    with_runner(0, |r| r.events_len())
}

#[wasm_bindgen]
pub fn get_sound_events_ptr() -> *const u32 {
    with_runner(std::ptr::null(), |r| r.sound_events_ptr())
}

#[wasm_bindgen]
pub fn get_sound_events_len() -> u32 {
    with_runner(0, |r| r.sound_events_len())
}

// ---- Vector accessors (only when vectors feature is enabled) ----

#[cfg(feature = "vectors")]
#[wasm_bindgen]
pub fn get_vector_vertices_ptr() -> *const f32 {
    with_runner(std::ptr::null(), |r| r.vector_vertices_ptr())
}

#[cfg(feature = "vectors")]
#[wasm_bindgen]
pub fn get_vector_vertex_count() -> u32 {
    with_runner(0, |r| r.vector_vertex_count())
}

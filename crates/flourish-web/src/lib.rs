//! Browser bridge: `#[wasm_bindgen]` exports around one [`FxRunner`].
//!
//! The host calls `fx_init` once, `fx_frame` from `requestAnimationFrame`,
//! and reads instances and shape vertices straight out of wasm memory
//! through the pointer accessors. Settled effects come back through
//! `fx_drain_events` as `[effect_id, outcome]` pairs.

pub mod runner;

pub use runner::{FxEvent, FxRunner, OUTCOME_CANCELLED, OUTCOME_DONE};

use std::cell::RefCell;

use flourish::{Color, FxConfig, FxResult};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<FxRunner>> = const { RefCell::new(None) };
}

fn with_runner<R>(f: impl FnOnce(&mut FxRunner) -> R) -> FxResult<R> {
    RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(runner) => Ok(f(runner)),
        None => Err(runner::not_initialized()),
    })
}

/// Log a failed call and turn it into the host's sentinel value.
fn report<T>(op: &str, result: FxResult<T>, fallback: T) -> T {
    match result {
        Ok(v) => v,
        Err(err) if err.is_cancelled() => fallback,
        Err(err) => {
            log::warn!("{op}: {err}");
            fallback
        }
    }
}

fn install(width: f32, height: f32, config: FxConfig) -> bool {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let seed = config.seed;
    match FxRunner::new(width, height, config) {
        Ok(runner) => {
            RUNNER.with(|cell| {
                if let Some(mut old) = cell.borrow_mut().replace(runner) {
                    old.teardown();
                }
            });
            log::info!("flourish: initialized {width}x{height} (seed {seed})");
            true
        }
        Err(err) => {
            log::error!("flourish: init failed: {err}");
            false
        }
    }
}

#[wasm_bindgen]
pub fn fx_init(width: f32, height: f32, seed: u32) -> bool {
    install(width, height, FxConfig::default().with_seed(seed as u64))
}

/// Initialize from a JSON `FxConfig`; missing fields take their defaults.
#[wasm_bindgen]
pub fn fx_init_with_config(width: f32, height: f32, json: &str) -> bool {
    match FxConfig::from_json(json) {
        Ok(config) => install(width, height, config),
        Err(err) => {
            log::error!("flourish: bad config: {err}");
            false
        }
    }
}

#[wasm_bindgen]
pub fn fx_resize(width: f32, height: f32) {
    report("fx_resize", with_runner(|r| r.resize(width, height)), ());
}

#[wasm_bindgen]
pub fn fx_frame(now_ms: f64) {
    report("fx_frame", with_runner(|r| r.frame(now_ms)).and_then(|r| r), ());
}

// ---- Triggers ----

#[wasm_bindgen]
pub fn fx_confetti(x: f32, y: f32) {
    report("fx_confetti", with_runner(|r| r.confetti(x, y)).and_then(|r| r), ());
}

#[wasm_bindgen]
pub fn fx_coins(x: f32, y: f32) {
    report("fx_coins", with_runner(|r| r.coins(x, y)).and_then(|r| r), ());
}

#[wasm_bindgen]
pub fn fx_sparkles(x: f32, y: f32) {
    report("fx_sparkles", with_runner(|r| r.sparkles(x, y)).and_then(|r| r), ());
}

#[wasm_bindgen]
pub fn fx_confetti_burst(x: f32, y: f32, count: u32) {
    let result = with_runner(|r| r.confetti_burst(x, y, count as usize)).and_then(|r| r);
    report("fx_confetti_burst", result, ());
}

#[wasm_bindgen]
pub fn fx_coin_burst(x: f32, y: f32, count: u32) {
    let result = with_runner(|r| r.coin_burst(x, y, count as usize)).and_then(|r| r);
    report("fx_coin_burst", result, ());
}

#[wasm_bindgen]
pub fn fx_sparkle_field(x: f32, y: f32, radius: f32, count: u32) {
    let result = with_runner(|r| r.sparkle_field(x, y, radius, count as usize)).and_then(|r| r);
    report("fx_sparkle_field", result, ());
}

/// Returns the effect id, or -1 if nothing started.
#[wasm_bindgen]
pub fn fx_rays(x: f32, y: f32) -> i32 {
    let id = with_runner(|r| r.rays(x, y)).and_then(|r| r).map(|id| id as i32);
    report("fx_rays", id, -1)
}

#[wasm_bindgen]
pub fn fx_flash(color: u32, peak_alpha: f32, total_ms: f32) -> i32 {
    let id = with_runner(|r| r.flash(Color(color), peak_alpha, total_ms))
        .and_then(|r| r)
        .map(|id| id as i32);
    report("fx_flash", id, -1)
}

#[wasm_bindgen]
pub fn fx_shake(intensity: f32, duration_ms: f32) -> i32 {
    let id = with_runner(|r| r.shake(intensity, duration_ms))
        .and_then(|r| r)
        .map(|id| id as i32);
    report("fx_shake", id, -1)
}

#[wasm_bindgen]
pub fn fx_pulse() {
    report("fx_pulse", with_runner(|r| r.pulse()).and_then(|r| r), ());
}

#[wasm_bindgen]
pub fn fx_cancel(effect_id: u32) -> bool {
    report("fx_cancel", with_runner(|r| r.cancel(effect_id)), false)
}

#[wasm_bindgen]
pub fn fx_teardown() {
    report("fx_teardown", with_runner(|r| r.teardown()), ());
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn fx_drain_events() -> js_sys::Float32Array {
    let events = report("fx_drain_events", with_runner(|r| r.drain_events()), Vec::new());
    js_sys::Float32Array::from(events.as_slice())
}

#[wasm_bindgen]
pub fn get_instances_ptr() -> *const f32 {
    report("get_instances_ptr", with_runner(|r| r.instances_ptr()), std::ptr::null())
}

#[wasm_bindgen]
pub fn get_instance_count() -> u32 {
    report("get_instance_count", with_runner(|r| r.instance_count()), 0)
}

#[wasm_bindgen]
pub fn get_shapes_ptr() -> *const f32 {
    report("get_shapes_ptr", with_runner(|r| r.shapes_ptr()), std::ptr::null())
}

#[wasm_bindgen]
pub fn get_shape_vertex_count() -> u32 {
    report("get_shape_vertex_count", with_runner(|r| r.shape_vertex_count()), 0)
}

#[wasm_bindgen]
pub fn get_particle_count() -> u32 {
    report("get_particle_count", with_runner(|r| r.particle_count()), 0)
}

#[wasm_bindgen]
pub fn get_stage_x() -> f32 {
    report("get_stage_x", with_runner(|r| r.stage_x()), 0.0)
}

#[wasm_bindgen]
pub fn get_stage_y() -> f32 {
    report("get_stage_y", with_runner(|r| r.stage_y()), 0.0)
}

#[wasm_bindgen]
pub fn get_stage_scale() -> f32 {
    report("get_stage_scale", with_runner(|r| r.stage_scale()), 1.0)
}

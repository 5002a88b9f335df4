//! Browser host
//!
//! A `wasm-bindgen` session handle. The page owns the canvas, audio and DOM;
//! it forwards taps and keys, calls `frame` from `requestAnimationFrame`, and
//! draws from the JSON snapshot it gets back.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use super::{FrameClock, Renderer, run_frame};
use crate::sim::{DirectionKeys, GameEvent, Session, Snapshot, TickInput};
use crate::tuning::{GameConfig, GameVariant};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Dood Arcade core loaded");
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Seed from the platform RNG, falling back to the clock
fn fresh_seed() -> u64 {
    getrandom_03::u64().unwrap_or_else(|_| js_sys::Date::now() as u64)
}

/// Serializes each drawn frame for the page
#[derive(Default)]
struct JsonFrame {
    json: String,
}

impl Renderer for JsonFrame {
    fn draw(&mut self, snapshot: &Snapshot) {
        match serde_json::to_string(snapshot) {
            Ok(json) => self.json = json,
            Err(e) => log::warn!("Snapshot serialization failed: {}", e),
        }
    }
}

#[wasm_bindgen]
pub struct WebSession {
    session: Session,
    clock: FrameClock,
    tap: Option<Vec2>,
    keys: DirectionKeys,
    frame: JsonFrame,
    events: Vec<GameEvent>,
}

impl WebSession {
    fn with_config(config: GameConfig, seed: u64) -> Self {
        let seed = if seed == 0 { fresh_seed() } else { seed };
        let session = Session::new(config, seed);
        let mut frame = JsonFrame::default();
        frame.draw(&session.snapshot());
        Self {
            session,
            clock: FrameClock::new(),
            tap: None,
            keys: DirectionKeys::default(),
            frame,
            events: Vec::new(),
        }
    }
}

#[wasm_bindgen]
impl WebSession {
    /// Start a preset game sized to the canvas. `seed` of 0 picks a random one.
    #[wasm_bindgen(constructor)]
    pub fn new(variant: &str, width: f32, height: f32, mobile: bool, seed: u64) -> Result<WebSession, JsValue> {
        let variant = GameVariant::from_name(variant).ok_or_else(|| to_js(format!("unknown game: {variant}")))?;
        let config = GameConfig::for_viewport(variant, width, height, mobile);
        config.validate().map_err(to_js)?;
        Ok(Self::with_config(config, seed))
    }

    /// Start a game from a JSON config
    pub fn from_config(json: &str, seed: u64) -> Result<WebSession, JsValue> {
        let config = GameConfig::from_json(json).map_err(to_js)?;
        Ok(Self::with_config(config, seed))
    }

    /// Tap / click in world coordinates
    pub fn tap(&mut self, x: f32, y: f32) {
        self.tap = Some(Vec2::new(x, y));
    }

    pub fn set_keys(&mut self, left: bool, right: bool, up: bool, down: bool) {
        self.keys = DirectionKeys { left, right, up, down };
    }

    /// Advance by `dt` seconds of wall time; returns the snapshot JSON
    pub fn frame(&mut self, dt: f32) -> String {
        let tap = &mut self.tap;
        let keys = self.keys;
        let mut input = || TickInput { tap: tap.take(), keys };
        run_frame(
            &mut self.session,
            &mut self.clock,
            &mut input,
            &mut self.frame,
            &mut self.events,
            dt,
        );
        self.frame.json.clone()
    }

    pub fn snapshot_json(&self) -> String {
        self.frame.json.clone()
    }

    /// Events since the last call, as a JSON array
    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        let events = std::mem::take(&mut self.events);
        serde_json::to_string(&events).map_err(to_js)
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_playing()
    }

    /// Full reset with a new seed (0 picks a random one)
    pub fn restart(&mut self, seed: u64) {
        let seed = if seed == 0 { fresh_seed() } else { seed };
        self.session.restart(seed);
        self.clock.reset();
        self.tap = None;
        self.events.clear();
        self.frame.draw(&self.session.snapshot());
    }
}

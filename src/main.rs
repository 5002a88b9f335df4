//! Dood Arcade entry point
//!
//! Natively this plays headless demo sessions with a scripted autopilot, which
//! is handy for eyeballing balance changes in the logs. In the browser the
//! library's `WebSession` handle is the entry point instead.
//!
//! Usage: `dood-arcade [game] [seed] [config.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use dood_arcade::consts::*;
    use dood_arcade::platform::{FrameClock, LogFeedback, Renderer, run_frame};
    use dood_arcade::sim::{EntityKind, HoleState, Session, Snapshot, TickInput};
    use dood_arcade::{GameConfig, GameVariant};
    use glam::Vec2;

    /// Last drawn frame, shared between the renderer and the autopilot
    type SharedFrame = Rc<RefCell<Option<Snapshot>>>;

    struct HudRenderer {
        frame: SharedFrame,
        last_second: u32,
    }

    impl Renderer for HudRenderer {
        fn draw(&mut self, snapshot: &Snapshot) {
            if snapshot.remaining_secs != self.last_second {
                self.last_second = snapshot.remaining_secs;
                log::info!(
                    "[{:>2}s] score {:>2}/{:<2} entities {:>2}",
                    snapshot.remaining_secs,
                    snapshot.score,
                    snapshot.total_spawned,
                    snapshot.entities.len()
                );
            }
            *self.frame.borrow_mut() = Some(snapshot.clone());
        }
    }

    /// Decide what a reasonable player would do given the last frame
    fn autopilot(frame: &Option<Snapshot>) -> TickInput {
        let Some(snapshot) = frame else {
            return TickInput::default();
        };
        let tap = match snapshot.variant {
            GameVariant::FileDrop => snapshot
                .entities
                .iter()
                .rev()
                .find(|e| matches!(e.kind, EntityKind::File { virus: false, .. }) && e.pos.y > 0.0)
                .map(|e| e.pos),
            GameVariant::CloudEater => {
                let from = snapshot.player.as_ref().map(|p| p.pos).unwrap_or_default();
                snapshot
                    .entities
                    .iter()
                    .filter(|e| e.kind == EntityKind::Cloud)
                    .min_by(|a, b| a.pos.distance(from).total_cmp(&b.pos.distance(from)))
                    .map(|e| e.pos)
            }
            GameVariant::WhackADood => snapshot
                .holes
                .iter()
                .find(|h| h.state == HoleState::Up)
                .map(|h| h.pos + Vec2::new(0.0, -20.0)),
        };
        TickInput {
            tap,
            ..Default::default()
        }
    }

    pub fn play(config: GameConfig, seed: u64) {
        let variant = config.variant();
        let max_frames = (config.duration_secs as usize + 2) * TICK_RATE as usize;
        let mut session = Session::new(config, seed);
        let mut clock = FrameClock::new();
        let frame: SharedFrame = Rc::new(RefCell::new(None));
        let mut renderer = HudRenderer {
            frame: Rc::clone(&frame),
            last_second: 0,
        };
        let mut feedback = LogFeedback;
        let mut input = || autopilot(&frame.borrow());

        let mut frames = 0;
        while session.is_playing() && frames < max_frames {
            run_frame(&mut session, &mut clock, &mut input, &mut renderer, &mut feedback, SIM_DT);
            frames += 1;
        }

        log::info!(
            "{}: {:?} with {}/{} after {} frames ({} degraded placements)",
            variant.as_str(),
            session.state,
            session.keeper.score,
            session.keeper.total_spawned,
            frames,
            session.degraded_placements
        );
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let variants = match args.first().map(String::as_str) {
            None | Some("all") => GameVariant::ALL.to_vec(),
            Some(name) => vec![GameVariant::from_name(name).ok_or_else(|| format!("unknown game: {name}"))?],
        };
        let seed = match args.get(1) {
            Some(s) => s.parse::<u64>()?,
            None => 1,
        };
        if let Some(path) = args.get(2) {
            let config = GameConfig::from_json(&std::fs::read_to_string(path)?)?;
            play(config, seed);
            return Ok(());
        }

        for variant in variants {
            play(GameConfig::preset(variant, variant.default_world()), seed);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Dood Arcade (native) starting...");
    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `platform::web::wasm_start`, this is just to satisfy the compiler
}

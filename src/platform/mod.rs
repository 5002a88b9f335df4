//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Time (frame deltas in, fixed ticks and countdown seconds out)
//! - Input polling
//! - Drawing and audio/UI feedback
//!
//! The simulation never calls into a host directly; a host implements these
//! traits and hands them to [`run_frame`] once per animation frame.

#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec2;

use crate::consts::*;
use crate::sim::{GameEvent, Hazard, Outcome, Session, Snapshot, TickInput, on_second, tick};

/// Source of player input, polled once per frame
pub trait InputSource {
    fn poll(&mut self) -> TickInput;
}

impl<F: FnMut() -> TickInput> InputSource for F {
    fn poll(&mut self) -> TickInput {
        self()
    }
}

/// Draws a frame from a read-only snapshot
pub trait Renderer {
    fn draw(&mut self, snapshot: &Snapshot);
}

/// Headless hosts and tests
impl Renderer for () {
    fn draw(&mut self, _snapshot: &Snapshot) {}
}

/// Receives gameplay events for sound and UI feedback.
///
/// Override `on_event` to see everything, or just the hooks you care about.
pub trait FeedbackSink {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Collected { .. } | GameEvent::MoleHit { .. } => self.on_collect(event),
            GameEvent::HazardHit { hazard } => self.on_hazard_hit(*hazard),
            GameEvent::SessionEnded { outcome } => self.on_session_end(outcome),
            _ => {}
        }
    }

    fn on_collect(&mut self, _event: &GameEvent) {}

    fn on_hazard_hit(&mut self, _hazard: Hazard) {}

    fn on_session_end(&mut self, _outcome: &Outcome) {}
}

/// Keeps every event, in order
impl FeedbackSink for Vec<GameEvent> {
    fn on_event(&mut self, event: &GameEvent) {
        self.push(event.clone());
    }
}

/// Feedback that only logs
#[derive(Debug, Default)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn on_collect(&mut self, event: &GameEvent) {
        log::debug!("{:?}", event);
    }

    fn on_hazard_hit(&mut self, hazard: Hazard) {
        log::info!("Hazard hit: {:?}", hazard);
    }

    fn on_session_end(&mut self, outcome: &Outcome) {
        log::info!("{}", outcome.message());
    }
}

/// Work produced by one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSteps {
    pub ticks: u32,
    pub seconds: u32,
}

/// Turns variable frame deltas into fixed 60 Hz ticks and whole wall-clock seconds
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
    second_accumulator: f32,
    /// A tap polled on a frame that ran no tick; delivered on the next one
    pending_tap: Option<Vec2>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any partial tick or second (after a restart)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Accumulate `frame_dt` seconds and report how many ticks and seconds are due.
    ///
    /// Only the tick accumulator is clamped; the countdown keeps wall-clock time
    /// through stalls and backgrounded tabs.
    pub fn advance(&mut self, frame_dt: f32) -> FrameSteps {
        let wall_dt = frame_dt.max(0.0);
        let mut dt = wall_dt;
        if dt > MAX_FRAME_DT {
            log::warn!("Frame delta {:.3}s clamped to {:.3}s", dt, MAX_FRAME_DT);
            dt = MAX_FRAME_DT;
        }
        self.accumulator += dt;
        self.second_accumulator += wall_dt;

        let mut steps = FrameSteps::default();
        while self.accumulator >= SIM_DT && steps.ticks < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps.ticks += 1;
        }
        while self.second_accumulator >= SECOND {
            self.second_accumulator -= SECOND;
            steps.seconds += 1;
        }
        steps
    }
}

/// Run one animation frame: poll input, step the session, publish events, draw.
///
/// Ticks run before countdown seconds that fall due in the same frame.
pub fn run_frame(
    session: &mut Session,
    clock: &mut FrameClock,
    input: &mut impl InputSource,
    renderer: &mut impl Renderer,
    feedback: &mut impl FeedbackSink,
    frame_dt: f32,
) -> FrameSteps {
    let steps = clock.advance(frame_dt);

    let mut command = input.poll();
    if command.tap.is_some() {
        clock.pending_tap = command.tap;
    }
    for _ in 0..steps.ticks {
        // Taps are one-shot; held keys apply to every substep
        command.tap = clock.pending_tap.take();
        tick(session, &command, SIM_DT);
    }
    for _ in 0..steps.seconds {
        on_second(session);
    }

    for event in session.drain_events() {
        feedback.on_event(&event);
    }
    renderer.draw(&session.snapshot());
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SessionState;
    use crate::tuning::{GameConfig, GameVariant};

    #[derive(Default)]
    struct Counts {
        collects: u32,
        hazards: u32,
        ends: Vec<Outcome>,
    }

    impl FeedbackSink for Counts {
        fn on_collect(&mut self, _event: &GameEvent) {
            self.collects += 1;
        }

        fn on_hazard_hit(&mut self, _hazard: Hazard) {
            self.hazards += 1;
        }

        fn on_session_end(&mut self, outcome: &Outcome) {
            self.ends.push(*outcome);
        }
    }

    #[derive(Default)]
    struct LastFrame(Option<Snapshot>);

    impl Renderer for LastFrame {
        fn draw(&mut self, snapshot: &Snapshot) {
            self.0 = Some(snapshot.clone());
        }
    }

    fn session(variant: GameVariant) -> Session {
        Session::new(GameConfig::preset(variant, variant.default_world()), 3)
    }

    #[test]
    fn test_clock_fixed_steps() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(SIM_DT * 2.5).ticks, 2);
        // Leftover half tick carries over
        assert_eq!(clock.advance(SIM_DT * 0.6).ticks, 1);
    }

    #[test]
    fn test_clock_clamps_long_frames() {
        let mut clock = FrameClock::new();
        let steps = clock.advance(5.0);
        // 0.1 s is six ticks, give or take float rounding
        assert!((5..=6).contains(&steps.ticks), "{steps:?}");
        // The countdown still sees the whole stall
        assert_eq!(steps.seconds, 5);
        assert_eq!(FrameClock::new().advance(-1.0), FrameSteps::default());
    }

    #[test]
    fn test_clock_counts_seconds() {
        let mut clock = FrameClock::new();
        let mut seconds = 0;
        for _ in 0..130 {
            seconds += clock.advance(1.0 / 60.0).seconds;
        }
        assert_eq!(seconds, 2);
    }

    #[test]
    fn test_frames_run_the_countdown_out() {
        let mut s = session(GameVariant::FileDrop);
        let mut clock = FrameClock::new();
        let mut counts = Counts::default();
        let mut frame = LastFrame::default();
        let mut input = TickInput::default;

        for _ in 0..(21 * 20) {
            run_frame(&mut s, &mut clock, &mut input, &mut frame, &mut counts, 0.05);
        }
        assert_eq!(s.remaining_secs, 0);
        assert_ne!(s.state, SessionState::Playing);
        assert_eq!(counts.ends.len(), 1);
        assert_eq!(counts.hazards, 0);

        let last = frame.0.expect("every frame draws");
        assert_eq!(last.remaining_secs, 0);
        assert!(last.message.is_some());
    }

    #[test]
    fn test_countdown_survives_stalled_frames() {
        let mut s = session(GameVariant::FileDrop);
        let mut clock = FrameClock::new();
        let mut counts = Counts::default();
        let mut input = TickInput::default;

        for _ in 0..5 {
            run_frame(&mut s, &mut clock, &mut input, &mut (), &mut counts, 1.0);
        }
        assert_eq!(s.remaining_secs, 15);
        // Ticks only got the clamped 0.1 s per frame
        assert!(s.ticks <= 5 * 6, "{} ticks", s.ticks);

        for _ in 0..20 {
            run_frame(&mut s, &mut clock, &mut input, &mut (), &mut counts, 1.0);
        }
        assert_eq!(s.remaining_secs, 0);
        assert!(!s.is_playing());
        assert_eq!(counts.ends.len(), 1);
    }

    #[test]
    fn test_tap_reaches_feedback() {
        let mut s = session(GameVariant::WhackADood);
        let target = s.holes[0].pos + Vec2::new(0.0, -20.0);
        s.holes[0].state = crate::sim::HoleState::Up;
        s.holes[0].rise = 60.0;
        s.holes[0].dwell_ticks = 30.0;

        let mut clock = FrameClock::new();
        let mut counts = Counts::default();
        let mut taps = vec![TickInput::tap(target)];
        let mut input = move || taps.pop().unwrap_or_default();

        // First frame is too short to tick; the tap must wait for the next
        let steps = run_frame(&mut s, &mut clock, &mut input, &mut (), &mut counts, 0.001);
        assert_eq!(steps.ticks, 0);
        run_frame(&mut s, &mut clock, &mut input, &mut (), &mut counts, SIM_DT);
        assert_eq!(counts.collects, 1);
        assert_eq!(s.keeper.score, 1);
    }

    #[test]
    fn test_event_log_sink() {
        let mut s = session(GameVariant::FileDrop);
        let mut clock = FrameClock::new();
        let mut events: Vec<GameEvent> = Vec::new();
        let mut input = TickInput::default;
        for _ in 0..70 {
            run_frame(&mut s, &mut clock, &mut input, &mut (), &mut events, SIM_DT);
        }
        assert!(events.iter().any(|e| matches!(e, GameEvent::Spawned { .. })));
        assert!(s.events().is_empty());
    }
}

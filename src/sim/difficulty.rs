//! Time-based difficulty ramp
//!
//! Everything is recomputed from elapsed time on every query; nothing is
//! accumulated, so the curve cannot drift.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::lerp;

/// A value that moves linearly from `start` to `end` over the ramp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub start: f32,
    pub end: f32,
}

impl Ramp {
    pub const fn constant(value: f32) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    pub fn at(&self, factor: f32) -> f32 {
        lerp(self.start, self.end, factor)
    }

    pub fn is_non_increasing(&self) -> bool {
        self.end <= self.start
    }
}

/// `base + rand * spread`, in ticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickRange {
    pub base: f32,
    pub spread: f32,
}

impl TickRange {
    pub fn min(&self) -> f32 {
        self.base
    }

    pub fn max(&self) -> f32 {
        self.base + self.spread
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.base + rng.random::<f32>() * self.spread
    }
}

/// Concurrency cap that applies from `at_secs` onward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStep {
    pub at_secs: u32,
    pub max_active: u32,
}

/// Cap value meaning "no concurrency limit"
pub const UNCAPPED: u32 = u32::MAX;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyCurve {
    /// Seconds for the ramp factor to go from 0 to 1
    pub ramp_secs: f32,
    pub spawn_delay_base: Ramp,
    pub spawn_delay_spread: Ramp,
    pub dwell_base: Ramp,
    pub dwell_spread: Ramp,
    pub initial_max_active: u32,
    /// Breakpoints, ascending by time
    pub active_steps: Vec<ActiveStep>,
}

/// Parameters in force at a given moment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyParams {
    pub spawn_delay: TickRange,
    pub max_active: u32,
    pub dwell: TickRange,
}

impl DifficultyCurve {
    /// A flat curve: fixed spawn delay, no cap, no dwell
    pub fn constant(spawn_delay: f32) -> Self {
        Self {
            ramp_secs: 1.0,
            spawn_delay_base: Ramp::constant(spawn_delay),
            spawn_delay_spread: Ramp::constant(0.0),
            dwell_base: Ramp::constant(0.0),
            dwell_spread: Ramp::constant(0.0),
            initial_max_active: UNCAPPED,
            active_steps: Vec::new(),
        }
    }

    /// Ramp factor in `[0, 1]`
    pub fn factor(&self, elapsed_secs: f32) -> f32 {
        if self.ramp_secs <= 0.0 {
            return 1.0;
        }
        (elapsed_secs.max(0.0) / self.ramp_secs).min(1.0)
    }

    pub fn max_active(&self, elapsed_secs: f32) -> u32 {
        self.active_steps
            .iter()
            .filter(|step| elapsed_secs >= step.at_secs as f32)
            .map(|step| step.max_active)
            .fold(self.initial_max_active, u32::max)
    }

    pub fn parameters(&self, elapsed_secs: f32) -> DifficultyParams {
        let f = self.factor(elapsed_secs);
        DifficultyParams {
            spawn_delay: TickRange {
                base: self.spawn_delay_base.at(f),
                spread: self.spawn_delay_spread.at(f),
            },
            max_active: self.max_active(elapsed_secs),
            dwell: TickRange {
                base: self.dwell_base.at(f),
                spread: self.dwell_spread.at(f),
            },
        }
    }

    /// Name of the first ramp that gets easier over time, if any
    pub fn first_non_monotonic(&self) -> Option<&'static str> {
        if !self.spawn_delay_base.is_non_increasing() {
            return Some("spawn_delay_base");
        }
        if !self.spawn_delay_spread.is_non_increasing() {
            return Some("spawn_delay_spread");
        }
        if !self.dwell_base.is_non_increasing() {
            return Some("dwell_base");
        }
        if !self.dwell_spread.is_non_increasing() {
            return Some("dwell_spread");
        }
        let mut last = self.initial_max_active;
        let mut last_at = 0;
        for step in &self.active_steps {
            if step.max_active < last || step.at_secs < last_at {
                return Some("active_steps");
            }
            last = step.max_active;
            last_at = step.at_secs;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::WhackRules;
    use proptest::prelude::*;

    fn whack_curve() -> DifficultyCurve {
        WhackRules::default().difficulty
    }

    #[test]
    fn test_whack_ramp_endpoints() {
        let curve = whack_curve();
        let start = curve.parameters(0.0);
        assert_eq!(start.max_active, 2);
        assert_eq!(start.spawn_delay, TickRange { base: 20.0, spread: 16.0 });
        assert_eq!(start.dwell, TickRange { base: 32.0, spread: 16.0 });

        let late = curve.parameters(40.0);
        assert_eq!(late.max_active, 4);
        assert_eq!(late.spawn_delay, TickRange { base: 10.0, spread: 10.0 });
        assert_eq!(late.dwell, TickRange { base: 16.0, spread: 12.0 });
    }

    #[test]
    fn test_active_breakpoints() {
        let curve = whack_curve();
        assert_eq!(curve.max_active(9.99), 2);
        assert_eq!(curve.max_active(10.0), 3);
        assert_eq!(curve.max_active(21.9), 3);
        assert_eq!(curve.max_active(22.0), 4);
        assert_eq!(curve.max_active(25.0), 4);
    }

    #[test]
    fn test_halfway_interpolation() {
        let p = whack_curve().parameters(10.0);
        assert!((p.spawn_delay.base - 15.0).abs() < 1e-4);
        assert!((p.dwell.spread - 14.0).abs() < 1e-4);
    }

    #[test]
    fn test_constant_curve() {
        let curve = DifficultyCurve::constant(60.0);
        let p = curve.parameters(17.0);
        assert_eq!(p.spawn_delay.min(), 60.0);
        assert_eq!(p.spawn_delay.max(), 60.0);
        assert_eq!(p.max_active, UNCAPPED);
        assert!(curve.first_non_monotonic().is_none());
    }

    #[test]
    fn test_detects_easing_ramp() {
        let mut curve = whack_curve();
        curve.dwell_base = Ramp { start: 10.0, end: 20.0 };
        assert_eq!(curve.first_non_monotonic(), Some("dwell_base"));
    }

    proptest! {
        #[test]
        fn prop_curve_is_monotonic(a in 0.0f32..120.0, b in 0.0f32..120.0) {
            let (t1, t2) = if a <= b { (a, b) } else { (b, a) };
            let curve = whack_curve();
            let p1 = curve.parameters(t1);
            let p2 = curve.parameters(t2);
            prop_assert!(p1.max_active <= p2.max_active);
            prop_assert!(p1.spawn_delay.min() >= p2.spawn_delay.min());
            prop_assert!(p1.spawn_delay.max() >= p2.spawn_delay.max());
            prop_assert!(p1.dwell.max() >= p2.dwell.max());
        }
    }
}

//! Dood Arcade - shared core for the single-screen Dood arcade games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, collisions, scoring)
//! - `platform`: Host seams (input polling, rendering, audio/UI feedback)
//! - `tuning`: Data-driven game balance and per-game presets

pub mod platform;
pub mod sim;
pub mod tuning;

pub use tuning::{ConfigError, GameConfig, GameVariant};

use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Ticks per second of the fixed simulation step
    pub const TICK_RATE: f32 = 60.0;
    /// Fixed simulation timestep (60 Hz, matching a display refresh)
    pub const SIM_DT: f32 = 1.0 / TICK_RATE;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the host clock will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Countdown interval (seconds)
    pub const SECOND: f32 = 1.0;
}

/// Sample uniformly from `[min, max)`.
///
/// Collapses to `min` when the range is empty, so callers never have to guard
/// against worlds smaller than the entity being placed.
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        min + rng.random::<f32>() * (max - min)
    } else {
        min
    }
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_uniform_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let v = uniform(&mut rng, 10.0, 20.0);
            assert!((10.0..=20.0).contains(&v));
        }
    }

    #[test]
    fn test_uniform_degenerate_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        assert_eq!(uniform(&mut rng, 5.0, 5.0), 5.0);
        assert_eq!(uniform(&mut rng, 5.0, -3.0), 5.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(20.0, 10.0, 0.0), 20.0);
        assert_eq!(lerp(20.0, 10.0, 1.0), 10.0);
        assert!((lerp(20.0, 10.0, 0.5) - 15.0).abs() < 1e-6);
    }
}

//! Per-kind motion rules
//!
//! Speeds are authored per tick at 60 Hz; `scale` is `dt / SIM_DT` so a host
//! stepping at a different rate still moves entities the same distance per
//! second.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, Motion, Player};
use crate::tuning::World;
use crate::uniform;

/// What happens to an entity after its motion update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Keep,
    /// Left the world for good; the caller should retire it
    Exited,
}

/// Advance one entity by one step of its motion rule
pub fn advance<R: Rng + ?Sized>(entity: &mut Entity, world: &World, scale: f32, rng: &mut R) -> Fate {
    match &mut entity.motion {
        Motion::Fixed => Fate::Keep,

        Motion::Descend { speed, exit_margin } => {
            entity.pos.y += *speed * scale;
            let top = entity.pos.y - entity.size.y / 2.0;
            if top > world.height + *exit_margin {
                Fate::Exited
            } else {
                Fate::Keep
            }
        }

        Motion::Bounce {
            speed,
            direction,
            margin,
            lane_top,
            lane_span,
        } => {
            entity.pos.x += *speed * *direction * scale;
            if entity.pos.x > world.width + *margin || entity.pos.x < -*margin {
                *direction = -*direction;
                entity.pos.y = world.height * *lane_top + rng.random::<f32>() * world.height * *lane_span;
            }
            Fate::Keep
        }

        Motion::Wave {
            speed,
            direction,
            margin,
            base_y,
            phase,
            amplitude,
            frequency,
            flap,
        } => {
            entity.pos.x += *speed * *direction * scale;
            *flap += 0.2 * scale;
            *phase += *frequency * scale;
            entity.pos.y = *base_y + phase.sin() * *amplitude;
            if entity.pos.x > world.width + *margin || entity.pos.x < -*margin {
                *direction = -*direction;
            }
            Fate::Keep
        }

        Motion::Sway {
            speed,
            phase,
            amplitude,
            frequency,
            respawn_y,
        } => {
            entity.pos.y += *speed * scale;
            *phase += *frequency * scale;
            entity.pos.x += phase.sin() * *amplitude * scale;
            if entity.pos.y > world.height {
                entity.pos.y = *respawn_y;
                entity.pos.x = uniform(rng, 0.0, world.width);
                *phase = 0.0;
            }
            Fate::Keep
        }

        Motion::Float {
            phase, frequency, ..
        } => {
            *phase += *frequency * scale;
            Fate::Keep
        }
    }
}

/// Directional key state for keyboard / D-pad hosts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionKeys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Player steering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteerParams {
    /// Distance at which a tap target counts as reached
    pub arrive_epsilon: f32,
    /// Tilt (degrees) while moving sideways
    pub tilt_degrees: f32,
    /// Horizontal offset below which seeking does not tilt
    pub tilt_deadzone: f32,
}

impl Default for SteerParams {
    fn default() -> Self {
        Self {
            arrive_epsilon: 10.0,
            tilt_degrees: 15.0,
            tilt_deadzone: 5.0,
        }
    }
}

/// Move the player toward its tap target, or by the held keys when it has none.
///
/// The player is the only entity clamped to the world.
pub fn steer_player(player: &mut Player, keys: DirectionKeys, world: &World, params: &SteerParams, scale: f32) {
    player.vel = Vec2::ZERO;

    if let Some(target) = player.target {
        let delta = target - player.pos;
        let distance = delta.length();
        if distance > params.arrive_epsilon {
            player.vel = delta / distance * player.speed;
            player.rotation = if delta.x < -params.tilt_deadzone {
                -params.tilt_degrees
            } else if delta.x > params.tilt_deadzone {
                params.tilt_degrees
            } else {
                0.0
            };
        } else {
            player.target = None;
            player.rotation = 0.0;
        }
    } else {
        if keys.left {
            player.vel.x = -player.speed;
            player.rotation = -params.tilt_degrees;
        }
        if keys.right {
            player.vel.x = player.speed;
            player.rotation = params.tilt_degrees;
        }
        if keys.up {
            player.vel.y = -player.speed;
        }
        if keys.down {
            player.vel.y = player.speed;
        }
        if !keys.left && !keys.right {
            player.rotation = 0.0;
        }
    }

    player.pos += player.vel * scale;

    let half = player.size / 2.0;
    player.pos.x = player.pos.x.min(world.width - half.x).max(half.x);
    player.pos.y = player.pos.y.min(world.height - half.y).max(half.y);
}

//! Entity types shared by every game variant
//!
//! Positions use the center convention everywhere: `pos` is the middle of the
//! entity's visual box, `size` its full width and height.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Obstacle flavors in the flying game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Airplane,
    Bird,
    Ufo,
    Parachute,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Airplane => "airplane",
            ObstacleKind::Bird => "bird",
            ObstacleKind::Ufo => "ufo",
            ObstacleKind::Parachute => "parachute",
        }
    }
}

/// What a spawned entity is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// A falling download; `virus` files end the session when tapped
    File {
        virus: bool,
        name: String,
        size_label: String,
    },
    /// Collectible cloud
    Cloud,
    /// Hazard the player must avoid
    Obstacle(ObstacleKind),
}

impl EntityKind {
    /// Touching (or tapping) this entity loses the session
    pub fn is_hazard(&self) -> bool {
        match self {
            EntityKind::File { virus, .. } => *virus,
            EntityKind::Cloud => false,
            EntityKind::Obstacle(_) => true,
        }
    }

    /// Touching (or tapping) this entity scores a point
    pub fn is_collectible(&self) -> bool {
        !self.is_hazard()
    }

    /// Class used for hitbox padding lookups
    pub fn hitbox_class(&self) -> HitboxClass {
        match self {
            EntityKind::File { .. } => HitboxClass::File,
            EntityKind::Cloud => HitboxClass::Cloud,
            EntityKind::Obstacle(ObstacleKind::Airplane) => HitboxClass::Airplane,
            EntityKind::Obstacle(ObstacleKind::Bird) => HitboxClass::Bird,
            EntityKind::Obstacle(ObstacleKind::Ufo) => HitboxClass::Ufo,
            EntityKind::Obstacle(ObstacleKind::Parachute) => HitboxClass::Parachute,
        }
    }
}

/// Key into the padding table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitboxClass {
    Player,
    File,
    Cloud,
    Airplane,
    Bird,
    Ufo,
    Parachute,
}

/// Per-kind motion rule and the state it needs.
///
/// Speeds and phase steps are per tick at the nominal 60 Hz rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Does not move on its own
    Fixed,
    /// Falls straight down, removed once fully past the bottom edge plus margin
    Descend { speed: f32, exit_margin: f32 },
    /// Crosses horizontally, turns around past the edge and picks a new lane
    Bounce {
        speed: f32,
        direction: f32,
        margin: f32,
        /// Lane band as fractions of world height: `top + rand * span`
        lane_top: f32,
        lane_span: f32,
    },
    /// Horizontal bounce with a sinusoidal altitude around `base_y`
    Wave {
        speed: f32,
        direction: f32,
        margin: f32,
        base_y: f32,
        phase: f32,
        amplitude: f32,
        frequency: f32,
        /// Wing animation phase (visual only)
        flap: f32,
    },
    /// Drifts down while swaying sideways; wraps to the top when it leaves
    Sway {
        speed: f32,
        phase: f32,
        amplitude: f32,
        frequency: f32,
        respawn_y: f32,
    },
    /// Idle bobbing; shifts the rendered position, not the logical one
    Float {
        phase: f32,
        frequency: f32,
        amplitude: f32,
    },
}

/// Entity lifecycle for simple (non-mole) entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Active,
    /// Resolved by a collision or tap this tick; pruned at end of tick
    Collected,
    /// Left the world; pruned at end of tick
    Expired,
}

/// A spawned game object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Center of the visual box (logical position)
    pub pos: Vec2,
    pub size: Vec2,
    pub motion: Motion,
    pub lifecycle: Lifecycle,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, size: Vec2, motion: Motion) -> Self {
        Self {
            id,
            kind,
            pos,
            size: size.max(Vec2::ZERO),
            motion,
            lifecycle: Lifecycle::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// Position used for drawing and for every hit test.
    ///
    /// Floating entities bob around their logical position; both the renderer
    /// and the collision detector read this value so what you see is what you hit.
    pub fn render_pos(&self) -> Vec2 {
        match self.motion {
            Motion::Float {
                phase, amplitude, ..
            } => self.pos + Vec2::new(0.0, phase.sin() * amplitude),
            _ => self.pos,
        }
    }

    /// Horizontal travel direction, if the motion rule has one (for sprite flipping)
    pub fn facing(&self) -> Option<f32> {
        match self.motion {
            Motion::Bounce { direction, .. } | Motion::Wave { direction, .. } => Some(direction),
            _ => None,
        }
    }
}

/// The player avatar in the flying game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    /// Movement per tick
    pub speed: f32,
    /// Velocity applied on the last update
    pub vel: Vec2,
    /// Tilt in degrees (visual only)
    pub rotation: f32,
    /// Tap-to-move destination
    pub target: Option<Vec2>,
    /// Ticks left on the "eating" face
    pub eating_ticks: f32,
}

impl Player {
    pub fn new(pos: Vec2, size: Vec2, speed: f32) -> Self {
        Self {
            pos,
            size,
            speed,
            vel: Vec2::ZERO,
            rotation: 0.0,
            target: None,
            eating_ticks: 0.0,
        }
    }

    /// Whether the renderer should show the eating face
    pub fn is_eating(&self) -> bool {
        self.eating_ticks > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hazard_classification() {
        let virus = EntityKind::File {
            virus: true,
            name: "Trojan.exe".into(),
            size_label: "300 KB".into(),
        };
        let benign = EntityKind::File {
            virus: false,
            name: "Dubai".into(),
            size_label: "300 KB".into(),
        };
        assert!(virus.is_hazard());
        assert!(benign.is_collectible());
        assert!(EntityKind::Cloud.is_collectible());
        assert!(EntityKind::Obstacle(ObstacleKind::Bird).is_hazard());
    }

    #[test]
    fn test_render_pos_follows_float() {
        let mut cloud = Entity::new(
            1,
            EntityKind::Cloud,
            Vec2::new(100.0, 100.0),
            Vec2::new(168.0, 84.0),
            Motion::Float {
                phase: std::f32::consts::FRAC_PI_2,
                frequency: 0.03,
                amplitude: 5.0,
            },
        );
        assert!((cloud.render_pos().y - 105.0).abs() < 1e-4);
        assert_eq!(cloud.pos.y, 100.0);

        cloud.motion = Motion::Fixed;
        assert_eq!(cloud.render_pos(), cloud.pos);
    }

    #[test]
    fn test_negative_size_is_clamped() {
        let e = Entity::new(
            1,
            EntityKind::Cloud,
            Vec2::ZERO,
            Vec2::new(-4.0, 10.0),
            Motion::Fixed,
        );
        assert_eq!(e.size, Vec2::new(0.0, 10.0));
    }
}

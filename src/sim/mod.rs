//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ascending id)
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod entity;
pub mod hole;
pub mod motion;
pub mod score;
pub mod spawner;
pub mod state;
pub mod store;
pub mod tick;

pub use collision::{Aabb, PaddingTable, hitbox, overlaps, player_touches, visual_box};
pub use difficulty::{DifficultyCurve, DifficultyParams, TickRange};
pub use entity::{Entity, EntityKind, HitboxClass, Lifecycle, Motion, ObstacleKind, Player};
pub use hole::{Hole, HoleState};
pub use motion::DirectionKeys;
pub use score::{Grade, Hazard, Outcome, ScoreRule};
pub use spawner::{PlacementPolicy, try_place};
pub use state::{GameEvent, Session, SessionState, Snapshot};
pub use store::EntityStore;
pub use tick::{TickInput, on_second, tick};

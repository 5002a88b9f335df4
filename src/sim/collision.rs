//! Collision detection on padded axis-aligned boxes
//!
//! Sprites have transparent margins, so each kind shrinks its box by a padding
//! fraction before testing. Large fast hazards get the heaviest padding to keep
//! near misses forgiving.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, HitboxClass, Player};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box of `size` centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size.max(Vec2::ZERO) * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Shrink every side by `fraction * size` along that axis.
    ///
    /// Each side gives up at most half the size, so the result is always
    /// contained in `self` (degenerating to the center line for fractions ≥ 0.5).
    pub fn inset(&self, fraction: f32) -> Self {
        let size = self.size();
        let per_side = (size * fraction.max(0.0)).min(size * 0.5);
        Self {
            min: self.min + per_side,
            max: self.max - per_side,
        }
    }

    /// Grow every side by an absolute gap
    pub fn expand(&self, gap: f32) -> Self {
        let gap = Vec2::splat(gap);
        Self {
            min: self.min - gap,
            max: self.max + gap,
        }
    }

    /// Strict overlap: boxes that only touch do not collide
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Inclusive point test (taps on the border count)
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// `other` lies entirely inside `self`
    pub fn contains(&self, other: &Aabb) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }
}

/// Per-kind hitbox padding fractions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaddingTable {
    pub player: f32,
    pub file: f32,
    pub cloud: f32,
    pub airplane: f32,
    pub bird: f32,
    pub ufo: f32,
    pub parachute: f32,
}

impl Default for PaddingTable {
    fn default() -> Self {
        Self {
            player: 0.15,
            file: 0.0,
            cloud: 0.0,
            airplane: 0.4,
            bird: 0.3,
            ufo: 0.4,
            parachute: 0.35,
        }
    }
}

impl PaddingTable {
    pub fn fraction(&self, class: HitboxClass) -> f32 {
        match class {
            HitboxClass::Player => self.player,
            HitboxClass::File => self.file,
            HitboxClass::Cloud => self.cloud,
            HitboxClass::Airplane => self.airplane,
            HitboxClass::Bird => self.bird,
            HitboxClass::Ufo => self.ufo,
            HitboxClass::Parachute => self.parachute,
        }
    }

    /// All entries paired with their class, for validation
    pub fn entries(&self) -> [(HitboxClass, f32); 7] {
        [
            (HitboxClass::Player, self.player),
            (HitboxClass::File, self.file),
            (HitboxClass::Cloud, self.cloud),
            (HitboxClass::Airplane, self.airplane),
            (HitboxClass::Bird, self.bird),
            (HitboxClass::Ufo, self.ufo),
            (HitboxClass::Parachute, self.parachute),
        ]
    }
}

/// Unpadded box at the entity's rendered position
pub fn visual_box(entity: &Entity) -> Aabb {
    Aabb::from_center(entity.render_pos(), entity.size)
}

/// Padded box used for contact tests
pub fn hitbox(entity: &Entity, padding: &PaddingTable) -> Aabb {
    visual_box(entity).inset(padding.fraction(entity.kind.hitbox_class()))
}

pub fn player_hitbox(player: &Player, padding: &PaddingTable) -> Aabb {
    Aabb::from_center(player.pos, player.size).inset(padding.fraction(HitboxClass::Player))
}

/// Padded overlap between two entities
pub fn overlaps(a: &Entity, b: &Entity, padding: &PaddingTable) -> bool {
    hitbox(a, padding).overlaps(&hitbox(b, padding))
}

/// Padded overlap between the player and an entity
pub fn player_touches(player: &Player, entity: &Entity, padding: &PaddingTable) -> bool {
    player_hitbox(player, padding).overlaps(&hitbox(entity, padding))
}

/// Fraction of the entity's width currently inside `[0, world_width]`
pub fn visible_fraction(entity: &Entity, world_width: f32) -> f32 {
    if entity.size.x <= 0.0 {
        return 0.0;
    }
    let b = visual_box(entity);
    let left = b.min.x.max(0.0);
    let right = b.max.x.min(world_width);
    (right - left).max(0.0) / entity.size.x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{EntityKind, Motion, ObstacleKind};
    use proptest::prelude::*;

    fn obstacle(kind: ObstacleKind, center: Vec2, size: Vec2) -> Entity {
        Entity::new(1, EntityKind::Obstacle(kind), center, size, Motion::Fixed)
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0));
        assert!(!a.overlaps(&b));
        let c = Aabb::new(Vec2::new(9.9, 0.0), Vec2::new(20.0, 10.0));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_inset_shrinks_each_side() {
        let b = Aabb::from_center(Vec2::ZERO, Vec2::new(100.0, 50.0)).inset(0.4);
        // 40% off each side leaves 20% of the original extent
        assert!((b.size().x - 20.0).abs() < 1e-4);
        assert!((b.size().y - 10.0).abs() < 1e-4);
        assert_eq!(b.center(), Vec2::ZERO);
    }

    #[test]
    fn test_heavy_padding_forgives_edge_contact() {
        let padding = PaddingTable::default();
        let plane = obstacle(
            ObstacleKind::Airplane,
            Vec2::new(500.0, 100.0),
            Vec2::new(440.0, 140.0),
        );
        let mut player = Player::new(Vec2::new(320.0, 100.0), Vec2::splat(92.0), 7.0);
        // Visual boxes overlap (plane starts at x=280, player ends at x=366)
        assert!(Aabb::from_center(player.pos, player.size).overlaps(&visual_box(&plane)));
        // Padded boxes do not (plane hitbox starts at x=456)
        assert!(!player_touches(&player, &plane, &padding));

        player.pos.x = 480.0;
        assert!(player_touches(&player, &plane, &padding));
    }

    #[test]
    fn test_visible_fraction() {
        let e = obstacle(ObstacleKind::Ufo, Vec2::new(0.0, 0.0), Vec2::new(200.0, 50.0));
        assert!((visible_fraction(&e, 800.0) - 0.5).abs() < 1e-4);
        let e = obstacle(ObstacleKind::Ufo, Vec2::new(-300.0, 0.0), Vec2::new(200.0, 50.0));
        assert_eq!(visible_fraction(&e, 800.0), 0.0);
        let e = obstacle(ObstacleKind::Ufo, Vec2::new(400.0, 0.0), Vec2::new(200.0, 50.0));
        assert!((visible_fraction(&e, 800.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_hitbox_uses_floated_position() {
        let padding = PaddingTable::default();
        let cloud = Entity::new(
            1,
            EntityKind::Cloud,
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Motion::Float {
                phase: std::f32::consts::FRAC_PI_2,
                frequency: 0.02,
                amplitude: 5.0,
            },
        );
        let hb = hitbox(&cloud, &padding);
        assert!((hb.center().y - 5.0).abs() < 1e-4);
    }

    fn arb_box() -> impl Strategy<Value = (f32, f32, f32, f32)> {
        (-500.0f32..500.0, -500.0f32..500.0, 0.0f32..300.0, 0.0f32..300.0)
    }

    proptest! {
        #[test]
        fn prop_padded_box_inside_visual(
            (x, y, w, h) in arb_box(),
            fraction in 0.0f32..0.999,
        ) {
            let visual = Aabb::from_center(Vec2::new(x, y), Vec2::new(w, h));
            let padded = visual.inset(fraction);
            prop_assert!(visual.contains(&padded));
        }

        #[test]
        fn prop_overlap_is_symmetric(
            (ax, ay, aw, ah) in arb_box(),
            (bx, by, bw, bh) in arb_box(),
            pa in 0.0f32..0.999,
            pb in 0.0f32..0.999,
        ) {
            let a = Aabb::from_center(Vec2::new(ax, ay), Vec2::new(aw, ah)).inset(pa);
            let b = Aabb::from_center(Vec2::new(bx, by), Vec2::new(bw, bh)).inset(pb);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_entity_overlap_is_symmetric(
            (ax, ay, aw, ah) in arb_box(),
            (bx, by, bw, bh) in arb_box(),
        ) {
            let padding = PaddingTable::default();
            let a = obstacle(ObstacleKind::Bird, Vec2::new(ax, ay), Vec2::new(aw, ah));
            let b = obstacle(ObstacleKind::Parachute, Vec2::new(bx, by), Vec2::new(bw, bh));
            prop_assert_eq!(overlaps(&a, &b, &padding), overlaps(&b, &a, &padding));
        }
    }
}

//! Procedural spawning: rejection-sampled placement, weighted kind selection
//! and the countdown gate that paces timed spawns.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, visual_box};
use super::entity::Entity;
use crate::uniform;

/// What to do when every placement attempt collides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementPolicy {
    /// Give up on this spawn
    Strict,
    /// Use the last candidate anyway
    Lenient,
}

/// Minimum separation between a candidate and existing entities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Spacing {
    /// Unpadded boxes must stay at least this far apart on some axis
    BoxGap(f32),
    /// Centers must be at least this far apart
    CenterDistance(f32),
}

/// Placement constraints for one spawn
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRule {
    /// Range of candidate centers
    pub region: Aabb,
    /// Size of the entity being placed
    pub size: Vec2,
    pub spacing: Spacing,
    pub max_attempts: u32,
    pub policy: PlacementPolicy,
}

/// Chosen spawn position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pos: Vec2,
    pub attempts: u32,
    /// Accepted despite violating spacing (lenient policy ran out of attempts)
    pub degraded: bool,
}

impl PlacementRule {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            uniform(rng, self.region.min.x, self.region.max.x),
            uniform(rng, self.region.min.y, self.region.max.y),
        )
    }

    /// Whether `candidate` keeps the required distance from `other`
    pub fn clears(&self, candidate: Vec2, other: &Entity) -> bool {
        match self.spacing {
            Spacing::BoxGap(gap) => !Aabb::from_center(candidate, self.size)
                .expand(gap)
                .overlaps(&visual_box(other)),
            Spacing::CenterDistance(min) => candidate.distance(other.pos) >= min,
        }
    }
}

/// Sample positions until one clears every active entity, up to the attempt cap.
///
/// Returns `None` only under the strict policy when the cap is exhausted.
/// `existing` is walked once per attempt, so pass something cheap to clone
/// (a slice, or a filtered slice iterator).
pub fn try_place<'a, I, R>(existing: I, rule: &PlacementRule, rng: &mut R) -> Option<Placement>
where
    I: IntoIterator<Item = &'a Entity> + Clone,
    R: Rng + ?Sized,
{
    let max_attempts = rule.max_attempts.max(1);
    let mut candidate = rule.sample(rng);

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            candidate = rule.sample(rng);
        }
        let clear = existing
            .clone()
            .into_iter()
            .filter(|e| e.is_active())
            .all(|e| rule.clears(candidate, e));
        if clear {
            return Some(Placement {
                pos: candidate,
                attempts: attempt,
                degraded: false,
            });
        }
    }

    match rule.policy {
        PlacementPolicy::Strict => None,
        PlacementPolicy::Lenient => Some(Placement {
            pos: candidate,
            attempts: max_attempts,
            degraded: true,
        }),
    }
}

/// A weighted group of interchangeable options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category<T> {
    pub weight: f32,
    pub options: Vec<T>,
}

/// Pick a category by weight, then an option uniformly within it
pub fn choose_weighted<'a, T, R: Rng + ?Sized>(categories: &'a [Category<T>], rng: &mut R) -> Option<&'a T> {
    let usable = || categories.iter().filter(|c| c.weight > 0.0 && !c.options.is_empty());
    let total: f32 = usable().map(|c| c.weight).sum();
    if total <= 0.0 {
        return None;
    }

    let mut roll = rng.random::<f32>() * total;
    let mut chosen = None;
    for category in usable() {
        chosen = Some(category);
        if roll < category.weight {
            break;
        }
        roll -= category.weight;
    }
    chosen.and_then(|c| c.options.choose(rng))
}

/// Countdown that gates timed spawns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnGate {
    /// Ticks until the next spawn may happen (may go negative while capped)
    pub countdown: f32,
}

impl SpawnGate {
    pub fn new(initial_delay: f32) -> Self {
        Self {
            countdown: initial_delay,
        }
    }

    /// Count down one step and report whether a spawn is due
    pub fn step(&mut self, scale: f32) -> bool {
        self.countdown -= scale;
        self.countdown <= 0.0
    }

    pub fn reset(&mut self, delay: f32) {
        self.countdown = delay;
    }
}

/// Display size for a downloaded file, between 200 KB and 1.00 GB
pub fn file_size_label<R: Rng + ?Sized>(rng: &mut R) -> String {
    let size: u32 = rng.random_range(200..1024);
    if size >= 1000 {
        format!("{:.2} GB", size as f32 / 1024.0)
    } else {
        format!("{} KB", size)
    }
}

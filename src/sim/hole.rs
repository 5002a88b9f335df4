//! Whack-a-mole holes
//!
//! A hole's occupant only moves hidden → rising → up → (falling | hit) → hidden.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::difficulty::TickRange;
use crate::tuning::{World, WhackRules};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoleState {
    Hidden,
    Rising,
    Up,
    Falling,
    Hit,
}

/// Occupant animation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleParams {
    /// Rise per tick
    pub rise_speed: f32,
    /// Fully-up height
    pub max_rise: f32,
    pub fall_speed: f32,
    /// Faster drop after being whacked
    pub hit_fall_speed: f32,
    /// Star burst duration after a hit
    pub star_ticks: u32,
    /// Clickable sprite box
    pub sprite_size: Vec2,
    /// Fraction of the sprite height that sits above the hole center when fully up
    pub sprite_anchor: f32,
}

impl Default for HoleParams {
    fn default() -> Self {
        Self {
            rise_speed: 5.0,
            max_rise: 60.0,
            fall_speed: 5.0,
            hit_fall_speed: 7.0,
            star_ticks: 20,
            sprite_size: Vec2::new(105.0, 125.0),
            sprite_anchor: 0.63,
        }
    }
}

/// A fixed spawn site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub index: usize,
    pub pos: Vec2,
    pub state: HoleState,
    /// How far the occupant has risen, in `[0, max_rise]`
    pub rise: f32,
    /// Ticks left in the `up` state
    pub dwell_ticks: f32,
    /// Ticks left on the star burst effect (visual only)
    pub star_ticks: f32,
}

impl Hole {
    pub fn new(index: usize, pos: Vec2) -> Self {
        Self {
            index,
            pos,
            state: HoleState::Hidden,
            rise: 0.0,
            dwell_ticks: 0.0,
            star_ticks: 0.0,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.state == HoleState::Hidden
    }

    pub fn reset(&mut self) {
        self.state = HoleState::Hidden;
        self.rise = 0.0;
        self.dwell_ticks = 0.0;
        self.star_ticks = 0.0;
    }

    /// Start rising; only hidden holes can be raised
    pub fn raise(&mut self) -> bool {
        if self.state != HoleState::Hidden {
            return false;
        }
        self.state = HoleState::Rising;
        self.dwell_ticks = 0.0;
        true
    }

    /// Clickable box; slides with the occupant as it rises
    pub fn sprite_box(&self, params: &HoleParams) -> Aabb {
        let top = self.pos.y - params.sprite_size.y * params.sprite_anchor + (params.max_rise - self.rise);
        Aabb::new(
            Vec2::new(self.pos.x - params.sprite_size.x / 2.0, top),
            Vec2::new(self.pos.x + params.sprite_size.x / 2.0, top + params.sprite_size.y),
        )
    }

    /// Whack at `point`; succeeds only while fully up
    pub fn try_hit(&mut self, point: Vec2, params: &HoleParams) -> bool {
        if self.state != HoleState::Up || !self.sprite_box(params).contains_point(point) {
            return false;
        }
        self.state = HoleState::Hit;
        self.star_ticks = params.star_ticks as f32;
        true
    }

    /// Advance the occupant animation. `dwell` is sampled when it reaches the top.
    ///
    /// Returns true if the occupant went back into hiding this step.
    pub fn update<R: Rng + ?Sized>(&mut self, params: &HoleParams, dwell: TickRange, scale: f32, rng: &mut R) -> bool {
        self.star_ticks = (self.star_ticks - scale).max(0.0);

        match self.state {
            HoleState::Hidden => false,
            HoleState::Rising => {
                self.rise += params.rise_speed * scale;
                if self.rise >= params.max_rise {
                    self.rise = params.max_rise;
                    self.state = HoleState::Up;
                    self.dwell_ticks = dwell.sample(rng);
                }
                false
            }
            HoleState::Up => {
                self.dwell_ticks -= scale;
                if self.dwell_ticks <= 0.0 {
                    self.state = HoleState::Falling;
                }
                false
            }
            HoleState::Falling => self.sink(params.fall_speed * scale),
            HoleState::Hit => self.sink(params.hit_fall_speed * scale),
        }
    }

    fn sink(&mut self, amount: f32) -> bool {
        self.rise -= amount;
        if self.rise <= 0.0 {
            self.rise = 0.0;
            self.state = HoleState::Hidden;
            return true;
        }
        false
    }
}

/// Lay holes out on a jittered grid inside the grass band
pub fn layout_holes<R: Rng + ?Sized>(world: &World, rules: &WhackRules, rng: &mut R) -> Vec<Hole> {
    let cols = rules.cols.max(1);
    let rows = rules.rows.max(1);
    let margin_x = world.width * rules.margin_x;
    let band_top = world.height * rules.band_top;
    let band_bottom = world.height * rules.band_bottom;
    let spacing_x = if cols > 1 {
        (world.width - margin_x * 2.0) / (cols - 1) as f32
    } else {
        0.0
    };
    let spacing_y = if rows > 1 {
        (band_bottom - band_top) / (rows - 1) as f32
    } else {
        0.0
    };

    let mut holes = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let base = Vec2::new(margin_x + col as f32 * spacing_x, band_top + row as f32 * spacing_y);
            let jitter = Vec2::new(
                (rng.random::<f32>() - 0.5) * rules.jitter.x,
                (rng.random::<f32>() - 0.5) * rules.jitter.y,
            );
            holes.push(Hole::new(holes.len(), base + jitter));
        }
    }
    holes
}

//! Fixed timestep simulation tick
//!
//! `tick` advances one session by one step; `on_second` runs the 1 Hz
//! countdown. Both are no-ops once the session has ended, so a stale host
//! callback can never mutate a finished game.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{hitbox, player_touches, visible_fraction};
use super::entity::{EntityKind, Lifecycle};
use super::motion::{DirectionKeys, Fate, advance, steer_player};
use super::score::Hazard;
use super::state::{GameEvent, Session};
use crate::consts::*;
use crate::tuning::{GameVariant, VariantRules};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Tap / click in world coordinates
    pub tap: Option<Vec2>,
    /// Held directional keys
    pub keys: DirectionKeys,
}

impl TickInput {
    pub fn tap(point: Vec2) -> Self {
        Self {
            tap: Some(point),
            ..Default::default()
        }
    }
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) {
    if !session.is_playing() {
        return;
    }

    let scale = dt / SIM_DT;
    session.ticks += 1;
    session.elapsed_secs += f64::from(dt);

    match session.variant() {
        GameVariant::FileDrop => tick_file_drop(session, input, scale),
        GameVariant::CloudEater => tick_cloud_eater(session, input, scale),
        GameVariant::WhackADood => tick_whack(session, input, scale),
    }

    // Resolved and departed entities leave before the next pass
    session.store.prune();
}

/// One countdown second; ends the session when the clock hits zero
pub fn on_second(session: &mut Session) {
    if !session.is_playing() {
        return;
    }
    session.remaining_secs = session.remaining_secs.saturating_sub(1);
    let expired = session.remaining_secs == 0;
    if let Some(outcome) = session.keeper.evaluate(&session.config.scoring, expired) {
        session.end(outcome);
    }
}

fn advance_entities(session: &mut Session, scale: f32) {
    let world = session.config.world;
    for entity in session.store.iter_mut().filter(|e| e.is_active()) {
        if advance(entity, &world, scale, &mut session.rng) == Fate::Exited {
            entity.lifecycle = Lifecycle::Expired;
        }
    }
}

fn tick_file_drop(session: &mut Session, input: &TickInput, scale: f32) {
    // Taps resolve against the topmost (most recently spawned) file first
    if let Some(point) = input.tap {
        let padding = &session.config.padding;
        let picked = session
            .store
            .as_slice()
            .iter()
            .rev()
            .filter(|e| e.is_active() && matches!(e.kind, EntityKind::File { .. }))
            .find(|e| hitbox(e, padding).contains_point(point))
            .map(|e| (e.id, e.kind.is_hazard()));

        if let Some((id, hazard)) = picked {
            if let Some(file) = session.store.get_mut(id) {
                file.lifecycle = Lifecycle::Collected;
            }
            if hazard {
                session.hit_hazard(Hazard::Virus);
                return;
            }
            let score = session.keeper.collect();
            session.push_event(GameEvent::Collected { id, score });
        }
    }

    let VariantRules::FileDrop(rules) = &session.config.rules else {
        return;
    };
    let params = rules.difficulty.parameters(session.elapsed());
    let under_cap = (session.store.active_count() as u64) < params.max_active as u64;
    if session.gate.step(scale) && under_cap {
        session.spawn_file();
        let delay = params.spawn_delay.sample(&mut session.rng);
        session.gate.reset(delay);
    }

    advance_entities(session, scale);
}

fn tick_cloud_eater(session: &mut Session, input: &TickInput, scale: f32) {
    let VariantRules::CloudEater(rules) = &session.config.rules else {
        return;
    };
    let steer = rules.steer.clone();
    let eat_ticks = rules.eat_anim_ticks as f32;
    let min_visible = rules.min_visible_fraction;
    let batch = rules.replenish_batch;
    let every = rules.replenish_every;
    let world = session.config.world;

    let Some(player) = session.player.as_mut() else {
        return;
    };
    if let Some(point) = input.tap {
        player.target = Some(point);
    }
    steer_player(player, input.keys, &world, &steer, scale);
    if player.is_eating() {
        player.eating_ticks = (player.eating_ticks - scale).max(0.0);
    }

    advance_entities(session, scale);

    // Never leave the player with nothing to eat
    let uneaten = session.store.count_where(|k| matches!(k, EntityKind::Cloud));
    if uneaten == 0 {
        session.spawn_clouds(batch);
    }

    // Clouds first, in insertion order; clouds spawned by a cascade wait
    // for the next tick
    let clouds: Vec<u32> = session
        .store
        .active()
        .filter(|e| matches!(e.kind, EntityKind::Cloud))
        .map(|e| e.id)
        .collect();
    for id in clouds {
        let touching = match (session.player.as_ref(), session.store.get(id)) {
            (Some(player), Some(cloud)) => player_touches(player, cloud, &session.config.padding),
            _ => false,
        };
        if !touching {
            continue;
        }
        if let Some(cloud) = session.store.get_mut(id) {
            cloud.lifecycle = Lifecycle::Collected;
        }
        if let Some(player) = session.player.as_mut() {
            player.eating_ticks = eat_ticks;
        }
        let score = session.keeper.collect();
        session.push_event(GameEvent::Collected { id, score });

        if score >= session.next_replenish_at {
            session.spawn_clouds(batch);
            session.next_replenish_at += every;
        }

        if let Some(outcome) = session.keeper.evaluate(&session.config.scoring, false) {
            session.end(outcome);
            return;
        }
    }

    if session.invulnerable_ticks > 0.0 {
        session.invulnerable_ticks = (session.invulnerable_ticks - scale).max(0.0);
    }
    if session.invulnerable_ticks > 0.0 {
        return;
    }

    let Some(player) = session.player.as_ref() else {
        return;
    };
    let hit = session
        .store
        .active()
        .filter(|e| e.kind.is_hazard())
        .filter(|e| visible_fraction(e, world.width) >= min_visible)
        .find(|e| player_touches(player, e, &session.config.padding))
        .and_then(|e| match e.kind {
            EntityKind::Obstacle(kind) => Some(kind),
            _ => None,
        });
    if let Some(kind) = hit {
        log::debug!("Player hit a {} at tick {}", kind.as_str(), session.ticks);
        session.hit_hazard(Hazard::Obstacle(kind));
    }
}

fn tick_whack(session: &mut Session, input: &TickInput, scale: f32) {
    let VariantRules::WhackADood(rules) = &session.config.rules else {
        return;
    };
    let hole_params = rules.hole.clone();
    let params = rules.difficulty.parameters(session.elapsed());

    if let Some(point) = input.tap {
        let hits: Vec<usize> = session
            .holes
            .iter_mut()
            .filter_map(|hole| hole.try_hit(point, &hole_params).then_some(hole.index))
            .collect();
        for hole in hits {
            let score = session.keeper.collect();
            session.push_event(GameEvent::MoleHit { hole, score });
        }
    }

    let active = session.holes.iter().filter(|h| !h.is_hidden()).count() as u64;
    if session.gate.step(scale) && active < params.max_active as u64 && session.raise_mole().is_some() {
        let delay = params.spawn_delay.sample(&mut session.rng);
        session.gate.reset(delay);
    }

    for hole in session.holes.iter_mut() {
        hole.update(&hole_params, params.dwell, scale, &mut session.rng);
    }
}

//! Collision and scoring resolution
//!
//! Runs once per step after the skier and the obstacles have moved. Pickups
//! are handled first, then hazards and jumps. Nothing is resolved while the
//! skier is tumbling.

use super::collision::hits;
use super::effects::IndicatorLabel;
use super::obstacles::{HazardKind, JumpKind, ObstacleKind};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::SKIER_FOOTPRINT;

/// Resolve every overlap between the skier and the obstacle pool
pub fn resolve_collisions(state: &mut GameState) {
    if state.phase == GamePhase::GameOver || state.skier.is_tumbling() {
        return;
    }
    collect_pickups(state);
    resolve_hazards_and_jumps(state);
}

/// Pass 1: every overlapping pickup pays out exactly once
fn collect_pickups(state: &mut GameState) {
    let skier_pos = state.skier.position;
    for i in 0..state.obstacles.obstacles().len() {
        let obstacle = &state.obstacles.obstacles()[i];
        if !obstacle.is_pickup()
            || !obstacle.is_collidable
            || !state.obstacles.is_colliding(skier_pos, obstacle)
        {
            continue;
        }
        let id = obstacle.id;

        // The flag flips before any side effect
        if !state.obstacles.mark_collected(id) {
            continue;
        }
        state.skier.gain_extra_life();
        let lives = state.skier.lives();
        log::debug!("Hot chocolate {id} collected, lives now {lives}");
        state.effects.flash_life(skier_pos);
        state.push_event(GameEvent::PickupCollected { id });
        state.push_event(GameEvent::ExtraLife { lives });
        state.obstacles.replace(id, &mut state.rng);
    }
}

/// Pass 2: jumps launch the skier, the first hazard hit ends the pass
fn resolve_hazards_and_jumps(state: &mut GameState) {
    let skier_pos = state.skier.position;
    for i in 0..state.obstacles.obstacles().len() {
        let obstacle = &state.obstacles.obstacles()[i];
        match obstacle.kind {
            ObstacleKind::Pickup => continue,
            ObstacleKind::Jump(jump) => {
                if state.obstacles.is_colliding(skier_pos, obstacle) {
                    try_jump(state, jump);
                }
            }
            ObstacleKind::Hazard(hazard) => {
                if !obstacle.is_collidable
                    || state.skier.is_jumping()
                    || state.skier.is_tumbling()
                {
                    continue;
                }
                if hits(skier_pos, SKIER_FOOTPRINT, obstacle.position, obstacle.footprint) {
                    crash(state, hazard);
                    break;
                }
            }
        }
    }
}

fn try_jump(state: &mut GameState, jump: JumpKind) {
    let speed = state.clock.speed();
    if !state.skier.start_jump(speed) {
        return;
    }
    let bonus = match jump {
        JumpKind::Ramp => state.tuning.scoring.jump_ramp_bonus,
        JumpKind::Banner { .. } => state.tuning.scoring.banner_jump_bonus,
    };
    state.score.add_bonus(bonus);
    log::debug!("Jump from {jump:?} at speed {speed:.3}, +{bonus}");
    state
        .effects
        .spawn_indicator(IndicatorLabel::Points(bonus), state.skier.position);
    state.push_event(GameEvent::JumpStarted { jump, bonus });
}

fn crash(state: &mut GameState, hazard: HazardKind) {
    if !state.skier.start_tumbling(&mut state.rng) {
        return;
    }
    let remaining = state.skier.lives();
    log::debug!("Hit a {hazard:?}, {remaining} lives left");
    state.push_event(GameEvent::Crashed { hazard });
    state.push_event(GameEvent::LifeLost { remaining });

    if remaining == 0 {
        let final_score = state.score.total();
        state.phase = GamePhase::GameOver;
        log::info!("Game over, final score {final_score}");
        state.push_event(GameEvent::GameOver { final_score });
    }
}

/// Pay out the flips of a finished jump. Does nothing while airborne.
pub fn award_flips(state: &mut GameState) {
    if state.skier.is_jumping() {
        return;
    }
    let flips = state.skier.flip_count();
    if flips == 0 {
        return;
    }
    let serial = state.skier.jump_serial();
    let per_flip = state.tuning.scoring.points_per_flip;
    if let Some(points) = state.score.award_flips(serial, flips, per_flip) {
        log::debug!("{flips} flip(s) landed, +{points}");
        state
            .effects
            .spawn_indicator(IndicatorLabel::Points(points), state.skier.position);
        state.push_event(GameEvent::FlipBonus { flips, points });
    }
    state.skier.reset_flip_count();
}

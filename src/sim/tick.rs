//! One fixed simulation step

use super::effects::IndicatorLabel;
use super::resolver::{award_flips, resolve_collisions};
use super::state::{GameEvent, GamePhase, GameState};
use crate::platform::InputState;

/// Advance the game by one fixed timestep.
///
/// Order: skier, flip payout, obstacles, terrain, fences, collisions, speed
/// ramp, distance score, effects. Flips are paid before collisions so a
/// landing onto another ramp cannot start a new jump over the unpaid count. Does nothing unless the session is running.
pub fn tick(state: &mut GameState, input: &InputState) {
    if state.phase != GamePhase::Running {
        return;
    }

    let dt = state.clock.fixed_step();
    let time = state.clock.time_at(state.time_ticks);
    state.time_ticks += 1;
    let speed = state.clock.speed();

    let skier = state.skier.update(input, speed, dt);
    if skier.flips_completed > 0 {
        let per_flip = state.tuning.scoring.points_per_flip;
        let above = state.skier.position + glam::Vec3::Y;
        for _ in 0..skier.flips_completed {
            state
                .effects
                .spawn_indicator(IndicatorLabel::Points(per_flip), above);
        }
        state.push_event(GameEvent::FlipCompleted {
            count: state.skier.flip_count(),
        });
    }
    if skier.landed.is_some() {
        state.push_event(GameEvent::Landed);
    }
    if skier.recovered {
        log::trace!("Skier recovered from tumble");
    }
    award_flips(state);

    state.obstacles.update(speed, &time, &mut state.rng);
    state.terrain.update(speed, &mut state.rng);
    state.fences.update(speed, &mut state.rng);

    resolve_collisions(state);

    state.clock.increase_speed(dt);
    state.score.add_distance(speed);

    let trail_origin = (!state.skier.is_tumbling()).then_some(state.skier.position);
    state.effects.update(&time, trail_origin, &mut state.rng);

    let score = state.score.total();
    if score != state.reported_score {
        state.reported_score = score;
        state.push_event(GameEvent::ScoreChanged { score });
    }
}

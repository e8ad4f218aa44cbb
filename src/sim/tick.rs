//! Per-frame simulation tick
//!
//! Order within one tick: free fish swim, the spawner rolls, then the hook
//! state machine advances. Side effects are queued as `GameEvent`s.

use glam::Vec2;

use super::motion::advance_fish;
use super::spawn::maybe_spawn;
use super::state::{GameEvent, GamePhase, Line, LostReason, SimState};
use crate::consts::*;

/// Upgrade-dependent parameters for a tick
#[derive(Debug, Clone)]
pub struct TickInput {
    /// Rod tier effect (spawn weight bonus)
    pub rod_effect: f32,
    /// Reel tier effect (reel power multiplier)
    pub reel_multiplier: f32,
    /// Per-tick spawn probability
    pub spawn_chance: f64,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            rod_effect: 0.0,
            reel_multiplier: 1.0,
            spawn_chance: SPAWN_CHANCE,
        }
    }
}

/// Advance the simulation by `dt` frame units
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    let hooked = state.phase.hooked_fish();
    advance_fish(&mut state.fish, state.catalog, hooked, dt);
    maybe_spawn(state, input.rod_effect, input.spawn_chance);

    match state.phase {
        GamePhase::Idle | GamePhase::Caught { .. } => {}

        GamePhase::Casting => {
            state.phase = GamePhase::Sinking;
        }

        GamePhase::Sinking => sink(state, dt),

        GamePhase::Hooked(line) | GamePhase::Reeling(line) => fight(state, line, input, dt),

        GamePhase::Lost { .. } => {
            state.hook.y -= LOST_DRIFT_SPEED * dt;
            if state.hook.y < PARK_Y {
                state.park_hook();
                state.phase = GamePhase::Idle;
            }
        }
    }
}

/// True if a fish at `fish` is inside the square bite box around `hook`
pub fn in_bite_box(fish: Vec2, hook: Vec2) -> bool {
    (fish.x - hook.x).abs() < HOOK_RADIUS && (fish.y - hook.y).abs() < HOOK_RADIUS
}

/// Sinking: drop the hook and look for the first fish in reach
fn sink(state: &mut SimState, dt: f32) {
    state.hook.y += GRAVITY * dt;

    let hook = state.hook;
    let bite = state
        .fish
        .iter()
        .find(|f| in_bite_box(f.pos, hook))
        .map(|f| (f.id, f.species));

    if let Some((fish_id, species)) = bite {
        log::debug!("Bite: {} (#{}) at depth {:.1}", species, fish_id, hook.y);
        state.phase = GamePhase::Hooked(Line::new(fish_id));
        state.emit(GameEvent::Bite { fish_id, species });
        return;
    }

    if state.hook.y > SINK_LIMIT_Y {
        state.park_hook();
        state.phase = GamePhase::Idle;
        state.emit(GameEvent::Missed);
    }
}

/// Hooked/Reeling: tension physics and win/loss checks
fn fight(state: &mut SimState, mut line: Line, input: &TickInput, dt: f32) {
    let Some(species) = state
        .fish_by_id(line.fish_id)
        .and_then(|f| state.species(f.species))
    else {
        // Fish vanished from the water
        state.phase = GamePhase::Lost {
            reason: LostReason::FishEscaped,
        };
        return;
    };

    let reeling = state.reel_held();
    if reeling {
        let power = REEL_POWER * input.reel_multiplier;
        state.hook.y -= power * REEL_RISE_FACTOR * dt;
        line.tension += TENSION_INCREASE * dt;

        line.reel_clock += dt;
        if line.reel_clock > REEL_CLICK_INTERVAL {
            line.reel_clock = 0.0;
            state.emit(GameEvent::ReelClick);
        }
    } else {
        state.hook.y += species.speed * FISH_PULL_FACTOR * dt;
        line.tension -= TENSION_DECREASE * dt;
    }
    line.tension = line.tension.clamp(0.0, MAX_TENSION);

    let hook = state.hook;
    if let Some(fish) = state.fish.iter_mut().find(|f| f.id == line.fish_id) {
        fish.pos = hook;
    }

    // Tension outcomes win over reaching the surface on the same tick
    let lost = if line.tension >= MAX_TENSION {
        Some(LostReason::LineSnapped)
    } else if line.tension <= 0.0 {
        Some(LostReason::FishEscaped)
    } else {
        None
    };

    if let Some(reason) = lost {
        log::debug!("Lost {} ({:?})", species.id, reason);
        state.phase = GamePhase::Lost { reason };
        state.emit(GameEvent::Lost {
            reason,
            species: species.id,
        });
    } else if state.hook.y <= 0.0 {
        log::debug!("Landed {} (#{})", species.id, line.fish_id);
        state.phase = GamePhase::Caught {
            fish_id: line.fish_id,
        };
        state.emit(GameEvent::Landed {
            fish_id: line.fish_id,
            species: species.id,
        });
    } else if reeling {
        state.phase = GamePhase::Reeling(line);
    } else {
        state.phase = GamePhase::Hooked(line);
    }
}

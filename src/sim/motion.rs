//! Free-swimming fish motion
//!
//! Purely kinematic: fish swim horizontally at a constant speed and leave the
//! water past the edge opposite their spawn edge. No collisions, no depth
//! change. A hooked fish is moved by the line instead.

use super::state::ActiveFish;
use crate::consts::TIME_SCALE;
use crate::tuning::FishSpecies;

/// Advance all unhooked fish by `dt` frame units and cull the ones that left.
/// Returns the number of fish removed.
pub fn advance_fish(
    fish: &mut Vec<ActiveFish>,
    catalog: &[FishSpecies],
    hooked: Option<u32>,
    dt: f32,
) -> usize {
    let before = fish.len();

    fish.retain_mut(|f| {
        if hooked == Some(f.id) {
            return true;
        }
        let Some(species) = catalog.iter().find(|s| s.id == f.species) else {
            return true;
        };

        f.pos.x += species.speed * f.speed_multiplier * f.direction.sign() * TIME_SCALE * dt;
        !f.direction.has_exited(f.pos.x)
    });

    before - fish.len()
}

//! Fish spawning
//!
//! One Bernoulli trial per tick. Species are drawn by rarity weight, where the
//! rod tier's effect value tilts the odds toward Rare and Legendary fish
//! without ever removing Common ones.

use glam::Vec2;
use rand::Rng;

use super::state::{ActiveFish, Direction, SimState};
use crate::consts::*;
use crate::tuning::{FishSpecies, Rarity};

/// Spawn weight of a rarity under the given rod effect
pub fn spawn_weight(rarity: Rarity, rod_effect: f32) -> f32 {
    match rarity {
        Rarity::Common => 100.0,
        Rarity::Rare => 20.0 + rod_effect,
        Rarity::Legendary => 5.0 + rod_effect * 0.5,
    }
}

/// Pick a species for a uniform roll in [0, 1).
///
/// Linear scan over cumulative weight. Falls back to the first species if
/// rounding pushes the roll past the end.
pub fn pick_species(catalog: &[FishSpecies], rod_effect: f32, roll: f32) -> Option<&FishSpecies> {
    let total: f32 = catalog
        .iter()
        .map(|s| spawn_weight(s.rarity, rod_effect))
        .sum();
    let mut remaining = roll * total;

    for species in catalog {
        let weight = spawn_weight(species.rarity, rod_effect);
        if remaining < weight {
            return Some(species);
        }
        remaining -= weight;
    }

    catalog.first()
}

/// Draw a species using the given RNG
pub fn choose_species<'a, R: Rng + ?Sized>(
    catalog: &'a [FishSpecies],
    rod_effect: f32,
    rng: &mut R,
) -> Option<&'a FishSpecies> {
    let roll: f32 = rng.random();
    pick_species(catalog, rod_effect, roll)
}

/// Roll the per-tick spawn chance and spawn a fish on success
pub fn maybe_spawn(state: &mut SimState, rod_effect: f32, chance: f64) -> Option<u32> {
    let chance = chance.clamp(0.0, 1.0);
    if !state.rng.random_bool(chance) {
        return None;
    }
    spawn_fish(state, rod_effect)
}

/// Spawn one fish at a screen edge, unless the water is full
pub fn spawn_fish(state: &mut SimState, rod_effect: f32) -> Option<u32> {
    if state.fish.len() >= MAX_ACTIVE_FISH {
        return None;
    }

    let species = choose_species(state.catalog, rod_effect, &mut state.rng)?;

    let direction = if state.rng.random_bool(0.5) {
        Direction::Right
    } else {
        Direction::Left
    };
    let y = species.depth * DEPTH_SPAN + state.rng.random::<f32>() * DEPTH_JITTER;
    let speed_multiplier = state.rng.random_range(SPEED_MULT_MIN..SPEED_MULT_MAX);

    let id = state.next_entity_id();
    state.fish.push(ActiveFish {
        id,
        species: species.id,
        pos: Vec2::new(direction.spawn_x(), y),
        direction,
        speed_multiplier,
    });

    log::debug!("Spawned {} (#{}) heading {:?}", species.id, id, direction);
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::FISH_SPECIES;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    static TRIO: [FishSpecies; 3] = [
        FishSpecies {
            id: "common",
            name: "Common",
            glyph: "c",
            base_value: 10,
            speed: 0.5,
            depth: 0.1,
            rarity: Rarity::Common,
            color: "#fff",
        },
        FishSpecies {
            id: "rare",
            name: "Rare",
            glyph: "r",
            base_value: 50,
            speed: 0.5,
            depth: 0.5,
            rarity: Rarity::Rare,
            color: "#fff",
        },
        FishSpecies {
            id: "legendary",
            name: "Legendary",
            glyph: "l",
            base_value: 500,
            speed: 0.5,
            depth: 0.9,
            rarity: Rarity::Legendary,
            color: "#fff",
        },
    ];

    fn sampled_shares(rod_effect: f32, samples: usize) -> [f64; 3] {
        let mut rng = Pcg32::seed_from_u64(2024);
        let mut counts = [0usize; 3];
        for _ in 0..samples {
            let picked = choose_species(&TRIO, rod_effect, &mut rng).unwrap();
            let idx = TRIO.iter().position(|s| s.id == picked.id).unwrap();
            counts[idx] += 1;
        }
        counts.map(|c| c as f64 / samples as f64)
    }

    #[test]
    fn test_weights_base_rod() {
        let w: Vec<f32> = TRIO.iter().map(|s| spawn_weight(s.rarity, 0.0)).collect();
        assert_eq!(w, vec![100.0, 20.0, 5.0]);
    }

    #[test]
    fn test_weights_upgraded_rod() {
        let w: Vec<f32> = TRIO.iter().map(|s| spawn_weight(s.rarity, 50.0)).collect();
        assert_eq!(w, vec![100.0, 70.0, 30.0]);
    }

    #[test]
    fn test_sampling_converges_base_rod() {
        let shares = sampled_shares(0.0, 200_000);
        let expected = [100.0 / 125.0, 20.0 / 125.0, 5.0 / 125.0];
        for (got, want) in shares.iter().zip(expected) {
            assert!((got - want).abs() < 0.01, "got {got}, want {want}");
        }
    }

    #[test]
    fn test_sampling_converges_upgraded_rod() {
        let shares = sampled_shares(50.0, 200_000);
        let expected = [100.0 / 200.0, 70.0 / 200.0, 30.0 / 200.0];
        for (got, want) in shares.iter().zip(expected) {
            assert!((got - want).abs() < 0.01, "got {got}, want {want}");
        }
    }

    #[test]
    fn test_pick_species_boundaries() {
        // Cumulative weights 100 | 120 | 125 out of 125
        assert_eq!(pick_species(&TRIO, 0.0, 0.0).unwrap().id, "common");
        assert_eq!(pick_species(&TRIO, 0.0, 0.79).unwrap().id, "common");
        assert_eq!(pick_species(&TRIO, 0.0, 0.81).unwrap().id, "rare");
        assert_eq!(pick_species(&TRIO, 0.0, 0.97).unwrap().id, "legendary");
        assert!(pick_species(&[], 0.0, 0.5).is_none());
    }

    #[test]
    fn test_higher_rod_raises_rare_share() {
        let base = sampled_shares(0.0, 50_000);
        let boosted = sampled_shares(100.0, 50_000);
        assert!(boosted[1] > base[1]);
        assert!(boosted[2] > base[2]);
        assert!(boosted[0] > 0.0);
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut state = SimState::new(11);
        for _ in 0..MAX_ACTIVE_FISH {
            assert!(spawn_fish(&mut state, 0.0).is_some());
        }
        assert_eq!(state.fish.len(), MAX_ACTIVE_FISH);
        assert!(spawn_fish(&mut state, 0.0).is_none());
        assert!(maybe_spawn(&mut state, 0.0, 1.0).is_none());
        assert_eq!(state.fish.len(), MAX_ACTIVE_FISH);
    }

    #[test]
    fn test_spawn_placement() {
        let mut state = SimState::new(5);
        for _ in 0..200 {
            state.fish.clear();
            spawn_fish(&mut state, 0.0).unwrap();
            let fish = &state.fish[0];
            let species = FISH_SPECIES.iter().find(|s| s.id == fish.species).unwrap();

            assert_eq!(fish.pos.x, fish.direction.spawn_x());
            let band = species.depth * DEPTH_SPAN;
            assert!(fish.pos.y >= band && fish.pos.y <= band + DEPTH_JITTER);
            assert!((SPEED_MULT_MIN..SPEED_MULT_MAX).contains(&fish.speed_multiplier));
            assert!(fish.speed_multiplier < 1.2);
        }
    }

    #[test]
    fn test_zero_chance_never_spawns() {
        let mut state = SimState::new(5);
        for _ in 0..1000 {
            assert!(maybe_spawn(&mut state, 0.0, 0.0).is_none());
        }
        assert!(state.fish.is_empty());
    }

    #[test]
    fn test_spawn_ids_unique() {
        let mut state = SimState::new(5);
        let a = spawn_fish(&mut state, 0.0).unwrap();
        let b = spawn_fish(&mut state, 0.0).unwrap();
        assert_ne!(a, b);
    }
}

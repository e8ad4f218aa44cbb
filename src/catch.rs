//! Catch resolution
//!
//! Runs once per landed fish: rolls the weight, computes the payout, credits
//! the player and opens a pending lore slot for the narrator to fill.

use rand::Rng;
use serde::Serialize;

use crate::consts::{WEIGHT_MIN_KG, WEIGHT_SPREAD_KG};
use crate::economy::Progress;
use crate::tuning::FishSpecies;

/// Flavor text for a catch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text")]
pub enum LoreStatus {
    /// Request in flight
    Pending,
    Ready(String),
}

impl LoreStatus {
    pub fn text(&self) -> Option<&str> {
        match self {
            LoreStatus::Pending => None,
            LoreStatus::Ready(text) => Some(text),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, LoreStatus::Pending)
    }
}

/// A landed fish, as shown to the player
#[derive(Debug, Clone, Serialize)]
pub struct CatchResult {
    /// Matches lore deliveries to this catch
    pub ticket: u64,
    pub species: &'static FishSpecies,
    /// Kilograms, in [1, 6)
    pub weight: f32,
    pub payout: u64,
    pub lore: LoreStatus,
}

impl CatchResult {
    /// Fill in the lore text. Only the first call has any effect.
    /// Returns true if the text was applied.
    pub fn settle_lore(&mut self, text: String) -> bool {
        if !self.lore.is_pending() {
            return false;
        }
        self.lore = LoreStatus::Ready(text);
        true
    }
}

/// Roll a catch weight in kg
pub fn roll_weight<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    WEIGHT_MIN_KG + rng.random_range(0.0..WEIGHT_SPREAD_KG)
}

/// Money earned for a fish of the given base value and weight
pub fn payout(base_value: u32, weight: f32) -> u64 {
    (base_value as f64 * weight as f64).floor() as u64
}

/// Resolve a landed fish: roll its weight, credit score and inventory.
pub fn resolve_catch<R: Rng + ?Sized>(
    progress: &mut Progress,
    species: &'static FishSpecies,
    ticket: u64,
    rng: &mut R,
) -> CatchResult {
    let weight = roll_weight(rng);
    let payout = payout(species.base_value, weight);
    progress.record_catch(species.id, payout);

    log::info!(
        "Caught {} ({:.1} kg) for {} coins, score now {}",
        species.name,
        weight,
        payout,
        progress.score
    );

    CatchResult {
        ticket,
        species,
        weight,
        payout,
        lore: LoreStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::species_by_id;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_payout_floors() {
        assert_eq!(payout(10, 2.5), 25);
        assert_eq!(payout(10, 2.59), 25);
        assert_eq!(payout(3000, 5.999), 17997);
        assert_eq!(payout(40, 1.0), 40);
    }

    #[test]
    fn test_weight_range() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..10_000 {
            let w = roll_weight(&mut rng);
            assert!((1.0..6.0).contains(&w), "weight {w} out of range");
        }
    }

    #[test]
    fn test_resolve_credits_progress() {
        let mut progress = Progress::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let guppy = species_by_id("guppy").unwrap();

        let result = resolve_catch(&mut progress, guppy, 7, &mut rng);
        assert_eq!(result.ticket, 7);
        assert_eq!(result.payout, payout(10, result.weight));
        assert_eq!(progress.score, result.payout);
        assert_eq!(progress.caught("guppy"), 1);
        assert!(result.lore.is_pending());
    }

    #[test]
    fn test_lore_settles_once() {
        let mut progress = Progress::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut result = resolve_catch(&mut progress, species_by_id("crab").unwrap(), 1, &mut rng);

        assert!(result.settle_lore("Crabs walk sideways.".to_string()));
        assert!(!result.settle_lore("Second answer".to_string()));
        assert_eq!(result.lore.text(), Some("Crabs walk sideways."));
    }
}

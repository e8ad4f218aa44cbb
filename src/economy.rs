//! Score, inventory and the upgrade shop
//!
//! Purchases walk a fixed tier table one step at a time. A purchase that
//! cannot go through (not enough money, already at the top tier) changes
//! nothing.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::sim::TickInput;
use crate::tuning::{FISH_SPECIES, FishSpecies, REEL_TIERS, ROD_TIERS, UpgradeTier};

/// Which piece of gear an upgrade applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpgradeTrack {
    /// Better odds of rare fish
    Rod,
    /// Faster reeling
    Reel,
}

impl UpgradeTrack {
    pub fn tiers(self) -> &'static [UpgradeTier] {
        match self {
            UpgradeTrack::Rod => &ROD_TIERS,
            UpgradeTrack::Reel => &REEL_TIERS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeTrack::Rod => "rod",
            UpgradeTrack::Reel => "reel",
        }
    }
}

/// Tier after `level` on a track, if any
pub fn next_tier(track: UpgradeTrack, level: usize) -> Option<&'static UpgradeTier> {
    track.tiers().get(level + 1)
}

pub fn can_afford(score: u64, tier: &UpgradeTier) -> bool {
    score >= tier.cost
}

/// Current gear levels. Each level indexes its track's tier table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpgradeState {
    pub rod_level: usize,
    pub reel_level: usize,
}

impl UpgradeState {
    /// Build from untrusted levels, clamping each into its tier table
    pub fn clamped(rod_level: usize, reel_level: usize) -> Self {
        Self {
            rod_level: rod_level.min(ROD_TIERS.len() - 1),
            reel_level: reel_level.min(REEL_TIERS.len() - 1),
        }
    }

    pub fn level(&self, track: UpgradeTrack) -> usize {
        match track {
            UpgradeTrack::Rod => self.rod_level,
            UpgradeTrack::Reel => self.reel_level,
        }
    }

    fn level_mut(&mut self, track: UpgradeTrack) -> &mut usize {
        match track {
            UpgradeTrack::Rod => &mut self.rod_level,
            UpgradeTrack::Reel => &mut self.reel_level,
        }
    }

    pub fn current_tier(&self, track: UpgradeTrack) -> &'static UpgradeTier {
        let tiers = track.tiers();
        &tiers[self.level(track).min(tiers.len() - 1)]
    }

    pub fn next_tier(&self, track: UpgradeTrack) -> Option<&'static UpgradeTier> {
        next_tier(track, self.level(track))
    }

    /// Spawn weight bonus from the rod
    pub fn rod_effect(&self) -> f32 {
        self.current_tier(UpgradeTrack::Rod).effect_value
    }

    /// Reel power multiplier from the reel
    pub fn reel_multiplier(&self) -> f32 {
        self.current_tier(UpgradeTrack::Reel).effect_value
    }

    /// Tick parameters for this gear
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            rod_effect: self.rod_effect(),
            reel_multiplier: self.reel_multiplier(),
            ..Default::default()
        }
    }
}

/// Result of a purchase attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Upgraded {
        track: UpgradeTrack,
        level: usize,
        cost: u64,
    },
    InsufficientFunds {
        cost: u64,
        score: u64,
    },
    /// Already at the top tier
    MaxedOut,
}

impl PurchaseOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, PurchaseOutcome::Upgraded { .. })
    }
}

/// What the shop shows for one track
#[derive(Debug, Clone, Serialize)]
pub struct ShopOffer {
    pub track: UpgradeTrack,
    pub current: &'static UpgradeTier,
    pub next: Option<&'static UpgradeTier>,
    pub affordable: bool,
}

/// Player progress: everything that survives a reload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    pub score: u64,
    /// Species id to count
    pub inventory: BTreeMap<String, u32>,
    pub upgrades: UpgradeState,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a landed fish
    pub fn record_catch(&mut self, species_id: &str, payout: u64) {
        self.score = self.score.saturating_add(payout);
        *self.inventory.entry(species_id.to_string()).or_insert(0) += 1;
    }

    pub fn caught(&self, species_id: &str) -> u32 {
        self.inventory.get(species_id).copied().unwrap_or(0)
    }

    /// Total fish landed across all species
    pub fn total_caught(&self) -> u32 {
        self.inventory.values().sum()
    }

    /// Inventory in species table order, skipping species never caught
    pub fn inventory_entries(&self) -> Vec<(&'static FishSpecies, u32)> {
        FISH_SPECIES
            .iter()
            .filter_map(|s| {
                let count = self.caught(s.id);
                (count > 0).then_some((s, count))
            })
            .collect()
    }

    /// Buy the next tier on a track if it exists and is affordable
    pub fn purchase(&mut self, track: UpgradeTrack) -> PurchaseOutcome {
        let Some(tier) = self.upgrades.next_tier(track) else {
            return PurchaseOutcome::MaxedOut;
        };
        if !can_afford(self.score, tier) {
            return PurchaseOutcome::InsufficientFunds {
                cost: tier.cost,
                score: self.score,
            };
        }

        self.score -= tier.cost;
        let level = self.upgrades.level_mut(track);
        *level += 1;

        PurchaseOutcome::Upgraded {
            track,
            level: *level,
            cost: tier.cost,
        }
    }

    pub fn shop_offer(&self, track: UpgradeTrack) -> ShopOffer {
        let next = self.upgrades.next_tier(track);
        ShopOffer {
            track,
            current: self.upgrades.current_tier(track),
            next,
            affordable: next.is_some_and(|t| can_afford(self.score, t)),
        }
    }
}

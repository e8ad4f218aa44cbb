//! Data-driven game balance
//!
//! Static species and upgrade tables. Loaded once, never mutated.

use serde::Serialize;

/// Species rarity - drives spawn weight and (by convention) base value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rarity {
    Common,
    Rare,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// A catchable species
#[derive(Debug, Clone, Serialize)]
pub struct FishSpecies {
    pub id: &'static str,
    pub name: &'static str,
    /// Display glyph
    pub glyph: &'static str,
    pub base_value: u32,
    /// Swim speed before the per-fish multiplier
    pub speed: f32,
    /// 0.0 (surface) to 1.0 (bottom)
    pub depth: f32,
    pub rarity: Rarity,
    /// CSS color
    pub color: &'static str,
}

#[allow(clippy::too_many_arguments)]
const fn species(
    id: &'static str,
    name: &'static str,
    glyph: &'static str,
    base_value: u32,
    speed: f32,
    depth: f32,
    rarity: Rarity,
    color: &'static str,
) -> FishSpecies {
    FishSpecies {
        id,
        name,
        glyph,
        base_value,
        speed,
        depth,
        rarity,
        color,
    }
}

pub static FISH_SPECIES: [FishSpecies; 17] = [
    species("guppy", "Neon Guppy", "🐟", 10, 0.5, 0.1, Rarity::Common, "#4ade80"),
    species("shrimp", "Tasty Shrimp", "🦐", 15, 0.3, 0.25, Rarity::Common, "#f87171"),
    species("clownfish", "Dizzy Clownfish", "🐠", 25, 0.7, 0.35, Rarity::Common, "#facc15"),
    species("crab", "Cheeky Crab", "🦀", 40, 0.4, 0.95, Rarity::Common, "#ef4444"),
    species("puffer", "Prickly Puffer", "🐡", 50, 0.3, 0.5, Rarity::Rare, "#fb923c"),
    species("turtle", "Ancient Turtle", "🐢", 100, 0.25, 0.55, Rarity::Rare, "#22c55e"),
    species("squid", "Ink Master", "🦑", 80, 0.9, 0.7, Rarity::Rare, "#f472b6"),
    species("octopus", "Wise Octopus", "🐙", 130, 0.6, 0.8, Rarity::Rare, "#a855f7"),
    species("anglerfish", "Abyssal Lantern", "🏮", 1100, 0.8, 0.93, Rarity::Legendary, "#ea580c"),
    species("shark", "Great White", "🦈", 200, 1.2, 0.9, Rarity::Legendary, "#94a3b8"),
    species("whale", "Moby Minor", "🐋", 500, 0.2, 0.85, Rarity::Legendary, "#60a5fa"),
    species("dragon", "Deep Sea Dragon", "🐉", 1000, 1.5, 0.98, Rarity::Legendary, "#fbbf24"),
    species("nessie", "Loch Monster", "🦕", 850, 0.5, 0.92, Rarity::Legendary, "#10b981"),
    species("mermaid", "Mermaid Princess", "🧜‍♀️", 2000, 1.8, 0.75, Rarity::Legendary, "#ec4899"),
    species("mosasaur", "Primeval Mosasaur", "🐊", 2200, 1.4, 0.88, Rarity::Legendary, "#15803d"),
    species("king_lobster", "Emperor Lobster", "🦞", 1800, 0.5, 0.94, Rarity::Legendary, "#991b1b"),
    species("leviathan", "Leviathan", "🐍", 3000, 1.6, 0.97, Rarity::Legendary, "#312e81"),
];

/// Look up a species by id in the default table
pub fn species_by_id(id: &str) -> Option<&'static FishSpecies> {
    FISH_SPECIES.iter().find(|s| s.id == id)
}

/// One level of an upgrade track
#[derive(Debug, Clone, Serialize)]
pub struct UpgradeTier {
    pub level: usize,
    pub name: &'static str,
    pub cost: u64,
    /// Rod: spawn weight bonus. Reel: reel power multiplier.
    pub effect_value: f32,
    pub description: &'static str,
}

pub static ROD_TIERS: [UpgradeTier; 4] = [
    UpgradeTier {
        level: 0,
        name: "Bamboo Rod",
        cost: 0,
        effect_value: 0.0,
        description: "The most basic rod there is.",
    },
    UpgradeTier {
        level: 1,
        name: "Carbon Fiber Rod",
        cost: 200,
        effect_value: 20.0,
        description: "Better odds of finding rare fish.",
    },
    UpgradeTier {
        level: 2,
        name: "Pro Titanium Rod",
        cost: 600,
        effect_value: 50.0,
        description: "Much better odds of rare and legendary fish.",
    },
    UpgradeTier {
        level: 3,
        name: "Trident of the Sea",
        cost: 1500,
        effect_value: 100.0,
        description: "Legendary fish are drawn to it.",
    },
];

pub static REEL_TIERS: [UpgradeTier; 4] = [
    UpgradeTier {
        level: 0,
        name: "Hand Reel",
        cost: 0,
        effect_value: 1.0,
        description: "Slow, but it still works.",
    },
    UpgradeTier {
        level: 1,
        name: "High-Speed Reel",
        cost: 150,
        effect_value: 1.3,
        description: "Reels 30% faster.",
    },
    UpgradeTier {
        level: 2,
        name: "Power Electric Reel",
        cost: 500,
        effect_value: 1.7,
        description: "Reels 70% faster.",
    },
    UpgradeTier {
        level: 3,
        name: "Industrial Winch",
        cost: 1200,
        effect_value: 2.3,
        description: "Reels 130% faster. Hauls in whales.",
    },
];

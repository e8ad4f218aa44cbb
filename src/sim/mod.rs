//! Simulation module
//!
//! All gameplay physics lives here. This module must stay free of platform
//! dependencies:
//! - Seeded RNG only (no ambient randomness)
//! - Stable iteration order (fish in spawn order)
//! - Side effects are queued as events, never performed

pub mod motion;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use snapshot::{FishView, Snapshot, TensionZone};
pub use spawn::{choose_species, pick_species, spawn_weight};
pub use state::{
    ActiveFish, Direction, GameEvent, GamePhase, Line, LostReason, SimState, parked_hook,
};
pub use tick::{TickInput, in_bite_box, tick};

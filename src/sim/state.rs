//! Simulation state and core types
//!
//! Everything the per-frame tick reads or writes lives in `SimState`. The
//! view layer only ever sees it through a `Snapshot`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::consts::*;
use crate::tuning::{FISH_SPECIES, FishSpecies};

/// Horizontal swim direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Enters from the left edge, swims toward +x
    Right,
    /// Enters from the right edge, swims toward -x
    Left,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Right => 1.0,
            Direction::Left => -1.0,
        }
    }

    /// Entry x for a fish swimming this way
    pub fn spawn_x(self) -> f32 {
        match self {
            Direction::Right => SPAWN_X_LEFT,
            Direction::Left => SPAWN_X_RIGHT,
        }
    }

    /// True once `x` is past the edge opposite the spawn edge
    pub fn has_exited(self, x: f32) -> bool {
        match self {
            Direction::Right => x > CULL_X_RIGHT,
            Direction::Left => x < CULL_X_LEFT,
        }
    }
}

/// Why a hooked fish got away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LostReason {
    /// Tension hit the ceiling
    LineSnapped,
    /// Tension went slack
    FishEscaped,
}

/// A fish on the line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Line {
    pub fish_id: u32,
    /// Line stress, always within [0, MAX_TENSION]
    pub tension: f32,
    /// Held-reel time since the last reel click
    #[serde(skip)]
    pub reel_clock: f32,
}

impl Line {
    pub fn new(fish_id: u32) -> Self {
        Self {
            fish_id,
            tension: BITE_TENSION,
            reel_clock: 0.0,
        }
    }
}

/// Current phase of the hook
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum GamePhase {
    /// Hook parked above the water, waiting for a cast
    Idle,
    /// Hook just hit the water (one frame)
    Casting,
    /// Hook falling, looking for a bite
    Sinking,
    /// Fish on the line, reel released
    Hooked(Line),
    /// Fish on the line, reel held
    Reeling(Line),
    /// Fish landed, waiting for the player to acknowledge
    Caught { fish_id: u32 },
    /// Fish got away, hook drifting back up
    Lost { reason: LostReason },
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "Idle",
            GamePhase::Casting => "Casting",
            GamePhase::Sinking => "Sinking",
            GamePhase::Hooked(_) => "Hooked",
            GamePhase::Reeling(_) => "Reeling",
            GamePhase::Caught { .. } => "Caught",
            GamePhase::Lost { .. } => "Lost",
        }
    }

    /// The line, while a fish is being fought
    pub fn line(&self) -> Option<&Line> {
        match self {
            GamePhase::Hooked(line) | GamePhase::Reeling(line) => Some(line),
            _ => None,
        }
    }

    /// Tension on the line (zero when nothing is hooked)
    pub fn tension(&self) -> f32 {
        self.line().map(|l| l.tension).unwrap_or(0.0)
    }

    /// Fish whose position is driven by the hook rather than by swimming
    pub fn hooked_fish(&self) -> Option<u32> {
        match self {
            GamePhase::Hooked(line) | GamePhase::Reeling(line) => Some(line.fish_id),
            GamePhase::Caught { fish_id } => Some(*fish_id),
            _ => None,
        }
    }
}

/// A fish swimming in the water
#[derive(Debug, Clone, Serialize)]
pub struct ActiveFish {
    pub id: u32,
    /// Species id in the catalog
    pub species: &'static str,
    /// Position in percent of the water area
    pub pos: Vec2,
    pub direction: Direction,
    /// Per-fish speed multiplier in [0.8, 1.2)
    pub speed_multiplier: f32,
}

/// Side effects produced by a tick, drained by the driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A fish took the hook
    Bite {
        fish_id: u32,
        species: &'static str,
    },
    /// Reel held long enough for another click
    ReelClick,
    /// Hook reached the surface with the fish still on
    Landed {
        fish_id: u32,
        species: &'static str,
    },
    /// Fish got away
    Lost {
        reason: LostReason,
        species: &'static str,
    },
    /// Hook reached the bottom without a bite
    Missed,
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct SimState {
    /// Current phase
    pub phase: GamePhase,
    /// Physical hook position (never jittered)
    pub hook: Vec2,
    /// Active fish, in spawn order
    pub fish: Vec<ActiveFish>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Species available to the spawner
    pub(crate) catalog: &'static [FishSpecies],
    pub(crate) rng: Pcg32,
    reel_held: bool,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl SimState {
    /// Create a new simulation over the default species table
    pub fn new(seed: u64) -> Self {
        Self::with_catalog(seed, &FISH_SPECIES)
    }

    /// Create a new simulation over a custom species table
    pub fn with_catalog(seed: u64, catalog: &'static [FishSpecies]) -> Self {
        Self {
            phase: GamePhase::Idle,
            hook: parked_hook(),
            fish: Vec::new(),
            time_ticks: 0,
            catalog,
            rng: Pcg32::seed_from_u64(seed),
            reel_held: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn catalog(&self) -> &'static [FishSpecies] {
        self.catalog
    }

    /// Look up a species in this simulation's catalog
    pub fn species(&self, id: &str) -> Option<&'static FishSpecies> {
        self.catalog.iter().find(|s| s.id == id)
    }

    pub fn fish_by_id(&self, id: u32) -> Option<&ActiveFish> {
        self.fish.iter().find(|f| f.id == id)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Simulation RNG (spawning, catch weights)
    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Record whether the reel button is held
    pub fn set_reel_input(&mut self, held: bool) {
        self.reel_held = held;
    }

    pub fn reel_held(&self) -> bool {
        self.reel_held
    }

    pub fn tension(&self) -> f32 {
        self.phase.tension()
    }

    /// Drop the hook into the water. Only valid while Idle.
    pub fn cast(&mut self) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }
        self.hook = Vec2::new(HOOK_X, 0.0);
        self.phase = GamePhase::Casting;
        true
    }

    /// Close out a landed catch: remove the fish and park the hook.
    /// Returns the removed fish id, or None if nothing was caught.
    pub fn acknowledge_catch(&mut self) -> Option<u32> {
        let GamePhase::Caught { fish_id } = self.phase else {
            return None;
        };
        self.fish.retain(|f| f.id != fish_id);
        self.park_hook();
        self.phase = GamePhase::Idle;
        Some(fish_id)
    }

    /// Move the hook back above the boat
    pub fn park_hook(&mut self) {
        self.hook = parked_hook();
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Hook position while nothing is cast
pub fn parked_hook() -> Vec2 {
    Vec2::new(HOOK_X, PARK_Y)
}

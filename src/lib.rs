//! Reel Master - a casual fishing game
//!
//! Core modules:
//! - `sim`: Simulation (fish spawning and motion, hook/tension state machine)
//! - `catch`: Catch resolution (weight, payout, pending lore)
//! - `economy`: Score, inventory and the upgrade shop
//! - `persistence`: Save/load of player progress
//! - `audio`: Sound cue gateway
//! - `narrator`: Asynchronous novelty text for catches
//! - `session`: Frame driver and command surface for the view layer
//! - `tuning`: Static species and upgrade tables

pub mod audio;
pub mod catch;
pub mod economy;
pub mod narrator;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use catch::{CatchResult, LoreStatus};
pub use economy::{Progress, PurchaseOutcome, UpgradeState, UpgradeTrack};
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
///
/// Distances are percentages of the water area. Time is measured in frame
/// units: one unit is `FRAME_UNIT_MS` of wall clock.
pub mod consts {
    /// Milliseconds per simulation time unit (nominal 60 Hz frame)
    pub const FRAME_UNIT_MS: f64 = 16.0;
    /// Longest frame the driver will simulate in one step (ms)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Hook sink speed while Sinking (units per frame)
    pub const GRAVITY: f32 = 0.8;
    /// Base reel pull before the reel tier multiplier
    pub const REEL_POWER: f32 = 2.0;
    /// Converts effective reel power into hook rise per frame
    pub const REEL_RISE_FACTOR: f32 = 0.065;
    /// Converts the hooked species' speed into hook drop per frame when slack
    pub const FISH_PULL_FACTOR: f32 = 0.06;
    /// Tension gained per frame while reeling
    pub const TENSION_INCREASE: f32 = 0.5;
    /// Tension lost per frame while the reel is released
    pub const TENSION_DECREASE: f32 = 0.3;
    /// Tension when a fish bites
    pub const BITE_TENSION: f32 = 30.0;
    /// Tension ceiling (line snaps)
    pub const MAX_TENSION: f32 = 100.0;
    /// Half extent of the square bite box around the hook
    pub const HOOK_RADIUS: f32 = 5.0;
    /// Held-reel time between reel clicks (frame units, ~80 ms)
    pub const REEL_CLICK_INTERVAL: f32 = 5.0;

    /// Hook y past which a sinking hook gives up
    pub const SINK_LIMIT_Y: f32 = 95.0;
    /// Upward drift per frame after a lost fish
    pub const LOST_DRIFT_SPEED: f32 = 2.0;
    /// Hook y above which a drifting hook is parked
    pub const PARK_Y: f32 = -10.0;
    /// Horizontal hook position (boat)
    pub const HOOK_X: f32 = 50.0;

    /// Per-frame spawn probability
    pub const SPAWN_CHANCE: f64 = 0.01;
    /// Maximum fish in the water at once
    pub const MAX_ACTIVE_FISH: usize = 8;
    /// Global fish speed scale
    pub const TIME_SCALE: f32 = 0.2;
    /// Spawn x for fish swimming right / left
    pub const SPAWN_X_LEFT: f32 = -10.0;
    pub const SPAWN_X_RIGHT: f32 = 110.0;
    /// Cull bounds (spawn edge plus margin on the far side)
    pub const CULL_X_RIGHT: f32 = 120.0;
    pub const CULL_X_LEFT: f32 = -20.0;
    /// Depth fraction to y conversion, and jitter added on spawn
    pub const DEPTH_SPAN: f32 = 90.0;
    pub const DEPTH_JITTER: f32 = 5.0;
    /// Fish speed multiplier range [min, max)
    pub const SPEED_MULT_MIN: f32 = 0.8;
    pub const SPEED_MULT_MAX: f32 = 1.2;

    /// Catch weight range [min, min + spread) in kg
    pub const WEIGHT_MIN_KG: f32 = 1.0;
    pub const WEIGHT_SPREAD_KG: f32 = 5.0;

    /// Base and per-tension scale of the cosmetic hook shake
    pub const SHAKE_BASE: f32 = 0.3;
    pub const SHAKE_TENSION_DIVISOR: f32 = 80.0;
}

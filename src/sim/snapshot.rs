//! Read-only view of the simulation for the render layer
//!
//! The only place the display hook shake is applied. Shake never touches
//! `SimState`, so it cannot feed back into physics or bite detection.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::state::{GamePhase, SimState};
use crate::consts::{SHAKE_BASE, SHAKE_TENSION_DIVISOR};

/// Tension bar band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TensionZone {
    /// Too little tension, the fish is working loose
    Slack,
    Safe,
    /// Close to snapping
    Danger,
}

impl TensionZone {
    pub fn from_tension(tension: f32) -> Self {
        if tension > 80.0 {
            TensionZone::Danger
        } else if tension > 30.0 {
            TensionZone::Safe
        } else {
            TensionZone::Slack
        }
    }
}

/// One fish as the view draws it
#[derive(Debug, Clone, Serialize)]
pub struct FishView {
    pub id: u32,
    pub species: &'static str,
    pub glyph: &'static str,
    pub color: &'static str,
    pub x: f32,
    pub y: f32,
    /// +1 swimming right, -1 swimming left
    pub facing: f32,
    pub hooked: bool,
}

/// Everything the view needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    /// Hook position to draw (includes shake)
    pub hook: Vec2,
    pub tension: f32,
    pub tension_zone: TensionZone,
    pub reel_held: bool,
    pub fish: Vec<FishView>,
}

/// Shake amplitude for a given tension
pub fn shake_amplitude(tension: f32) -> f32 {
    SHAKE_BASE + tension / SHAKE_TENSION_DIVISOR
}

impl Snapshot {
    /// Capture the current state. `rng` drives the cosmetic hook shake while a
    /// fish is on the line; pass `shake = false` to draw the true position.
    pub fn capture<R: Rng + ?Sized>(state: &SimState, rng: &mut R, shake: bool) -> Self {
        let tension = state.tension();
        let mut hook = state.hook;

        if shake && state.phase.line().is_some() {
            let amplitude = shake_amplitude(tension);
            hook.x += (rng.random::<f32>() - 0.5) * amplitude;
            hook.y += (rng.random::<f32>() - 0.5) * amplitude;
        }

        let hooked = state.phase.hooked_fish();
        let fish = state
            .fish
            .iter()
            .filter_map(|f| {
                let species = state.species(f.species)?;
                Some(FishView {
                    id: f.id,
                    species: species.id,
                    glyph: species.glyph,
                    color: species.color,
                    x: f.pos.x,
                    y: f.pos.y,
                    facing: f.direction.sign(),
                    hooked: hooked == Some(f.id),
                })
            })
            .collect();

        Self {
            phase: state.phase,
            hook,
            tension,
            tension_zone: TensionZone::from_tension(tension),
            reel_held: state.reel_held(),
            fish,
        }
    }

    /// Hook position to draw, as a plain pair
    pub fn hook_xy(&self) -> (f32, f32) {
        (self.hook.x, self.hook.y)
    }
}

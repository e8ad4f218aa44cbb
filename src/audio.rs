//! Sound cues
//!
//! The game emits abstract cues; a `CueSink` decides what they sound like.
//! On wasm32 `AudioManager` synthesizes them with the Web Audio API, no
//! external files needed.

use std::cell::RefCell;
use std::rc::Rc;

use crate::sim::GameEvent;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Hook hits the water
    Cast,
    /// A fish took the hook
    Bite,
    /// Reel click while reeling
    Reel,
    /// Fish landed
    Catch,
    /// Fish got away
    Lost,
}

impl Cue {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Bite { .. } => Some(Cue::Bite),
            GameEvent::ReelClick => Some(Cue::Reel),
            GameEvent::Landed { .. } => Some(Cue::Catch),
            GameEvent::Lost { .. } => Some(Cue::Lost),
            GameEvent::Missed => None,
        }
    }
}

/// Anything that can play cues. Playback failures are swallowed.
pub trait CueSink {
    fn play(&self, cue: Cue);

    /// Apply a volume in [0, 1]; 0 silences
    fn set_volume(&mut self, _volume: f32) {}
}

/// Sink that plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl CueSink for SilentAudio {
    fn play(&self, _cue: Cue) {}
}

/// Sink that records every cue. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct CueLog {
    cues: Rc<RefCell<Vec<Cue>>>,
}

impl CueLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.cues.borrow().clone()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.cues.borrow().iter().filter(|c| **c == cue).count()
    }
}

impl CueSink for CueLog {
    fn play(&self, cue: Cue) {
        self.cues.borrow_mut().push(cue);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{Cue, CueSink};

    /// Web Audio cue player
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, volume: 0.8 }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Cast - falling plop
        fn play_cast(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 600.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.6).ok();
            osc.frequency().set_value_at_time(600.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(100.0, t + 0.6)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.6).ok();
        }

        /// Bite - double ding
        fn play_bite(&self, ctx: &AudioContext, vol: f32) {
            for offset in [0.0, 0.15] {
                if let Some((osc, gain)) = self.create_osc(ctx, 800.0, OscillatorType::Sine) {
                    let t = ctx.current_time() + offset;
                    gain.gain().set_value_at_time(0.0, t).ok();
                    gain.gain()
                        .linear_ramp_to_value_at_time(vol * 0.24, t + 0.02)
                        .ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.3).ok();
                }
            }
        }

        /// Reel - short mechanical click
        fn play_reel(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 1000.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.06, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.05)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.05).ok();
        }

        /// Catch - major arpeggio, C E G C
        fn play_catch(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [523.25, 659.25, 783.99, 1046.5].iter().enumerate() {
                let delay = i as f64 * 0.1;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Square) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.03, t).ok();
                    gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.4).ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.4).ok();
                }
            }
        }

        /// Lost - sagging buzz
        fn play_lost(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.09, t).ok();
            gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.5).ok();
            osc.frequency().set_value_at_time(200.0, t).ok();
            osc.frequency().linear_ramp_to_value_at_time(50.0, t + 0.5).ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();
        }
    }

    impl CueSink for AudioManager {
        fn play(&self, cue: Cue) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                Cue::Cast => self.play_cast(ctx, vol),
                Cue::Bite => self.play_bite(ctx, vol),
                Cue::Reel => self.play_reel(ctx, vol),
                Cue::Catch => self.play_catch(ctx, vol),
                Cue::Lost => self.play_lost(ctx, vol),
            }
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::LostReason;

    #[test]
    fn test_events_map_to_cues() {
        let bite = GameEvent::Bite {
            fish_id: 1,
            species: "guppy",
        };
        assert_eq!(Cue::for_event(&bite), Some(Cue::Bite));
        assert_eq!(Cue::for_event(&GameEvent::ReelClick), Some(Cue::Reel));
        assert_eq!(
            Cue::for_event(&GameEvent::Lost {
                reason: LostReason::LineSnapped,
                species: "guppy"
            }),
            Some(Cue::Lost)
        );
        assert_eq!(Cue::for_event(&GameEvent::Missed), None);
    }

    #[test]
    fn test_cue_log_shares_between_clones() {
        let log = CueLog::new();
        let sink: Box<dyn CueSink> = Box::new(log.clone());
        sink.play(Cue::Cast);
        sink.play(Cue::Reel);
        sink.play(Cue::Reel);
        assert_eq!(log.cues(), vec![Cue::Cast, Cue::Reel, Cue::Reel]);
        assert_eq!(log.count(Cue::Reel), 2);
    }
}

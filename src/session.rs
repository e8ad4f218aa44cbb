//! Frame driver and command surface
//!
//! A `Session` owns one game: the simulation, the player's progress and the
//! gateways (storage, audio, narrator). The view calls `frame` once per
//! display refresh and the command methods on input.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::{Cue, CueSink, SilentAudio};
use crate::catch::{CatchResult, resolve_catch};
use crate::consts::{FRAME_UNIT_MS, MAX_FRAME_MS};
use crate::economy::{Progress, PurchaseOutcome, ShopOffer, UpgradeTrack};
use crate::narrator::{LoreInbox, LoreRequest, Narrator, OfflineNarrator};
use crate::persistence::{KeyValueStore, MemoryStore, SaveSlot};
use crate::settings::Settings;
use crate::sim::{GameEvent, SimState, Snapshot, tick};
use crate::tuning::FishSpecies;

/// Turns display timestamps into simulation time
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame units elapsed since the previous call. The first call yields 0;
    /// gaps longer than `MAX_FRAME_MS` are clamped.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS) / FRAME_UNIT_MS,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt as f32
    }
}

/// One running game
pub struct Session {
    sim: SimState,
    progress: Progress,
    settings: Settings,
    save: SaveSlot,
    audio: Box<dyn CueSink>,
    narrator: Box<dyn Narrator>,
    inbox: LoreInbox,
    /// Catch on display, if any
    catch: Option<CatchResult>,
    next_ticket: u64,
    clock: FrameClock,
    /// Cosmetic randomness (hook shake), kept apart from the simulation RNG
    display_rng: Pcg32,
}

impl Session {
    /// Start a session, loading saved progress from `store`
    pub fn new(
        seed: u64,
        store: Box<dyn KeyValueStore>,
        audio: Box<dyn CueSink>,
        narrator: Box<dyn Narrator>,
    ) -> Self {
        let save = SaveSlot::new(store);
        let progress = save.load();
        let mut session = Self {
            sim: SimState::new(seed),
            progress,
            settings: Settings::default(),
            save,
            audio,
            narrator,
            inbox: LoreInbox::new(),
            catch: None,
            next_ticket: 1,
            clock: FrameClock::new(),
            display_rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
        };
        session.apply_settings();
        log::info!("Session started with seed {}", seed);
        session
    }

    /// Session with in-memory storage, no sound and no narration service
    pub fn offline(seed: u64) -> Self {
        Self::new(
            seed,
            Box::new(MemoryStore::new()),
            Box::new(SilentAudio),
            Box::new(OfflineNarrator),
        )
    }

    // === Frame driver ===

    /// Advance to display time `now_ms` and return what to draw
    pub fn frame(&mut self, now_ms: f64) -> Snapshot {
        let dt = self.clock.advance(now_ms);
        self.step(dt);
        self.snapshot()
    }

    /// Advance the game by `dt` frame units
    pub fn step(&mut self, dt: f32) {
        self.apply_lore();

        let input = self.progress.upgrades.tick_input();
        tick(&mut self.sim, &input, dt);

        for event in self.sim.drain_events() {
            self.handle_event(event);
        }
    }

    /// Current view of the water
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::capture(
            &self.sim,
            &mut self.display_rng,
            self.settings.effective_hook_shake(),
        )
    }

    fn handle_event(&mut self, event: GameEvent) {
        if let Some(cue) = Cue::for_event(&event) {
            self.audio.play(cue);
        }

        match event {
            GameEvent::Landed { species, .. } => {
                if let Some(species) = self.sim.species(species) {
                    self.land(species);
                }
            }
            GameEvent::Lost { reason, species } => {
                log::info!("{} got away ({:?})", species, reason);
            }
            GameEvent::Missed => log::debug!("Hook reached the bottom, nothing bit"),
            GameEvent::Bite { .. } | GameEvent::ReelClick => {}
        }
    }

    fn land(&mut self, species: &'static FishSpecies) {
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let result = resolve_catch(&mut self.progress, species, ticket, self.sim.rng_mut());
        let request = LoreRequest {
            ticket,
            species_name: species.name,
            rarity: species.rarity,
            weight: result.weight,
        };
        self.catch = Some(result);
        self.persist();

        self.narrator.describe(request, self.inbox.reply_for(ticket));
        // Offline narrators answer at once
        self.apply_lore();
    }

    /// Apply narrator answers for the catch on display; drop the rest
    fn apply_lore(&mut self) {
        for delivery in self.inbox.drain() {
            match self.catch.as_mut() {
                Some(catch) if catch.ticket == delivery.ticket => {
                    catch.settle_lore(delivery.text);
                }
                _ => log::debug!("Discarding narration for ticket {}", delivery.ticket),
            }
        }
    }

    fn persist(&self) {
        if let Err(e) = self.save.save(&self.progress) {
            log::warn!("Progress not saved: {}", e);
        }
    }

    // === Commands ===

    /// Drop the hook. Ignored unless the hook is parked.
    pub fn cast(&mut self) -> bool {
        if !self.sim.cast() {
            return false;
        }
        self.audio.play(Cue::Cast);
        true
    }

    pub fn reel_start(&mut self) {
        self.sim.set_reel_input(true);
    }

    pub fn reel_end(&mut self) {
        self.sim.set_reel_input(false);
    }

    pub fn buy_rod(&mut self) -> PurchaseOutcome {
        self.buy(UpgradeTrack::Rod)
    }

    pub fn buy_reel(&mut self) -> PurchaseOutcome {
        self.buy(UpgradeTrack::Reel)
    }

    fn buy(&mut self, track: UpgradeTrack) -> PurchaseOutcome {
        let outcome = self.progress.purchase(track);
        match outcome {
            PurchaseOutcome::Upgraded { level, cost, .. } => {
                log::info!(
                    "Bought {} tier {} for {}",
                    self.progress.upgrades.current_tier(track).name,
                    level,
                    cost
                );
                self.persist();
            }
            rejected => log::debug!("{} purchase rejected: {:?}", track.as_str(), rejected),
        }
        outcome
    }

    /// Close the catch dialog and return the hook to the boat.
    /// Returns the closed catch, or None if nothing was landed.
    pub fn acknowledge_catch(&mut self) -> Option<CatchResult> {
        self.sim.acknowledge_catch()?;
        self.catch.take()
    }

    /// Wipe all progress and restart the water
    pub fn reset_progress(&mut self) {
        if let Err(e) = self.save.clear() {
            log::warn!("Save not cleared: {}", e);
        }
        let seed = self.sim.rng_mut().random::<u64>();
        self.sim = SimState::new(seed);
        self.progress = Progress::default();
        self.catch = None;
        log::info!("Progress reset");
    }

    // === Settings ===

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.apply_settings();
    }

    fn apply_settings(&mut self) {
        self.audio.set_volume(self.settings.effective_volume());
    }

    // === Queries ===

    pub fn sim(&self) -> &SimState {
        &self.sim
    }

    /// Direct simulation access for scripted setups
    pub fn sim_mut(&mut self) -> &mut SimState {
        &mut self.sim
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn score(&self) -> u64 {
        self.progress.score
    }

    /// The landed catch awaiting acknowledgement
    pub fn catch_result(&self) -> Option<&CatchResult> {
        self.catch.as_ref()
    }

    pub fn shop_offer(&self, track: UpgradeTrack) -> ShopOffer {
        self.progress.shop_offer(track)
    }

    /// Caught species in table order with counts
    pub fn inventory(&self) -> Vec<(&'static FishSpecies, u32)> {
        self.progress.inventory_entries()
    }
}

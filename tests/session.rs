//! End-to-end tests over the `Session` command surface

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;

use glam::Vec2;

use reel_master::audio::{Cue, CueLog, SilentAudio};
use reel_master::consts::HOOK_X;
use reel_master::narrator::{LoreError, LoreReply, LoreRequest, Narrator, OfflineNarrator};
use reel_master::persistence::{KeyValueStore, MemoryStore, SAVE_KEY};
use reel_master::sim::{ActiveFish, Direction, GamePhase};
use reel_master::{LoreStatus, PurchaseOutcome, Session, UpgradeTrack};

/// Narrator that holds on to replies so tests decide when they settle
#[derive(Clone, Default)]
struct HeldNarrator {
    pending: Rc<RefCell<Vec<(LoreRequest, LoreReply)>>>,
}

impl HeldNarrator {
    fn take(&self, ticket: u64) -> LoreReply {
        let mut pending = self.pending.borrow_mut();
        let index = pending
            .iter()
            .position(|(req, _)| req.ticket == ticket)
            .expect("no request for ticket");
        pending.remove(index).1
    }
}

impl Narrator for HeldNarrator {
    fn describe(&self, request: LoreRequest, reply: LoreReply) {
        self.pending.borrow_mut().push((request, reply));
    }
}

/// Narrator that answers from a worker thread once released
#[derive(Clone, Default)]
struct ThreadedNarrator {
    workers: Rc<RefCell<Vec<(mpsc::Sender<()>, thread::JoinHandle<()>)>>>,
}

impl ThreadedNarrator {
    fn release_all(&self) {
        for (go, worker) in self.workers.borrow_mut().drain(..) {
            go.send(()).unwrap();
            worker.join().unwrap();
        }
    }
}

impl Narrator for ThreadedNarrator {
    fn describe(&self, request: LoreRequest, reply: LoreReply) {
        let reply = reply.into_remote();
        let (go, wait) = mpsc::channel();
        let worker = thread::spawn(move || {
            let _ = wait.recv();
            reply.settle(Ok(format!("The {} took its time.", request.species_name)));
        });
        self.workers.borrow_mut().push((go, worker));
    }
}

fn session_with(store: &MemoryStore, narrator: Box<dyn Narrator>) -> Session {
    Session::new(7, Box::new(store.clone()), Box::new(SilentAudio), narrator)
}

/// Put a guppy under the boat, cast onto it and reel it in
fn land_guppy(session: &mut Session) {
    let sim = session.sim_mut();
    let id = sim.next_entity_id();
    sim.fish.insert(
        0,
        ActiveFish {
            id,
            species: "guppy",
            pos: Vec2::new(HOOK_X, 10.0),
            direction: Direction::Right,
            speed_multiplier: 1.0,
        },
    );

    assert!(session.cast());
    for _ in 0..200 {
        session.step(1.0);
        if matches!(session.sim().phase, GamePhase::Hooked(_)) {
            break;
        }
    }
    assert_eq!(session.sim().phase.hooked_fish(), Some(id));

    session.reel_start();
    for _ in 0..500 {
        session.step(1.0);
        if matches!(session.sim().phase, GamePhase::Caught { .. }) {
            break;
        }
    }
    session.reel_end();
    assert_eq!(session.sim().phase, GamePhase::Caught { fish_id: id });
}

#[test]
fn test_catch_credits_and_saves() {
    let store = MemoryStore::new();
    let mut session = session_with(&store, Box::new(OfflineNarrator));
    land_guppy(&mut session);

    let catch = session.catch_result().expect("catch on display");
    assert_eq!(catch.species.id, "guppy");
    assert!((1.0..6.0).contains(&catch.weight));
    assert_eq!(catch.payout, (10.0 * catch.weight as f64).floor() as u64);
    assert_eq!(session.score(), catch.payout);
    assert_eq!(session.progress().caught("guppy"), 1);

    // Saved right away
    let json = store.get(SAVE_KEY).unwrap().expect("save written");
    assert!(json.contains("\"guppy\":1"));
}

#[test]
fn test_offline_lore_falls_back_immediately() {
    let store = MemoryStore::new();
    let mut session = session_with(&store, Box::new(OfflineNarrator));
    land_guppy(&mut session);

    let catch = session.catch_result().unwrap();
    assert_eq!(
        catch.lore,
        LoreStatus::Ready(LoreError::MissingCredentials.fallback_text().to_string())
    );
}

#[test]
fn test_acknowledge_parks_hook_and_removes_fish() {
    let mut session = Session::offline(3);
    land_guppy(&mut session);
    let GamePhase::Caught { fish_id } = session.sim().phase else {
        panic!("expected a landed fish");
    };

    let closed = session.acknowledge_catch().expect("catch closed");
    assert_eq!(closed.species.id, "guppy");
    assert_eq!(session.sim().phase, GamePhase::Idle);
    assert!(session.sim().fish_by_id(fish_id).is_none());
    assert!(session.catch_result().is_none());
    assert!(session.acknowledge_catch().is_none());
}

#[test]
fn test_late_lore_for_old_catch_is_discarded() {
    let store = MemoryStore::new();
    let narrator = HeldNarrator::default();
    let mut session = session_with(&store, Box::new(narrator.clone()));

    land_guppy(&mut session);
    let first = session.catch_result().unwrap().ticket;
    assert!(session.catch_result().unwrap().lore.is_pending());
    session.acknowledge_catch();

    land_guppy(&mut session);
    let second = session.catch_result().unwrap().ticket;
    assert_ne!(first, second);

    // The first answer arrives while the second catch is on display
    narrator.take(first).settle(Ok("Old news.".to_string()));
    session.step(0.0);
    assert!(session.catch_result().unwrap().lore.is_pending());

    narrator.take(second).settle(Ok("Guppies love disco.".to_string()));
    session.step(0.0);
    assert_eq!(
        session.catch_result().unwrap().lore.text(),
        Some("Guppies love disco.")
    );
}

#[test]
fn test_slow_narration_leaves_lore_pending() {
    let store = MemoryStore::new();
    let narrator = ThreadedNarrator::default();
    let mut session = session_with(&store, Box::new(narrator.clone()));
    land_guppy(&mut session);

    // The game keeps running while the answer is outstanding
    assert!(session.catch_result().unwrap().lore.is_pending());
    session.step(1.0);
    session.step(1.0);
    assert!(session.catch_result().unwrap().lore.is_pending());

    narrator.release_all();
    session.step(0.0);
    assert_eq!(
        session.catch_result().unwrap().lore.text(),
        Some("The Neon Guppy took its time.")
    );
}

#[test]
fn test_dropped_request_settles_with_fallback() {
    let store = MemoryStore::new();
    let narrator = HeldNarrator::default();
    let mut session = session_with(&store, Box::new(narrator.clone()));
    land_guppy(&mut session);

    let ticket = session.catch_result().unwrap().ticket;
    drop(narrator.take(ticket));
    session.step(0.0);
    assert_eq!(
        session.catch_result().unwrap().lore.text(),
        Some(LoreError::Abandoned.fallback_text())
    );
}

#[test]
fn test_purchases_persist_across_sessions() {
    let store = MemoryStore::new();
    store
        .set(
            SAVE_KEY,
            r#"{"score":1000,"inventory":{"crab":2},"upgradeState":{"rodLevel":0,"reelLevel":0}}"#,
        )
        .unwrap();

    let mut session = session_with(&store, Box::new(OfflineNarrator));
    assert_eq!(session.score(), 1000);
    assert!(matches!(
        session.buy_rod(),
        PurchaseOutcome::Upgraded { level: 1, cost: 200, .. }
    ));
    assert!(matches!(
        session.buy_reel(),
        PurchaseOutcome::Upgraded { level: 1, cost: 150, .. }
    ));
    assert!(session.buy_rod().succeeded());
    assert_eq!(
        session.buy_reel(),
        PurchaseOutcome::InsufficientFunds {
            cost: 500,
            score: 50
        }
    );

    let reloaded = session_with(&store, Box::new(OfflineNarrator));
    assert_eq!(reloaded.score(), 50);
    assert_eq!(reloaded.progress().upgrades.rod_level, 2);
    assert_eq!(reloaded.progress().upgrades.reel_level, 1);
    assert_eq!(reloaded.progress().caught("crab"), 2);
    assert!(!reloaded.shop_offer(UpgradeTrack::Rod).affordable);
}

#[test]
fn test_reset_progress_clears_everything() {
    let store = MemoryStore::new();
    let mut session = session_with(&store, Box::new(OfflineNarrator));
    land_guppy(&mut session);
    assert!(store.get(SAVE_KEY).unwrap().is_some());

    session.reset_progress();
    assert_eq!(session.score(), 0);
    assert!(session.inventory().is_empty());
    assert!(session.catch_result().is_none());
    assert_eq!(session.sim().phase, GamePhase::Idle);
    assert_eq!(store.get(SAVE_KEY).unwrap(), None);
}

#[test]
fn test_cues_follow_the_fight() {
    let cues = CueLog::new();
    let mut session = Session::new(
        11,
        Box::new(MemoryStore::new()),
        Box::new(cues.clone()),
        Box::new(OfflineNarrator),
    );
    land_guppy(&mut session);

    let played = cues.cues();
    assert_eq!(played.first(), Some(&Cue::Cast));
    assert_eq!(cues.count(Cue::Bite), 1);
    assert_eq!(cues.count(Cue::Catch), 1);
    assert!(cues.count(Cue::Reel) > 0);
    assert_eq!(played.last(), Some(&Cue::Catch));
}

#[test]
fn test_damaged_save_starts_fresh() {
    let store = MemoryStore::new();
    store.set(SAVE_KEY, "not even json").unwrap();
    let session = session_with(&store, Box::new(OfflineNarrator));
    assert_eq!(session.score(), 0);
    assert!(session.inventory().is_empty());
}

#[test]
fn test_frames_are_deterministic_per_seed() {
    let run = |seed| {
        let mut session = Session::offline(seed);
        session.cast();
        let mut trace = Vec::new();
        for frame in 0..2_000 {
            let snap = session.frame(frame as f64 * 16.0);
            trace.push((snap.phase.as_str(), snap.fish.len()));
            if session.sim().phase == GamePhase::Idle {
                session.cast();
            }
        }
        trace
    };
    assert_eq!(run(5), run(5));
}

//! Reel Master entry point
//!
//! Web: drives a `Session` from requestAnimationFrame and draws it into the
//! DOM. Native: runs a headless autoplay session and logs what it catches.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::fmt::Write as _;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, MouseEvent, TouchEvent};

    use reel_master::audio::AudioManager;
    use reel_master::narrator::narrator_for;
    use reel_master::persistence::LocalStorage;
    use reel_master::sim::{GamePhase, Snapshot, TensionZone};
    use reel_master::{LoreStatus, Session, Settings, UpgradeTrack};

    /// Game instance holding all state
    struct Game {
        session: Session,
        /// Phase label last written to the DOM
        last_phase: &'static str,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let narrator = narrator_for(&settings.narrator);
            let mut session = Session::new(
                seed,
                Box::new(LocalStorage),
                Box::new(AudioManager::new()),
                narrator,
            );
            session.set_settings(settings);
            Self {
                session,
                last_phase: "",
            }
        }

        /// Draw fish and hook
        fn render(&self, document: &Document, snap: &Snapshot) {
            if let Some(layer) = document.get_element_by_id("fish-layer") {
                let mut html = String::new();
                for fish in &snap.fish {
                    let _ = write!(
                        html,
                        "<div class=\"fish{}\" style=\"left:{:.2}%;top:{:.2}%;color:{};transform:translate(-50%,-50%) scaleX({})\">{}</div>",
                        if fish.hooked { " hooked" } else { "" },
                        fish.x,
                        fish.y,
                        fish.color,
                        -fish.facing,
                        fish.glyph
                    );
                }
                layer.set_inner_html(&html);
            }

            if let Some(hook) = document.get_element_by_id("hook") {
                let (x, y) = snap.hook_xy();
                let _ = hook.set_attribute("style", &format!("left:{:.2}%;top:{:.2}%", x, y));
            }
            if let Some(line) = document.get_element_by_id("line") {
                let _ = line.set_attribute(
                    "style",
                    &format!("height:calc({:.2}% + 10%)", snap.hook.y.max(-10.0)),
                );
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self, document: &Document, snap: &Snapshot) {
            let progress = self.session.progress();

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&progress.score.to_string()));
            }

            // Tension bar
            let on_line = snap.phase.line().is_some();
            if let Some(el) = document.get_element_by_id("tension") {
                set_visible(&el, on_line);
            }
            if let Some(bar) = document.get_element_by_id("tension-fill") {
                let zone = match snap.tension_zone {
                    TensionZone::Slack => "slack",
                    TensionZone::Safe => "safe",
                    TensionZone::Danger => "danger",
                };
                let _ = bar.set_attribute("class", zone);
                let _ = bar.set_attribute("style", &format!("width:{:.0}%", snap.tension));
            }

            // Status line, only on phase change
            let phase = snap.phase.as_str();
            if phase != self.last_phase {
                self.last_phase = phase;
                if let Some(el) = document.get_element_by_id("status") {
                    let text = match snap.phase {
                        GamePhase::Idle => "Tap CAST to drop your line",
                        GamePhase::Casting | GamePhase::Sinking => "Waiting for a bite...",
                        GamePhase::Hooked(_) | GamePhase::Reeling(_) => {
                            "Fish on! Hold REEL, watch the tension"
                        }
                        GamePhase::Caught { .. } => "Got it!",
                        GamePhase::Lost { .. } => "It got away...",
                    };
                    el.set_text_content(Some(text));
                }
                if let Some(el) = document.get_element_by_id("cast-btn") {
                    set_visible(&el, snap.phase == GamePhase::Idle);
                }
                if let Some(el) = document.get_element_by_id("reel-btn") {
                    set_visible(&el, on_line);
                }
            }

            // Catch dialog
            if let Some(modal) = document.get_element_by_id("catch-modal") {
                match self.session.catch_result() {
                    Some(catch) => {
                        set_visible(&modal, true);
                        if let Some(el) = document.get_element_by_id("catch-name") {
                            el.set_text_content(Some(&format!(
                                "{} {}",
                                catch.species.glyph, catch.species.name
                            )));
                        }
                        if let Some(el) = document.get_element_by_id("catch-stats") {
                            el.set_text_content(Some(&format!(
                                "{} · {:.1} kg · +{}",
                                catch.species.rarity.as_str(),
                                catch.weight,
                                catch.payout
                            )));
                        }
                        if let Some(el) = document.get_element_by_id("catch-lore") {
                            let text = match &catch.lore {
                                LoreStatus::Pending => "Consulting the fish oracle...",
                                LoreStatus::Ready(text) => text.as_str(),
                            };
                            el.set_text_content(Some(text));
                        }
                    }
                    None => set_visible(&modal, false),
                }
            }

            // Shop
            for (track, id) in [(UpgradeTrack::Rod, "buy-rod"), (UpgradeTrack::Reel, "buy-reel")] {
                let Some(btn) = document.get_element_by_id(id) else {
                    continue;
                };
                let offer = self.session.shop_offer(track);
                let label = match offer.next {
                    Some(next) => format!("{} ({})", next.name, next.cost),
                    None => format!("{} (MAX)", offer.current.name),
                };
                btn.set_text_content(Some(&label));
                let _ = btn.class_list().toggle_with_force("disabled", !offer.affordable);
            }

            // Inventory
            if let Some(el) = document.get_element_by_id("inventory") {
                let mut html = String::new();
                for (species, count) in self.session.inventory() {
                    let _ = write!(
                        html,
                        "<span class=\"inv-item\" title=\"{}\">{} {}</span>",
                        species.name, species.glyph, count
                    );
                }
                el.set_inner_html(&html);
            }
        }
    }

    fn set_visible(el: &Element, visible: bool) {
        let _ = el.class_list().toggle_with_force("hidden", !visible);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Reel Master starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document, cannot start");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        if let Some(help) = document.get_element_by_id("help") {
            set_visible(&help, game.borrow().session.settings().show_help);
        }

        setup_input_handlers(&document, game.clone());
        setup_shop(&document, game.clone());
        setup_dialogs(&document, game.clone());

        request_animation_frame(game);

        log::info!("Reel Master running!");
    }

    /// Attach a click handler to an element by id
    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_input_handlers(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, "cast-btn", move || {
                game.borrow_mut().session.cast();
            });
        }

        let Some(reel) = document.get_element_by_id("reel-btn") else {
            log::warn!("Missing #reel-btn");
            return;
        };

        // Hold to reel: mouse
        for (name, held) in [("mousedown", true), ("mouseup", false), ("mouseleave", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if held {
                    g.session.reel_start();
                } else {
                    g.session.reel_end();
                }
            });
            let _ = reel.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Hold to reel: touch
        for (name, held) in [("touchstart", true), ("touchend", false), ("touchcancel", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if held {
                    g.session.reel_start();
                } else {
                    g.session.reel_end();
                }
            });
            let _ = reel.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_shop(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, "buy-rod", move || {
                game.borrow_mut().session.buy_rod();
            });
        }
        on_click(document, "buy-reel", move || {
            game.borrow_mut().session.buy_reel();
        });
    }

    fn setup_dialogs(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, "catch-close", move || {
                game.borrow_mut().session.acknowledge_catch();
            });
        }

        on_click(document, "help-btn", || {
            if let Some(help) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("help"))
            {
                set_visible(&help, true);
            }
        });

        {
            let game = game.clone();
            on_click(document, "help-close", move || {
                let mut g = game.borrow_mut();
                let mut settings = g.session.settings().clone();
                settings.show_help = false;
                settings.save();
                g.session.set_settings(settings);
                if let Some(help) = web_sys::window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.get_element_by_id("help"))
                {
                    set_visible(&help, false);
                }
            });
        }

        on_click(document, "reset-btn", move || {
            let confirmed = web_sys::window()
                .and_then(|w| {
                    w.confirm_with_message("Reset all progress? This cannot be undone.")
                        .ok()
                })
                .unwrap_or(false);
            if confirmed {
                game.borrow_mut().session.reset_progress();
            }
        });
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let mut g = game.borrow_mut();
            let snap = g.session.frame(time);
            g.render(&document, &snap);
            g.update_hud(&document, &snap);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use reel_master::audio::{Cue, CueLog};
    use reel_master::consts::FRAME_UNIT_MS;
    use reel_master::narrator::narrator_for;
    use reel_master::persistence::MemoryStore;
    use reel_master::sim::GamePhase;
    use reel_master::{LoreStatus, Session, Settings};

    /// Start reeling below this tension
    const REEL_BELOW: f32 = 70.0;
    /// Let the line go slack above this tension
    const SLACK_ABOVE: f32 = 90.0;

    /// Play `frames` frames with a simple tension-keeping strategy
    pub fn run(seed: u64, frames: u32) {
        let settings = Settings::load();
        let cues = CueLog::new();
        let mut session = Session::new(
            seed,
            Box::new(MemoryStore::new()),
            Box::new(cues.clone()),
            narrator_for(&settings.narrator),
        );
        session.set_settings(settings);

        for frame in 0..frames {
            session.frame(frame as f64 * FRAME_UNIT_MS);

            let phase = session.sim().phase;
            match phase {
                GamePhase::Idle => {
                    if session.buy_reel().succeeded() || session.buy_rod().succeeded() {
                        let upgrades = session.progress().upgrades;
                        log::info!(
                            "Upgraded gear: rod {}, reel {}",
                            upgrades.rod_level,
                            upgrades.reel_level
                        );
                    }
                    session.cast();
                }
                GamePhase::Hooked(line) if line.tension < REEL_BELOW => session.reel_start(),
                GamePhase::Reeling(line) if line.tension > SLACK_ABOVE => session.reel_end(),
                GamePhase::Caught { .. } => {
                    session.reel_end();
                    if let Some(catch) = session.acknowledge_catch() {
                        let lore = match &catch.lore {
                            LoreStatus::Ready(text) => text.as_str(),
                            LoreStatus::Pending => "(no narration yet)",
                        };
                        log::info!(
                            "Frame {}: {} {:.1} kg, +{} | {}",
                            frame,
                            catch.species.name,
                            catch.weight,
                            catch.payout,
                            lore
                        );
                    }
                }
                GamePhase::Lost { .. } => session.reel_end(),
                _ => {}
            }
        }

        let progress = session.progress();
        log::info!(
            "Done after {} frames: score {}, {} caught, {} lost, {} reel clicks",
            frames,
            progress.score,
            progress.total_caught(),
            cues.count(Cue::Lost),
            cues.count(Cue::Reel)
        );
        for (species, count) in session.inventory() {
            log::info!("  {} {} x{}", species.glyph, species.name, count);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Reel Master (native) starting...");
    log::info!("Native mode runs a headless autoplay session - run with `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    let frames = args.next().and_then(|a| a.parse().ok()).unwrap_or(20_000);
    let seed = args.next().and_then(|a| a.parse().ok()).unwrap_or(42);

    autoplay::run(seed, frames);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

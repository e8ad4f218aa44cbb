//! Catch narration
//!
//! A `Narrator` turns a catch into a couple of sentences of flavor text. The
//! answer may arrive frames later (browser fetch), so it is delivered through
//! a `LoreReply` into a `LoreInbox` that the session drains once per frame.
//! Narrators that block hand the reply to a worker thread as a `RemoteReply`.
//! Every reply settles exactly once: with the service's text, or with a
//! fallback line when anything goes wrong.

pub mod gemini;

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::mpsc::{self, Receiver, Sender};

use thiserror::Error;

use crate::settings::NarratorConfig;
use crate::tuning::Rarity;

pub use gemini::GeminiNarrator;

/// Why no generated text is available
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoreError {
    #[error("no API key configured")]
    MissingCredentials,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service returned no text")]
    EmptyResponse,
    #[error("unexpected response: {0}")]
    BadResponse(String),
    #[error("reply dropped before it was answered")]
    Abandoned,
}

impl LoreError {
    /// Line shown to the player instead of generated text
    pub fn fallback_text(&self) -> &'static str {
        match self {
            LoreError::MissingCredentials => "A mysterious catch! (No API key configured)",
            LoreError::EmptyResponse => "This fish is too slippery to describe!",
            LoreError::Transport(_) | LoreError::BadResponse(_) | LoreError::Abandoned => {
                "The fish stares back at you in silence."
            }
        }
    }
}

/// What the narrator is asked to describe
#[derive(Debug, Clone, PartialEq)]
pub struct LoreRequest {
    pub ticket: u64,
    pub species_name: &'static str,
    pub rarity: Rarity,
    /// Kilograms
    pub weight: f32,
}

impl LoreRequest {
    pub fn prompt(&self) -> String {
        format!(
            "I just caught a {} weighing {:.1} kg in a fishing game. \
             It is a {} fish. \
             Describe it in exactly 2 short, funny sentences. \
             The first sentence should be a fun fact or legend about this fish. \
             The second should be a humorous cooking tip, or a reason not to eat it. \
             Keep the tone light and playful.",
            self.species_name,
            self.weight,
            self.rarity.as_str()
        )
    }
}

/// A settled answer waiting in the inbox
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub ticket: u64,
    pub text: String,
    /// True when `text` is a fallback line
    pub fallback: bool,
}

/// An answer produced off the main thread
type Answer = (u64, Result<String, LoreError>);

#[derive(Debug)]
struct Shared {
    queue: RefCell<Vec<Delivery>>,
    tx: Sender<Answer>,
    rx: Receiver<Answer>,
}

impl Default for Shared {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            queue: RefCell::new(Vec::new()),
            tx,
            rx,
        }
    }
}

fn delivery(ticket: u64, result: Result<String, LoreError>) -> Delivery {
    match result {
        Ok(text) => Delivery {
            ticket,
            text,
            fallback: false,
        },
        Err(e) => {
            log::warn!("Catch narration unavailable: {}", e);
            Delivery {
                ticket,
                text: e.fallback_text().to_string(),
                fallback: true,
            }
        }
    }
}

/// Mailbox for narrator answers. Replies settled on this thread land in a
/// queue; replies handed to a worker thread come back over a channel.
#[derive(Debug, Clone, Default)]
pub struct LoreInbox {
    shared: Rc<Shared>,
}

impl LoreInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply handle for one request
    pub fn reply_for(&self, ticket: u64) -> LoreReply {
        LoreReply {
            ticket,
            shared: Rc::downgrade(&self.shared),
            settled: false,
        }
    }

    /// Take everything delivered since the last drain
    pub fn drain(&self) -> Vec<Delivery> {
        let mut deliveries = std::mem::take(&mut *self.shared.queue.borrow_mut());
        deliveries.extend(
            self.shared
                .rx
                .try_iter()
                .map(|(ticket, result)| delivery(ticket, result)),
        );
        deliveries
    }
}

/// One-shot answer slot. Dropping it unsettled delivers the fallback line.
#[derive(Debug)]
pub struct LoreReply {
    ticket: u64,
    shared: Weak<Shared>,
    settled: bool,
}

impl LoreReply {
    /// Deliver the answer
    pub fn settle(mut self, result: Result<String, LoreError>) {
        self.deliver(result);
    }

    /// Turn this reply into one that can be settled from another thread
    pub fn into_remote(mut self) -> RemoteReply {
        self.settled = true;
        RemoteReply {
            ticket: self.ticket,
            tx: self.shared.upgrade().map(|shared| shared.tx.clone()),
            settled: false,
        }
    }

    fn deliver(&mut self, result: Result<String, LoreError>) {
        if self.settled {
            return;
        }
        self.settled = true;

        let delivery = delivery(self.ticket, result);
        // Session gone: nobody to tell
        if let Some(shared) = self.shared.upgrade() {
            shared.queue.borrow_mut().push(delivery);
        }
    }
}

impl Drop for LoreReply {
    fn drop(&mut self) {
        if !self.settled {
            self.deliver(Err(LoreError::Abandoned));
        }
    }
}

/// `LoreReply` for a worker thread. Same one-shot rules.
#[derive(Debug)]
pub struct RemoteReply {
    ticket: u64,
    tx: Option<Sender<Answer>>,
    settled: bool,
}

impl RemoteReply {
    pub fn settle(mut self, result: Result<String, LoreError>) {
        self.deliver(result);
    }

    fn deliver(&mut self, result: Result<String, LoreError>) {
        if self.settled {
            return;
        }
        self.settled = true;
        if let Some(tx) = &self.tx {
            // Receiver gone means the session is gone
            let _ = tx.send((self.ticket, result));
        }
    }
}

impl Drop for RemoteReply {
    fn drop(&mut self) {
        if !self.settled {
            self.deliver(Err(LoreError::Abandoned));
        }
    }
}

/// Text-generation gateway
pub trait Narrator {
    /// Start describing a catch. The answer goes to `reply`, now or later.
    fn describe(&self, request: LoreRequest, reply: LoreReply);
}

/// Narrator with no service behind it
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNarrator;

impl Narrator for OfflineNarrator {
    fn describe(&self, _request: LoreRequest, reply: LoreReply) {
        reply.settle(Err(LoreError::MissingCredentials));
    }
}

/// Narrator for the given configuration: Gemini with a key, offline without
pub fn narrator_for(config: &NarratorConfig) -> Box<dyn Narrator> {
    if config.credentials().is_some() {
        log::info!("Catch narration via {}", config.model);
        Box::new(GeminiNarrator::new(config.clone()))
    } else {
        log::info!("No API key, catch narration offline");
        Box::new(OfflineNarrator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LoreRequest {
        LoreRequest {
            ticket: 3,
            species_name: "Cheeky Crab",
            rarity: Rarity::Common,
            weight: 2.46,
        }
    }

    #[test]
    fn test_prompt_mentions_catch() {
        let prompt = request().prompt();
        assert!(prompt.contains("Cheeky Crab"));
        assert!(prompt.contains("2.5 kg"));
        assert!(prompt.contains("Common"));
        assert!(prompt.contains("2 short, funny sentences"));
    }

    #[test]
    fn test_settle_delivers_once() {
        let inbox = LoreInbox::new();
        inbox.reply_for(1).settle(Ok("Crabs are fun.".to_string()));

        let deliveries = inbox.drain();
        assert_eq!(
            deliveries,
            vec![Delivery {
                ticket: 1,
                text: "Crabs are fun.".to_string(),
                fallback: false
            }]
        );
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn test_errors_deliver_fallbacks() {
        let inbox = LoreInbox::new();
        inbox.reply_for(1).settle(Err(LoreError::MissingCredentials));
        inbox.reply_for(2).settle(Err(LoreError::EmptyResponse));
        inbox
            .reply_for(3)
            .settle(Err(LoreError::Transport("offline".into())));

        let texts: Vec<_> = inbox.drain().into_iter().map(|d| d.text).collect();
        assert_eq!(texts.len(), 3);
        assert_ne!(texts[0], texts[1]);
        assert_ne!(texts[1], texts[2]);
        assert_ne!(texts[0], texts[2]);
    }

    #[test]
    fn test_dropped_reply_falls_back() {
        let inbox = LoreInbox::new();
        drop(inbox.reply_for(9));

        let deliveries = inbox.drain();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].ticket, 9);
        assert!(deliveries[0].fallback);
        assert_eq!(deliveries[0].text, LoreError::Abandoned.fallback_text());
    }

    #[test]
    fn test_reply_outliving_inbox_is_harmless() {
        let inbox = LoreInbox::new();
        let reply = inbox.reply_for(1);
        drop(inbox);
        reply.settle(Ok("late".to_string()));
    }

    #[test]
    fn test_remote_reply_arrives_on_drain() {
        let inbox = LoreInbox::new();
        let remote = inbox.reply_for(4).into_remote();
        assert!(inbox.drain().is_empty());

        std::thread::spawn(move || remote.settle(Ok("Slow but sure.".to_string())))
            .join()
            .unwrap();

        let deliveries = inbox.drain();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].ticket, 4);
        assert_eq!(deliveries[0].text, "Slow but sure.");
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn test_dropped_remote_reply_falls_back() {
        let inbox = LoreInbox::new();
        let remote = inbox.reply_for(5).into_remote();
        std::thread::spawn(move || drop(remote)).join().unwrap();

        let deliveries = inbox.drain();
        assert_eq!(deliveries.len(), 1);
        assert!(deliveries[0].fallback);
        assert_eq!(deliveries[0].text, LoreError::Abandoned.fallback_text());
    }

    #[test]
    fn test_offline_narrator_settles_immediately() {
        let inbox = LoreInbox::new();
        OfflineNarrator.describe(request(), inbox.reply_for(3));
        let deliveries = inbox.drain();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(
            deliveries[0].text,
            LoreError::MissingCredentials.fallback_text()
        );
    }
}

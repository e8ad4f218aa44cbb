//! Player progress save slot
//!
//! One JSON document: `{score, inventory, upgradeState: {rodLevel,
//! reelLevel}}`. Loading never fails: missing or damaged data falls back to
//! a fresh start, and out-of-range levels are clamped into the tier tables.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{KeyValueStore, StorageError};
use crate::economy::{Progress, UpgradeState};

/// Storage key for the save document
pub const SAVE_KEY: &str = "reel_master_save_v1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveDocument<'a> {
    score: u64,
    inventory: &'a BTreeMap<String, u32>,
    upgrade_state: LevelsDocument,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LevelsDocument {
    rod_level: usize,
    reel_level: usize,
}

/// Non-negative whole part of a stored number (0 for NaN, negatives, absent)
fn whole(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.floor() as u64,
        _ => 0,
    }
}

/// Encode progress as the save document
pub fn encode_progress(progress: &Progress) -> Result<String, StorageError> {
    let doc = SaveDocument {
        score: progress.score,
        inventory: &progress.inventory,
        upgrade_state: LevelsDocument {
            rod_level: progress.upgrades.rod_level,
            reel_level: progress.upgrades.reel_level,
        },
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Decode a save document, clamping anything out of range. Each field is
/// read on its own: a damaged field falls back to its default without taking
/// the others with it.
pub fn decode_progress(json: &str) -> Result<Progress, StorageError> {
    let doc: Map<String, Value> = serde_json::from_str(json)?;
    let number = |value: Option<&Value>| whole(value.and_then(Value::as_f64));

    let inventory = match doc.get("inventory") {
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(id, count)| (id.clone(), number(Some(count)).min(u32::MAX as u64) as u32))
            .filter(|(_, count)| *count > 0)
            .collect(),
        Some(other) => {
            log::warn!("Ignoring damaged inventory in save: {}", other);
            BTreeMap::new()
        }
        None => BTreeMap::new(),
    };

    let levels = doc.get("upgradeState");
    let upgrades = UpgradeState::clamped(
        number(levels.and_then(|l| l.get("rodLevel"))) as usize,
        number(levels.and_then(|l| l.get("reelLevel"))) as usize,
    );

    Ok(Progress {
        score: number(doc.get("score")),
        inventory,
        upgrades,
    })
}

/// The player's progress in a key-value store
pub struct SaveSlot {
    store: Box<dyn KeyValueStore>,
}

impl SaveSlot {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load saved progress, or a fresh start if there is none or it is unreadable
    pub fn load(&self) -> Progress {
        let json = match self.store.get(SAVE_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::info!("No save found, starting fresh");
                return Progress::default();
            }
            Err(e) => {
                log::warn!("Could not read save: {}", e);
                return Progress::default();
            }
        };

        match decode_progress(&json) {
            Ok(progress) => {
                log::info!(
                    "Loaded save: score {}, {} fish caught",
                    progress.score,
                    progress.total_caught()
                );
                progress
            }
            Err(e) => {
                log::warn!("Save data is damaged, starting fresh: {}", e);
                Progress::default()
            }
        }
    }

    /// Write the whole progress document
    pub fn save(&self, progress: &Progress) -> Result<(), StorageError> {
        let json = encode_progress(progress)?;
        self.store.set(SAVE_KEY, &json)?;
        log::debug!("Progress saved (score {})", progress.score);
        Ok(())
    }

    /// Delete the save document
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(SAVE_KEY)?;
        log::info!("Save cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::tuning::{REEL_TIERS, ROD_TIERS};

    fn slot() -> (SaveSlot, MemoryStore) {
        let store = MemoryStore::new();
        (SaveSlot::new(Box::new(store.clone())), store)
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (slot, _) = slot();
        let mut progress = Progress::new();
        progress.record_catch("guppy", 25);
        progress.record_catch("shark", 900);
        progress.upgrades = UpgradeState::clamped(2, 1);

        slot.save(&progress).unwrap();
        assert_eq!(slot.load(), progress);
    }

    #[test]
    fn test_document_shape() {
        let (slot, store) = slot();
        let mut progress = Progress::new();
        progress.record_catch("crab", 40);
        slot.save(&progress).unwrap();

        let json = store.get(SAVE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["score"], 40);
        assert_eq!(value["inventory"]["crab"], 1);
        assert_eq!(value["upgradeState"]["rodLevel"], 0);
        assert_eq!(value["upgradeState"]["reelLevel"], 0);
    }

    #[test]
    fn test_missing_save_loads_defaults() {
        let (slot, _) = slot();
        assert_eq!(slot.load(), Progress::default());
    }

    #[test]
    fn test_garbage_loads_defaults() {
        let (slot, store) = slot();
        store.set(SAVE_KEY, "{not json").unwrap();
        assert_eq!(slot.load(), Progress::default());

        store.set(SAVE_KEY, "[1, 2, 3]").unwrap();
        assert_eq!(slot.load(), Progress::default());
    }

    #[test]
    fn test_levels_clamped_on_load() {
        let progress = decode_progress(
            r#"{"score": 10, "inventory": {}, "upgradeState": {"rodLevel": 99, "reelLevel": -3}}"#,
        )
        .unwrap();
        assert_eq!(progress.upgrades.rod_level, ROD_TIERS.len() - 1);
        assert_eq!(progress.upgrades.reel_level, 0);
        assert!(REEL_TIERS.len() > progress.upgrades.reel_level);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let progress = decode_progress(r#"{"score": 123.9}"#).unwrap();
        assert_eq!(progress.score, 123);
        assert!(progress.inventory.is_empty());
        assert_eq!(progress.upgrades, UpgradeState::default());
    }

    #[test]
    fn test_damaged_field_keeps_the_rest() {
        let progress = decode_progress(
            r#"{"score": 500, "inventory": {"guppy": "3", "crab": 2}, "upgradeState": {"rodLevel": 2, "reelLevel": "max"}}"#,
        )
        .unwrap();
        assert_eq!(progress.score, 500);
        assert_eq!(progress.caught("guppy"), 0);
        assert_eq!(progress.caught("crab"), 2);
        assert_eq!(progress.upgrades, UpgradeState::clamped(2, 0));

        let progress =
            decode_progress(r#"{"score": "lots", "inventory": [1, 2], "upgradeState": 7}"#).unwrap();
        assert_eq!(progress, Progress::default());
    }

    #[test]
    fn test_clear_removes_document() {
        let (slot, store) = slot();
        slot.save(&Progress::new()).unwrap();
        slot.clear().unwrap();
        assert_eq!(store.get(SAVE_KEY).unwrap(), None);
    }
}

//! Game settings and preferences
//!
//! Persisted separately from the progress save in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;

/// Environment variable holding the narrator API key on native builds
pub const API_KEY_ENV: &str = "REEL_MASTER_API_KEY";

/// Text-generation service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarratorConfig {
    /// No key means the narrator runs offline and always falls back
    pub api_key: Option<String>,
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            max_output_tokens: 100,
            temperature: 0.9,
        }
    }
}

impl NarratorConfig {
    /// Key to use, ignoring blank entries
    pub fn credentials(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Visual Effects ===
    /// Jitter the hook while a fish is on the line
    pub hook_shake: bool,

    // === Accessibility ===
    /// Reduced motion (disables hook shake)
    pub reduced_motion: bool,

    // === HUD ===
    /// Show the instructions panel on start
    pub show_help: bool,

    pub narrator: NarratorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            hook_shake: true,
            reduced_motion: false,
            show_help: true,

            narrator: NarratorConfig::default(),
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "reel_master_settings";

    /// Effective hook shake (respects reduced_motion)
    pub fn effective_hook_shake(&self) -> bool {
        self.hook_shake && !self.reduced_motion
    }

    /// Effective sound effect volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Load from a store, falling back to defaults
    pub fn load_from(store: &dyn KeyValueStore) -> Self {
        if let Ok(Some(json)) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save to a store
    pub fn save_to(&self, store: &dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Settings not saved: {}", e),
            },
            Err(e) => log::warn!("Settings not saved: {}", e),
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::load_from(&crate::persistence::LocalStorage)
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        self.save_to(&crate::persistence::LocalStorage);
    }

    /// Native: defaults, with the narrator key taken from the environment
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let mut settings = Self::default();
        settings.narrator.api_key = std::env::var(API_KEY_ENV).ok();
        settings
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

//! User notification preferences and their persistence.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    engine::events::EventKind,
    error::{AlertError, Result},
    storage::{KeyValueStore, SETTINGS_KEY},
};

fn default_true() -> bool {
    true
}

/// Per-user notification preferences.
///
/// Stored as camelCase JSON under [`SETTINGS_KEY`]. Fields missing from a
/// stored record fall back to their defaults, so older records keep loading
/// after new event kinds are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub goals: bool,
    #[serde(default = "default_true")]
    pub assists: bool,
    #[serde(default = "default_true")]
    pub yellow_cards: bool,
    #[serde(default = "default_true")]
    pub red_cards: bool,
    #[serde(default = "default_true")]
    pub own_goals: bool,
    #[serde(default = "default_true")]
    pub penalty_saves: bool,
    #[serde(default = "default_true")]
    pub penalty_misses: bool,
    #[serde(default = "default_true")]
    pub substitutions: bool,
    #[serde(default = "default_true")]
    pub bonus: bool,
    #[serde(default = "default_true")]
    pub match_end: bool,
    /// Prefer the in-app surface over native notifications.
    #[serde(default = "default_true")]
    pub use_in_app: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            goals: true,
            assists: true,
            yellow_cards: true,
            red_cards: true,
            own_goals: true,
            penalty_saves: true,
            penalty_misses: true,
            substitutions: true,
            bonus: true,
            match_end: true,
            use_in_app: true,
        }
    }
}

impl NotificationSettings {
    pub fn is_kind_enabled(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Goal => self.goals,
            EventKind::Assist => self.assists,
            EventKind::YellowCard => self.yellow_cards,
            EventKind::RedCard => self.red_cards,
            EventKind::OwnGoal => self.own_goals,
            EventKind::PenaltySaved => self.penalty_saves,
            EventKind::PenaltyMissed => self.penalty_misses,
            EventKind::Substitution => self.substitutions,
            EventKind::BonusPoints => self.bonus,
            EventKind::MatchEnd => self.match_end,
        }
    }

    pub fn set_kind_enabled(&mut self, kind: EventKind, on: bool) {
        let flag = match kind {
            EventKind::Goal => &mut self.goals,
            EventKind::Assist => &mut self.assists,
            EventKind::YellowCard => &mut self.yellow_cards,
            EventKind::RedCard => &mut self.red_cards,
            EventKind::OwnGoal => &mut self.own_goals,
            EventKind::PenaltySaved => &mut self.penalty_saves,
            EventKind::PenaltyMissed => &mut self.penalty_misses,
            EventKind::Substitution => &mut self.substitutions,
            EventKind::BonusPoints => &mut self.bonus,
            EventKind::MatchEnd => &mut self.match_end,
        };
        *flag = on;
    }

    /// Global switch and the per-kind switch must both be on.
    pub fn allows(&self, kind: EventKind) -> bool {
        self.enabled && self.is_kind_enabled(kind)
    }
}

/// Which delivery channel the user prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPreference {
    InApp,
    Native,
}

impl std::str::FromStr for ChannelPreference {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "in-app" | "in_app" | "inapp" | "toast" => Ok(ChannelPreference::InApp),
            "native" | "system" => Ok(ChannelPreference::Native),
            other => Err(AlertError::InvalidChannel {
                channel: other.to_string(),
            }),
        }
    }
}

/// Read/write access to [`NotificationSettings`] in a key-value store.
pub struct SettingsStore {
    backend: Box<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Current settings; defaults when nothing is stored yet.
    ///
    /// A corrupt record or unreadable store also yields defaults, with a warning.
    pub fn load(&self) -> NotificationSettings {
        match self.backend.get(SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "stored notification settings are unreadable, using defaults");
                NotificationSettings::default()
            }),
            Ok(None) => NotificationSettings::default(),
            Err(e) => {
                warn!(error = %e, "could not read notification settings, using defaults");
                NotificationSettings::default()
            }
        }
    }

    /// Overwrite the stored settings.
    pub fn save(&mut self, settings: &NotificationSettings) -> Result<()> {
        let raw = serde_json::to_string(settings)?;
        self.backend.set(SETTINGS_KEY, &raw)
    }

    /// Load, mutate, save; returns the saved settings.
    pub fn update<F>(&mut self, f: F) -> Result<NotificationSettings>
    where
        F: FnOnce(&mut NotificationSettings),
    {
        let mut settings = self.load();
        f(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }

    pub fn set_kind(&mut self, kind: EventKind, on: bool) -> Result<NotificationSettings> {
        self.update(|s| s.set_kind_enabled(kind, on))
    }

    pub fn set_enabled(&mut self, on: bool) -> Result<NotificationSettings> {
        self.update(|s| s.enabled = on)
    }

    pub fn set_channel(&mut self, channel: ChannelPreference) -> Result<NotificationSettings> {
        self.update(|s| s.use_in_app = channel == ChannelPreference::InApp)
    }
}

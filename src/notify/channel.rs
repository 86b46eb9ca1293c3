//! Delivery channels and the capability checks that pick between them.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    engine::events::{DomainEvent, EventKind},
    error::{AlertError, Result},
    notify::{in_app::SharedSurface, settings::NotificationSettings},
};

/// Icon and badge shown with every notification.
pub const NOTIFICATION_ICON: &str = "/icons/icon-192x192.png";

/// A rendered notification, ready for any channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// Notification centres replace rather than stack entries sharing a tag.
    pub tag: String,
}

impl Notification {
    /// Deterministic title/body template per event kind.
    pub fn from_event(event: &DomainEvent) -> Self {
        let who = format!("{} ({})", event.player_name, event.team_name);
        let (title, body) = match event.kind {
            EventKind::Goal => ("⚽ Goal!".to_string(), format!("{} has scored!", who)),
            EventKind::Assist => ("🅰️ Assist".to_string(), format!("{} has provided an assist", who)),
            EventKind::YellowCard => ("🟨 Yellow Card".to_string(), format!("{} has been booked", who)),
            EventKind::RedCard => ("🟥 Red Card".to_string(), format!("{} has been sent off", who)),
            EventKind::OwnGoal => ("😬 Own Goal".to_string(), format!("{} has scored an own goal", who)),
            EventKind::PenaltySaved => (
                "🧤 Penalty Saved".to_string(),
                format!("{} has saved a penalty!", who),
            ),
            EventKind::PenaltyMissed => (
                "❌ Penalty Missed".to_string(),
                format!("{} has missed a penalty", who),
            ),
            EventKind::Substitution => (
                "🔄 Substitution".to_string(),
                format!("{} has been subbed off after {} minutes", who, event.magnitude),
            ),
            EventKind::BonusPoints => (
                "⭐ Bonus Points".to_string(),
                format!(
                    "{} earned {} bonus point{}",
                    who,
                    event.magnitude,
                    if event.magnitude == 1 { "" } else { "s" }
                ),
            ),
            EventKind::MatchEnd => (
                "🏁 Full Time".to_string(),
                format!("{} finished the match with {} minutes played", who, event.magnitude),
            ),
        };

        Self {
            title,
            body,
            icon: NOTIFICATION_ICON.to_string(),
            tag: notification_tag(event),
        }
    }
}

/// `"{kind}-{player_id}-{timestamp}"`
pub fn notification_tag(event: &DomainEvent) -> String {
    format!("{}-{}-{}", event.kind, event.player_id, event.timestamp)
}

/// State of the platform notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Never asked.
    #[default]
    Default,
    Granted,
    Denied,
}

/// What the host platform can do; detected once at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlatformCapabilities {
    pub native_supported: bool,
    pub permission: Permission,
    /// Running inside the iOS native wrapper.
    pub ios_wrapper: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Native,
    InApp,
    PlatformPush,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelKind::Native => "native",
            ChannelKind::InApp => "in-app",
            ChannelKind::PlatformPush => "platform-push",
        };
        f.write_str(s)
    }
}

/// Pick the channel for one dispatch.
///
/// Native needs support, a granted permission and no in-app preference.
/// The iOS wrapper always renders in-app with a haptic pulse.
pub fn select_channel(caps: &PlatformCapabilities, settings: &NotificationSettings) -> ChannelKind {
    if caps.ios_wrapper {
        ChannelKind::PlatformPush
    } else if caps.native_supported && caps.permission == Permission::Granted && !settings.use_in_app {
        ChannelKind::Native
    } else {
        ChannelKind::InApp
    }
}

/// A delivery mechanism for rendered notifications.
pub trait NotificationChannel: Send {
    fn kind(&self) -> ChannelKind;
    fn deliver(&mut self, notification: &Notification, now: Instant) -> Result<()>;
}

/// OS-level notification display.
pub trait NativeNotifier: Send {
    fn show(&mut self, notification: &Notification) -> Result<()>;
}

/// Short vibration on devices that have one.
pub trait HapticFeedback: Send {
    fn pulse(&mut self);
}

/// Native notifier for hosts without a notification centre: writes to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NativeNotifier for LogNotifier {
    fn show(&mut self, notification: &Notification) -> Result<()> {
        info!(
            tag = %notification.tag,
            title = %notification.title,
            body = %notification.body,
            "native notification"
        );
        Ok(())
    }
}

/// Haptics for hosts that have none.
#[derive(Debug, Default)]
pub struct NoHaptics;

impl HapticFeedback for NoHaptics {
    fn pulse(&mut self) {}
}

pub struct NativeChannel {
    notifier: Box<dyn NativeNotifier>,
}

impl NativeChannel {
    pub fn new(notifier: impl NativeNotifier + 'static) -> Self {
        Self {
            notifier: Box::new(notifier),
        }
    }
}

impl NotificationChannel for NativeChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Native
    }

    fn deliver(&mut self, notification: &Notification, _now: Instant) -> Result<()> {
        self.notifier.show(notification)
    }
}

pub struct InAppChannel {
    surface: SharedSurface,
}

impl InAppChannel {
    pub fn new(surface: SharedSurface) -> Self {
        Self { surface }
    }
}

impl NotificationChannel for InAppChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::InApp
    }

    fn deliver(&mut self, notification: &Notification, now: Instant) -> Result<()> {
        let mut surface = self.surface.lock().map_err(|_| AlertError::Delivery {
            message: "in-app surface lock poisoned".to_string(),
        })?;
        surface.push(notification.clone(), now);
        Ok(())
    }
}

/// iOS wrapper: in-app visual plus a haptic pulse.
pub struct PlatformPushChannel {
    in_app: InAppChannel,
    haptics: Box<dyn HapticFeedback>,
}

impl PlatformPushChannel {
    pub fn new(surface: SharedSurface, haptics: impl HapticFeedback + 'static) -> Self {
        Self {
            in_app: InAppChannel::new(surface),
            haptics: Box::new(haptics),
        }
    }
}

impl NotificationChannel for PlatformPushChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::PlatformPush
    }

    fn deliver(&mut self, notification: &Notification, now: Instant) -> Result<()> {
        self.haptics.pulse();
        self.in_app.deliver(notification, now)
    }
}

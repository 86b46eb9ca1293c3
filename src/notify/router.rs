//! Routes detected events to the user's notification channels.

use std::time::Instant;

use tracing::{debug, warn};

use crate::{
    engine::{events::DomainEvent, scheduler::EventSink},
    notify::{
        channel::{
            select_channel, ChannelKind, HapticFeedback, InAppChannel, LogNotifier, NativeChannel,
            NativeNotifier, NoHaptics, Notification, NotificationChannel, Permission,
            PlatformCapabilities, PlatformPushChannel,
        },
        in_app::SharedSurface,
        settings::SettingsStore,
    },
};

#[cfg(test)]
mod tests;

/// Filters events by the user's settings and forwards each one to a single channel.
///
/// There is no deduplication here: the detector emits each occurrence once,
/// so every call is one delivery.
pub struct NotificationRouter {
    settings: SettingsStore,
    capabilities: PlatformCapabilities,
    surface: SharedSurface,
    native: NativeChannel,
    in_app: InAppChannel,
    platform_push: PlatformPushChannel,
}

impl NotificationRouter {
    pub fn new(
        settings: SettingsStore,
        capabilities: PlatformCapabilities,
        surface: SharedSurface,
    ) -> Self {
        let router = Self {
            settings,
            capabilities,
            native: NativeChannel::new(LogNotifier),
            in_app: InAppChannel::new(surface.clone()),
            platform_push: PlatformPushChannel::new(surface.clone(), NoHaptics),
            surface,
        };
        router.sync_blocked_banner();
        router
    }

    pub fn with_native_notifier(mut self, notifier: impl NativeNotifier + 'static) -> Self {
        self.native = NativeChannel::new(notifier);
        self
    }

    pub fn with_haptics(mut self, haptics: impl HapticFeedback + 'static) -> Self {
        self.platform_push = PlatformPushChannel::new(self.surface.clone(), haptics);
        self
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    /// Record a permission change, e.g. after the user answered the prompt.
    pub fn set_permission(&mut self, permission: Permission) {
        self.capabilities.permission = permission;
        self.sync_blocked_banner();
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    pub fn route(&mut self, event: &DomainEvent) -> Option<ChannelKind> {
        self.route_at(event, Instant::now())
    }

    /// Deliver one event; returns the channel used, or `None` when the
    /// user's settings filtered it out.
    pub fn route_at(&mut self, event: &DomainEvent, now: Instant) -> Option<ChannelKind> {
        let settings = self.settings.load();
        if !settings.allows(event.kind) {
            debug!(kind = %event.kind, player_id = %event.player_id, "event disabled in settings, dropped");
            return None;
        }

        let notification = Notification::from_event(event);
        let kind = select_channel(&self.capabilities, &settings);

        let channel = self.channel_mut(kind);
        let used = channel.kind();
        match channel.deliver(&notification, now) {
            Ok(()) => {
                debug!(kind = %event.kind, player_id = %event.player_id, channel = %used, "event routed");
                Some(used)
            }
            Err(e) if used == ChannelKind::Native => {
                warn!(error = %e, tag = %notification.tag, "native notification failed, falling back to in-app");
                match self.in_app.deliver(&notification, now) {
                    Ok(()) => Some(self.in_app.kind()),
                    Err(e) => {
                        warn!(error = %e, tag = %notification.tag, "in-app delivery failed");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, channel = %used, tag = %notification.tag, "notification delivery failed");
                None
            }
        }
    }

    /// Route a batch in order; returns how many were delivered.
    pub fn route_all(&mut self, events: &[DomainEvent]) -> usize {
        let now = Instant::now();
        events
            .iter()
            .filter(|e| self.route_at(e, now).is_some())
            .count()
    }

    fn channel_mut(&mut self, kind: ChannelKind) -> &mut dyn NotificationChannel {
        match kind {
            ChannelKind::Native => &mut self.native,
            ChannelKind::InApp => &mut self.in_app,
            ChannelKind::PlatformPush => &mut self.platform_push,
        }
    }

    fn sync_blocked_banner(&self) {
        let blocked = self.capabilities.permission == Permission::Denied;
        if let Ok(mut surface) = self.surface.lock() {
            surface.set_blocked_banner(blocked);
        }
    }
}

impl EventSink for NotificationRouter {
    fn deliver(&mut self, events: Vec<DomainEvent>) {
        self.route_all(&events);
    }
}

//! Unit tests for notification routing

use super::*;
use crate::{
    cli::types::PlayerId,
    engine::events::{EventKind, TrackedPlayer},
    error::{AlertError, Result},
    notify::{in_app::InAppNotificationSurface, settings::NotificationSettings},
    storage::MemoryStore,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

#[derive(Clone, Default)]
struct RecordingNotifier {
    shown: Arc<Mutex<Vec<Notification>>>,
    fail: bool,
}

impl NativeNotifier for RecordingNotifier {
    fn show(&mut self, notification: &Notification) -> Result<()> {
        if self.fail {
            return Err(AlertError::Delivery {
                message: "notification centre unavailable".to_string(),
            });
        }
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct CountingHaptics(Arc<AtomicUsize>);

impl HapticFeedback for CountingHaptics {
    fn pulse(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn goal() -> DomainEvent {
    let player = TrackedPlayer::new(PlayerId::new(7), "Son", "Spurs");
    DomainEvent::new(EventKind::Goal, &player, 1, 1_000)
}

fn settings_store(settings: NotificationSettings) -> SettingsStore {
    let mut store = SettingsStore::new(MemoryStore::new());
    store.save(&settings).unwrap();
    store
}

fn native_caps() -> PlatformCapabilities {
    PlatformCapabilities {
        native_supported: true,
        permission: Permission::Granted,
        ios_wrapper: false,
    }
}

fn native_preferred() -> NotificationSettings {
    NotificationSettings {
        use_in_app: false,
        ..NotificationSettings::default()
    }
}

#[cfg(test)]
mod routing_tests {
    use super::*;

    #[test]
    fn test_disabled_kind_is_not_dispatched_anywhere() {
        let surface = InAppNotificationSurface::shared();
        let notifier = RecordingNotifier::default();
        let settings = NotificationSettings {
            goals: false,
            ..native_preferred()
        };
        let mut router = NotificationRouter::new(settings_store(settings), native_caps(), surface.clone())
            .with_native_notifier(notifier.clone());

        assert_eq!(router.route(&goal()), None);
        assert!(notifier.shown.lock().unwrap().is_empty());
        assert!(surface.lock().unwrap().is_empty());
    }

    #[test]
    fn test_global_disable_drops_everything() {
        let surface = InAppNotificationSurface::shared();
        let settings = NotificationSettings {
            enabled: false,
            ..NotificationSettings::default()
        };
        let mut router = NotificationRouter::new(settings_store(settings), PlatformCapabilities::default(), surface.clone());

        assert_eq!(router.route(&goal()), None);
        assert!(surface.lock().unwrap().is_empty());
    }

    #[test]
    fn test_native_dispatch_with_tag() {
        let surface = InAppNotificationSurface::shared();
        let notifier = RecordingNotifier::default();
        let mut router = NotificationRouter::new(settings_store(native_preferred()), native_caps(), surface.clone())
            .with_native_notifier(notifier.clone());

        assert_eq!(router.route(&goal()), Some(ChannelKind::Native));

        let shown = notifier.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].tag, "goal-7-1000");
        assert!(surface.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_platform_routes_in_app() {
        let surface = InAppNotificationSurface::shared();
        let notifier = RecordingNotifier::default();
        let mut router = NotificationRouter::new(
            settings_store(native_preferred()),
            PlatformCapabilities::default(),
            surface.clone(),
        )
        .with_native_notifier(notifier.clone());

        assert_eq!(router.route(&goal()), Some(ChannelKind::InApp));
        assert!(notifier.shown.lock().unwrap().is_empty());
        assert_eq!(surface.lock().unwrap().rendered().len(), 1);
    }

    #[test]
    fn test_in_app_preference_wins_over_granted_native() {
        let surface = InAppNotificationSurface::shared();
        let mut router = NotificationRouter::new(
            settings_store(NotificationSettings::default()),
            native_caps(),
            surface.clone(),
        );

        assert_eq!(router.route(&goal()), Some(ChannelKind::InApp));
    }

    #[test]
    fn test_denied_permission_shows_banner_and_routes_in_app() {
        let surface = InAppNotificationSurface::shared();
        let caps = PlatformCapabilities {
            permission: Permission::Denied,
            ..native_caps()
        };
        let mut router = NotificationRouter::new(settings_store(native_preferred()), caps, surface.clone());

        assert!(surface.lock().unwrap().blocked_banner());
        assert_eq!(router.route(&goal()), Some(ChannelKind::InApp));

        router.set_permission(Permission::Granted);
        assert!(!surface.lock().unwrap().blocked_banner());
        assert_eq!(router.route(&goal()), Some(ChannelKind::Native));
    }

    #[test]
    fn test_ios_wrapper_pulses_and_shows_in_app() {
        let surface = InAppNotificationSurface::shared();
        let haptics = CountingHaptics::default();
        let caps = PlatformCapabilities {
            ios_wrapper: true,
            ..native_caps()
        };
        let mut router = NotificationRouter::new(settings_store(native_preferred()), caps, surface.clone())
            .with_haptics(haptics.clone());

        assert_eq!(router.route(&goal()), Some(ChannelKind::PlatformPush));
        assert_eq!(haptics.0.load(Ordering::SeqCst), 1);
        assert_eq!(surface.lock().unwrap().rendered().len(), 1);
    }

    #[test]
    fn test_native_failure_falls_back_to_in_app() {
        let surface = InAppNotificationSurface::shared();
        let notifier = RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        };
        let mut router = NotificationRouter::new(settings_store(native_preferred()), native_caps(), surface.clone())
            .with_native_notifier(notifier);

        assert_eq!(router.route(&goal()), Some(ChannelKind::InApp));
        assert_eq!(surface.lock().unwrap().rendered().len(), 1);
    }

    #[test]
    fn test_same_event_twice_is_delivered_twice() {
        let surface = InAppNotificationSurface::shared();
        let mut router = NotificationRouter::new(
            settings_store(NotificationSettings::default()),
            PlatformCapabilities::default(),
            surface.clone(),
        );

        let delivered = router.route_all(&[goal(), goal()]);

        assert_eq!(delivered, 2);
        assert_eq!(surface.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_settings_change_applies_to_next_route() {
        let surface = InAppNotificationSurface::shared();
        let mut router = NotificationRouter::new(
            settings_store(NotificationSettings::default()),
            PlatformCapabilities::default(),
            surface.clone(),
        );

        assert!(router.route(&goal()).is_some());
        router.settings_mut().set_kind(EventKind::Goal, false).unwrap();
        assert!(router.route(&goal()).is_none());
    }
}

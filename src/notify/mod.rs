//! Notification delivery: settings, channels, routing, the in-app surface
//! and the push subscription lifecycle.

pub mod channel;
pub mod in_app;
pub mod router;
pub mod settings;
pub mod subscription;

pub use channel::{ChannelKind, Notification, Permission, PlatformCapabilities};
pub use in_app::{InAppNotificationSurface, SharedSurface};
pub use router::NotificationRouter;
pub use settings::{ChannelPreference, NotificationSettings, SettingsStore};
pub use subscription::{FilePushPlatform, PushRegistry, PushSubscription, SubscriptionManager};

//! Push subscription lifecycle: opt-in, backend registration, opt-out.
//!
//! Nothing here returns an error to the caller. Every failure is logged and
//! reported as `None` / `false`, so the caller can fall back to in-app only.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::{
    core::{http::bearer_header_map, try_read_to_string},
    error::{AlertError, Result},
    notify::channel::Permission,
    storage::{KeyValueStore, SUBSCRIPTION_KEY},
};


/// Path of the notification worker script, relative to the assets root.
pub const WORKER_SCRIPT_PATH: &str = "sw.js";

pub const PUBLIC_KEY_PATH: &str = "/api/notifications/vapid-public-key";
pub const SUBSCRIBE_PATH: &str = "/api/notifications/subscribe";
pub const UNSUBSCRIBE_PATH: &str = "/api/notifications/unsubscribe";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Platform-issued push subscription handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<u64>,
    pub keys: SubscriptionKeys,
}

/// The host's push machinery: permission prompt, worker, subscription handle.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    /// Prompt for permission; returns the settled state without prompting
    /// when the user already decided.
    async fn request_permission(&self) -> Permission;
    async fn register_worker(&self, script_path: &str) -> Result<()>;
    async fn current_subscription(&self) -> Result<Option<PushSubscription>>;
    async fn create_subscription(&self, application_server_key: &str) -> Result<PushSubscription>;
    /// Returns whether a subscription existed.
    async fn remove_subscription(&self) -> Result<bool>;
}

/// Backend registry of push subscriptions.
#[derive(Debug, Clone)]
pub struct PushRegistry {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicKeyResponse {
    public_key: String,
}

impl PushRegistry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Server-supplied application server key for creating subscriptions.
    pub async fn public_key(&self) -> Result<String> {
        let res: PublicKeyResponse = self
            .client
            .get(format!("{}{}", self.base_url, PUBLIC_KEY_PATH))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(res.public_key)
    }

    pub async fn register(&self, token: &str, subscription: &PushSubscription) -> Result<()> {
        self.client
            .post(format!("{}{}", self.base_url, SUBSCRIBE_PATH))
            .headers(bearer_header_map(token)?)
            .json(&json!({ "subscription": subscription }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn revoke(&self, token: &str, endpoint: &str) -> Result<()> {
        self.client
            .post(format!("{}{}", self.base_url, UNSUBSCRIBE_PATH))
            .headers(bearer_header_map(token)?)
            .json(&json!({ "endpoint": endpoint }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

pub struct SubscriptionManager<P> {
    platform: P,
    registry: PushRegistry,
}

impl<P: PushPlatform> SubscriptionManager<P> {
    pub fn new(platform: P, registry: PushRegistry) -> Self {
        Self { platform, registry }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Opt in to push. `None` on any failure.
    pub async fn subscribe(&self, token: &str) -> Option<PushSubscription> {
        match self.try_subscribe(token).await {
            Ok(subscription) => {
                info!(endpoint = %subscription.endpoint, "push subscription registered");
                Some(subscription)
            }
            Err(e) => {
                warn!(error = %e, "push subscription failed");
                None
            }
        }
    }

    /// Opt out of push. `false` on any failure.
    pub async fn unsubscribe(&self, token: &str) -> bool {
        match self.try_unsubscribe(token).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "push unsubscribe failed");
                false
            }
        }
    }

    async fn try_subscribe(&self, token: &str) -> Result<PushSubscription> {
        if self.platform.request_permission().await != Permission::Granted {
            return Err(AlertError::PermissionDenied);
        }

        self.platform.register_worker(WORKER_SCRIPT_PATH).await?;

        let subscription = match self.platform.current_subscription().await? {
            Some(existing) => {
                debug!(endpoint = %existing.endpoint, "reusing existing push subscription");
                existing
            }
            None => {
                let key = self.registry.public_key().await?;
                self.platform.create_subscription(&key).await?
            }
        };

        self.registry.register(token, &subscription).await?;
        Ok(subscription)
    }

    async fn try_unsubscribe(&self, token: &str) -> Result<()> {
        let Some(subscription) = self.platform.current_subscription().await? else {
            debug!("no push subscription to remove");
            return Ok(());
        };

        self.registry.revoke(token, &subscription.endpoint).await?;
        self.platform.remove_subscription().await?;
        info!(endpoint = %subscription.endpoint, "push subscription removed");
        Ok(())
    }
}

/// Push platform for the command line.
///
/// The worker counts as registered when its script exists under the assets
/// directory. New subscriptions are read from a JSON file issued by the
/// device's push service, and the active one is kept in the key-value store.
pub struct FilePushPlatform {
    assets_dir: PathBuf,
    issued: Option<PathBuf>,
    permission: Permission,
    store: Mutex<Box<dyn KeyValueStore>>,
}

impl FilePushPlatform {
    pub fn new(
        assets_dir: impl Into<PathBuf>,
        issued: Option<PathBuf>,
        permission: Permission,
        store: impl KeyValueStore + 'static,
    ) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            issued,
            permission,
            store: Mutex::new(Box::new(store)),
        }
    }

    fn with_store<R>(&self, f: impl FnOnce(&mut dyn KeyValueStore) -> Result<R>) -> Result<R> {
        let mut store = self.store.lock().map_err(|_| AlertError::Subscription {
            message: "subscription store lock poisoned".to_string(),
        })?;
        f(store.as_mut())
    }
}

#[async_trait]
impl PushPlatform for FilePushPlatform {
    async fn request_permission(&self) -> Permission {
        self.permission
    }

    async fn register_worker(&self, script_path: &str) -> Result<()> {
        let path = self.assets_dir.join(script_path);
        if path.is_file() {
            Ok(())
        } else {
            Err(AlertError::WorkerUnavailable {
                path: path.display().to_string(),
            })
        }
    }

    async fn current_subscription(&self) -> Result<Option<PushSubscription>> {
        let raw = self.with_store(|s| s.get(SUBSCRIPTION_KEY))?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn create_subscription(&self, application_server_key: &str) -> Result<PushSubscription> {
        let path = self.issued.as_ref().ok_or_else(|| AlertError::Subscription {
            message: "no platform-issued subscription available".to_string(),
        })?;
        let raw = try_read_to_string(path).ok_or_else(|| AlertError::Subscription {
            message: format!("could not read {}", path.display()),
        })?;
        let subscription: PushSubscription = serde_json::from_str(&raw)?;
        debug!(key_len = application_server_key.len(), endpoint = %subscription.endpoint, "created push subscription");

        let stored = serde_json::to_string(&subscription)?;
        self.with_store(|s| s.set(SUBSCRIPTION_KEY, &stored))?;
        Ok(subscription)
    }

    async fn remove_subscription(&self) -> Result<bool> {
        self.with_store(|s| s.remove(SUBSCRIPTION_KEY))
    }
}

//! `subscribe` / `unsubscribe`

use std::path::PathBuf;

use crate::{
    config::AlertsConfig,
    notify::{FilePushPlatform, Permission, PushRegistry, SubscriptionManager},
    storage::SqliteStore,
    Result,
};

fn manager(
    config: &AlertsConfig,
    assets: PathBuf,
    issued: Option<PathBuf>,
) -> Result<SubscriptionManager<FilePushPlatform>> {
    let store = SqliteStore::open(&config.data_dir)?;
    // Running the command is the user's answer to the permission prompt.
    let platform = FilePushPlatform::new(assets, issued, Permission::Granted, store);
    Ok(SubscriptionManager::new(
        platform,
        PushRegistry::new(config.backend_url.as_str()),
    ))
}

pub async fn handle_subscribe(
    config: &AlertsConfig,
    subscription: Option<PathBuf>,
    assets: PathBuf,
) -> Result<()> {
    let token = config.require_token()?;
    let manager = manager(config, assets, subscription)?;

    match manager.subscribe(token).await {
        Some(subscription) => println!("✓ Push notifications enabled ({})", subscription.endpoint),
        None => println!("✗ Could not enable push notifications; alerts stay in-app"),
    }
    Ok(())
}

pub async fn handle_unsubscribe(config: &AlertsConfig, assets: PathBuf) -> Result<()> {
    let token = config.require_token()?;
    let manager = manager(config, assets, None)?;

    if manager.unsubscribe(token).await {
        println!("✓ Push notifications disabled");
    } else {
        println!("✗ Could not disable push notifications");
    }
    Ok(())
}

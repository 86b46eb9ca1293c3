//! Entry point: parse CLI, initialise logging and dispatch to command handlers.

use anyhow::Context;
use clap::Parser;
use fpl_live_alerts::{
    cli::{Commands, FplAlerts, LogArgs},
    commands::{
        settings::handle_settings,
        subscription::{handle_subscribe, handle_unsubscribe},
        watch::{handle_watch, WatchParams},
    },
    config::AlertsConfig,
};
use tracing::debug;

fn init_logging(log: &LogArgs) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.log_level));

    if log.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Run the CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = FplAlerts::parse();
    init_logging(&app.log);

    let config = AlertsConfig::resolve(&app.config).context("invalid configuration")?;
    debug!(
        api_url = %config.api_url,
        backend_url = %config.backend_url,
        data_dir = %config.data_dir.display(),
        "configuration resolved"
    );

    match app.command {
        Commands::Watch {
            gameweek,
            players,
            native,
            ios,
            once,
        } => handle_watch(
            &config,
            WatchParams {
                gameweek,
                players,
                native,
                ios,
                once,
            },
        )
        .await
        .context("watch failed")?,

        Commands::Settings { cmd } => {
            handle_settings(&config, cmd).context("could not update notification settings")?
        }

        Commands::Subscribe {
            subscription,
            assets,
        } => handle_subscribe(&config, subscription, assets).await?,

        Commands::Unsubscribe { assets } => handle_unsubscribe(&config, assets).await?,
    }

    Ok(())
}

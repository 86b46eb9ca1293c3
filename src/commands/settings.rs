//! `settings` subcommands

use crate::{
    cli::SettingsCmd,
    config::AlertsConfig,
    engine::EventKind,
    notify::{NotificationSettings, SettingsStore},
    storage::SqliteStore,
    Result,
};

pub fn handle_settings(config: &AlertsConfig, cmd: SettingsCmd) -> Result<()> {
    let mut store = SettingsStore::new(SqliteStore::open(&config.data_dir)?);
    let settings = apply_settings_cmd(&mut store, cmd)?;

    for line in format_settings(&settings) {
        println!("{}", line);
    }
    Ok(())
}

/// Apply one settings subcommand and return the resulting settings.
pub fn apply_settings_cmd(store: &mut SettingsStore, cmd: SettingsCmd) -> Result<NotificationSettings> {
    match cmd {
        SettingsCmd::Show => Ok(store.load()),
        SettingsCmd::Set { kind, state } => store.set_kind(kind, state.is_on()),
        SettingsCmd::Channel { channel } => store.set_channel(channel),
        SettingsCmd::Enable => store.set_enabled(true),
        SettingsCmd::Disable => store.set_enabled(false),
    }
}

pub fn format_settings(settings: &NotificationSettings) -> Vec<String> {
    let on_off = |on: bool| if on { "on" } else { "off" };

    let mut lines = vec![
        format!("Notifications: {}", on_off(settings.enabled)),
        format!(
            "Channel:       {}",
            if settings.use_in_app { "in-app" } else { "native" }
        ),
    ];
    lines.extend(
        EventKind::ALL
            .iter()
            .map(|kind| format!("  {:<15} {}", kind.as_str(), on_off(settings.is_kind_enabled(*kind)))),
    );
    lines
}

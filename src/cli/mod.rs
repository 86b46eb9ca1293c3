//! CLI argument definitions and parsing.

pub mod types;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use types::{GameweekId, PlayerId};

use crate::{engine::EventKind, notify::ChannelPreference};

/// Connection and storage options shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Live stats API base URL (or set `FPL_API_BASE_URL`).
    #[clap(long, global = true)]
    pub api_url: Option<String>,

    /// Notifications backend base URL (or set `FPL_ALERTS_BACKEND_URL`).
    #[clap(long, global = true)]
    pub backend_url: Option<String>,

    /// Bearer token for the notifications backend (or set `FPL_ALERTS_TOKEN`).
    #[clap(long, global = true)]
    pub token: Option<String>,

    /// Poll interval in milliseconds (or set `FPL_ALERTS_POLL_INTERVAL_MS`).
    #[clap(long, global = true)]
    pub interval_ms: Option<u64>,

    /// Directory for local settings and subscription state (or set `FPL_ALERTS_DATA_DIR`).
    #[clap(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

/// Logging options.
#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Log level used when `RUST_LOG` is not set.
    #[clap(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[clap(long, global = true)]
    pub log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Toggle::On
    }
}

#[derive(Debug, Subcommand)]
pub enum SettingsCmd {
    /// Print the current notification settings.
    Show,

    /// Turn one event kind on or off: `settings set goal off`.
    Set {
        /// Event kind (goal, assist, yellow_card, red_card, own_goal,
        /// penalty_saved, penalty_missed, substitution, bonus_points, match_end).
        kind: EventKind,

        #[clap(value_enum)]
        state: Toggle,
    },

    /// Choose the preferred delivery channel: `in-app` or `native`.
    Channel { channel: ChannelPreference },

    /// Turn all notifications on.
    Enable,

    /// Turn all notifications off.
    Disable,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Watch tracked players and print live alerts as they happen.
    ///
    /// The first poll only records baselines; alerts start from the second.
    Watch {
        /// Gameweek to watch.
        #[clap(long, short, default_value_t = GameweekId::default())]
        gameweek: GameweekId,

        /// Player to track (repeatable): `-p 355 -p 16`.
        #[clap(long = "player", short = 'p', required = true)]
        players: Vec<PlayerId>,

        /// Treat native notifications as supported and granted.
        #[clap(long)]
        native: bool,

        /// Behave as the iOS wrapper: in-app toast plus haptic feedback.
        #[clap(long)]
        ios: bool,

        /// Run two polls (baseline, then diff) and exit.
        #[clap(long)]
        once: bool,
    },

    /// Show or change notification settings.
    Settings {
        #[clap(subcommand)]
        cmd: SettingsCmd,
    },

    /// Opt in to push notifications and register with the backend.
    Subscribe {
        /// Subscription JSON issued by the device's push service.
        #[clap(long)]
        subscription: Option<PathBuf>,

        /// Directory holding the notification worker script.
        #[clap(long, default_value = ".")]
        assets: PathBuf,
    },

    /// Opt out of push notifications.
    Unsubscribe {
        /// Directory holding the notification worker script.
        #[clap(long, default_value = ".")]
        assets: PathBuf,
    },
}

#[derive(Debug, Parser)]
#[clap(name = "fpl-alerts", about = "Live Fantasy Premier League match alerts")]
pub struct FplAlerts {
    #[clap(flatten)]
    pub config: ConfigArgs,

    #[clap(flatten)]
    pub log: LogArgs,

    #[clap(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch() {
        let app = FplAlerts::try_parse_from([
            "fpl-alerts", "watch", "-g", "10", "-p", "355", "-p", "16", "--once",
        ])
        .unwrap();

        match app.command {
            Commands::Watch {
                gameweek,
                players,
                native,
                ios,
                once,
            } => {
                assert_eq!(gameweek, GameweekId::new(10));
                assert_eq!(players, vec![PlayerId::new(355), PlayerId::new(16)]);
                assert!(!native);
                assert!(!ios);
                assert!(once);
            }
            other => panic!("Expected Watch, got {other:?}"),
        }
    }

    #[test]
    fn test_watch_requires_players() {
        assert!(FplAlerts::try_parse_from(["fpl-alerts", "watch", "-g", "10"]).is_err());
    }

    #[test]
    fn test_parse_settings_set() {
        let app =
            FplAlerts::try_parse_from(["fpl-alerts", "settings", "set", "yellow-card", "off"]).unwrap();

        match app.command {
            Commands::Settings {
                cmd: SettingsCmd::Set { kind, state },
            } => {
                assert_eq!(kind, EventKind::YellowCard);
                assert!(!state.is_on());
            }
            other => panic!("Expected settings set, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_settings_rejects_unknown_kind() {
        assert!(FplAlerts::try_parse_from(["fpl-alerts", "settings", "set", "corner", "on"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let app = FplAlerts::try_parse_from([
            "fpl-alerts",
            "unsubscribe",
            "--token",
            "abc",
            "--log-json",
        ])
        .unwrap();

        assert_eq!(app.config.token.as_deref(), Some("abc"));
        assert!(app.log.log_json);
        assert_eq!(app.log.log_level, "info");
    }
}

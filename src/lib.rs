//! Live Fantasy Premier League match alerts
//!
//! Polls the live stats feed for a set of tracked players, turns stat
//! changes between polls into discrete match events and routes each one to
//! the user's preferred notification channel.
//!
//! ## Features
//!
//! - **Event detection**: goals, assists, cards, own goals, penalty saves and
//!   misses, substitutions, bonus points and full time, from consecutive
//!   stat snapshots
//! - **Single-flight polling**: overlapping polls are skipped, stop discards
//!   in-flight results, a gameweek switch resets baselines
//! - **Channel routing**: native, in-app toast, or the iOS wrapper's in-app
//!   plus haptic channel, filtered by persisted per-kind settings
//! - **Push opt-in**: subscription lifecycle against the notifications backend
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fpl_live_alerts::{
//!     engine::{PollScheduler, TrackedPlayer},
//!     fpl::HttpLiveStatsSource,
//!     notify::{InAppNotificationSurface, NotificationRouter, PlatformCapabilities, SettingsStore},
//!     storage::MemoryStore,
//!     GameweekId, PlayerId,
//! };
//! use std::time::Duration;
//!
//! # async fn example() -> fpl_live_alerts::Result<()> {
//! let source = HttpLiveStatsSource::new(fpl_live_alerts::fpl::FPL_BASE_URL)?;
//! let surface = InAppNotificationSurface::shared();
//! let router = NotificationRouter::new(
//!     SettingsStore::new(MemoryStore::new()),
//!     PlatformCapabilities::default(),
//!     surface.clone(),
//! );
//!
//! let scheduler = PollScheduler::new(source, router);
//! scheduler.start(
//!     vec![TrackedPlayer::new(PlayerId::new(355), "Salah", "Liverpool")],
//!     GameweekId::new(10),
//!     Duration::from_secs(60),
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! ```bash
//! export FPL_ALERTS_TOKEN=...             # backend bearer token
//! export FPL_ALERTS_POLL_INTERVAL_MS=30000
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod fpl;
pub mod notify;
pub mod storage;

// Re-export commonly used types
pub use cli::types::{FixtureId, GameweekId, PlayerId};
pub use engine::{DomainEvent, EventKind};
pub use error::{AlertError, Result};

pub const API_URL_ENV_VAR: &str = "FPL_API_BASE_URL";
pub const BACKEND_URL_ENV_VAR: &str = "FPL_ALERTS_BACKEND_URL";
pub const TOKEN_ENV_VAR: &str = "FPL_ALERTS_TOKEN";
pub const POLL_INTERVAL_ENV_VAR: &str = "FPL_ALERTS_POLL_INTERVAL_MS";
pub const DATA_DIR_ENV_VAR: &str = "FPL_ALERTS_DATA_DIR";

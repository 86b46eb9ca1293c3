//! `watch`: poll live stats and print alerts as they are routed.

use std::collections::HashSet;
use std::io::Write;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::{
    cli::types::{GameweekId, PlayerId},
    config::AlertsConfig,
    engine::{PollOutcome, PollScheduler},
    error::AlertError,
    fpl::{http::resolve_tracked_players, types::BootstrapStatic, HttpLiveStatsSource},
    notify::{
        channel::{HapticFeedback, NativeNotifier},
        in_app::{Toast, ToastId},
        InAppNotificationSurface, Notification, NotificationRouter, Permission,
        PlatformCapabilities, SettingsStore, SharedSurface,
    },
    storage::SqliteStore,
    Result,
};

/// How often the in-app surface is advanced and redrawn.
pub const RENDER_TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct WatchParams {
    pub gameweek: GameweekId,
    pub players: Vec<PlayerId>,
    pub native: bool,
    pub ios: bool,
    pub once: bool,
}

/// Native notifications for a terminal: a line on stdout.
#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl NativeNotifier for StdoutNotifier {
    fn show(&mut self, notification: &Notification) -> Result<()> {
        println!("🔔 {}: {}", notification.title, notification.body);
        Ok(())
    }
}

/// Haptics for a terminal: the bell.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl HapticFeedback for TerminalBell {
    fn pulse(&mut self) {
        print!("\x07");
        let _ = std::io::stdout().flush();
    }
}

pub fn capabilities_for(native: bool, ios: bool) -> PlatformCapabilities {
    PlatformCapabilities {
        native_supported: native,
        permission: if native {
            Permission::Granted
        } else {
            Permission::Default
        },
        ios_wrapper: ios,
    }
}

pub fn format_toast(toast: &Toast) -> String {
    format!("{}  {}", toast.notification.title, toast.notification.body)
}

/// Advance the surface and return lines for toasts that appeared since the last call.
pub fn render_new_toasts(
    surface: &SharedSurface,
    seen: &mut HashSet<ToastId>,
    now: Instant,
) -> Result<Vec<String>> {
    let mut surface = surface.lock().map_err(|_| AlertError::Delivery {
        message: "in-app surface lock poisoned".to_string(),
    })?;
    surface.tick(now);

    let mut lines = Vec::new();
    for toast in surface.rendered() {
        if seen.insert(toast.id) {
            lines.push(format_toast(toast));
        }
    }
    seen.retain(|id| surface.state_of(*id).is_some());
    Ok(lines)
}

fn print_new_toasts(surface: &SharedSurface, seen: &mut HashSet<ToastId>) -> Result<()> {
    for line in render_new_toasts(surface, seen, Instant::now())? {
        println!("{}", line);
    }
    Ok(())
}

pub async fn handle_watch(config: &AlertsConfig, params: WatchParams) -> Result<()> {
    let source = HttpLiveStatsSource::new(config.api_url.as_str())?;

    let players = match source.fetch_players(&params.players).await {
        Ok(players) => players,
        Err(e) => {
            warn!(error = %e, "could not resolve player names, using ids");
            resolve_tracked_players(&BootstrapStatic::default(), &params.players)
        }
    };

    let settings = SettingsStore::new(SqliteStore::open(&config.data_dir)?);
    let surface = InAppNotificationSurface::shared();
    let router = NotificationRouter::new(
        settings,
        capabilities_for(params.native, params.ios),
        surface.clone(),
    )
    .with_native_notifier(StdoutNotifier)
    .with_haptics(TerminalBell);
    let scheduler = PollScheduler::new(source, router);

    println!(
        "Watching {} player(s) in gameweek {}:",
        players.len(),
        params.gameweek
    );
    for player in &players {
        println!("  {} ({}) [{}]", player.name, player.team, player.id);
    }

    let mut seen = HashSet::new();

    if params.once {
        scheduler.track(players, params.gameweek);
        let baseline = scheduler.force_check().await;
        if baseline == PollOutcome::Failed {
            println!("✗ Live stats unavailable for gameweek {}", params.gameweek);
            return Ok(());
        }
        tokio::time::sleep(config.poll_interval).await;
        let outcome = scheduler.force_check().await;
        print_new_toasts(&surface, &mut seen)?;
        match outcome {
            PollOutcome::Completed { events } => println!("✓ {} alert(s)", events),
            other => println!("✗ Poll did not complete: {:?}", other),
        }
        scheduler.stop();
        return Ok(());
    }

    scheduler.start(players, params.gameweek, config.poll_interval);
    println!(
        "Polling every {}s; the first poll sets baselines. Ctrl-C to stop.",
        config.poll_interval.as_secs_f64()
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut render = tokio::time::interval(RENDER_TICK);
    loop {
        tokio::select! {
            _ = render.tick() => print_new_toasts(&surface, &mut seen)?,
            _ = &mut shutdown => break,
        }
    }

    scheduler.stop();
    println!("Stopped.");
    Ok(())
}

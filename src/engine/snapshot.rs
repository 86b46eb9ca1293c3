//! Per-player diff baselines for the current gameweek.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    cli::types::{GameweekId, PlayerId},
    engine::{
        detector::EventDetector,
        events::{DomainEvent, TrackedPlayer},
    },
    fpl::types::RawStats,
};

/// Last fully processed stats for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatsSnapshot {
    pub minutes: u32,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub bonus: u32,
    pub saves: u32,
    pub own_goals: u32,
    pub penalties_saved: u32,
    pub penalties_missed: u32,
    /// Set once a substitution has been inferred; minutes stay frozen afterwards.
    pub was_subbed_off: bool,
    pub match_finished: bool,
}

impl PlayerStatsSnapshot {
    /// Baseline taken straight from a first observation.
    pub fn baseline(current: &RawStats, match_finished: bool) -> Self {
        Self {
            minutes: current.minutes,
            goals: current.goals_scored,
            assists: current.assists,
            yellow_cards: current.yellow_cards,
            red_cards: current.red_cards,
            bonus: current.bonus,
            saves: current.saves,
            own_goals: current.own_goals,
            penalties_saved: current.penalties_saved,
            penalties_missed: current.penalties_missed,
            was_subbed_off: false,
            match_finished,
        }
    }
}

/// Owned map of `player -> snapshot`, scoped to one gameweek.
///
/// There is no global instance: each scheduler owns its own store so
/// separate sessions never share baselines.
#[derive(Debug, Default)]
pub struct StatsSnapshotStore {
    gameweek: Option<GameweekId>,
    snapshots: HashMap<PlayerId, PlayerStatsSnapshot>,
}

impl StatsSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gameweek(&self) -> Option<GameweekId> {
        self.gameweek
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&PlayerStatsSnapshot> {
        self.snapshots.get(&player_id)
    }

    /// Replace a player's snapshot wholesale.
    pub fn commit(&mut self, player_id: PlayerId, snapshot: PlayerStatsSnapshot) {
        self.snapshots.insert(player_id, snapshot);
    }

    /// Diff `current` against the stored baseline and commit the result in the same call.
    pub fn observe(
        &mut self,
        detector: &EventDetector,
        player: &TrackedPlayer,
        current: &RawStats,
        match_finished: bool,
        observed_at: u64,
    ) -> Vec<DomainEvent> {
        let detection = detector.detect(
            player,
            self.snapshots.get(&player.id),
            current,
            match_finished,
            observed_at,
        );
        self.commit(player.id, detection.snapshot);
        detection.events
    }

    /// Drop every snapshot. The next observation of any player is a first observation.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Bind the store to `gameweek`, clearing it if it held a different one.
    ///
    /// Returns `true` when snapshots were discarded.
    pub fn reset_for(&mut self, gameweek: GameweekId) -> bool {
        if self.gameweek == Some(gameweek) {
            return false;
        }
        let had_snapshots = !self.snapshots.is_empty();
        if let Some(previous) = self.gameweek {
            info!(from = %previous, to = %gameweek, dropped = self.snapshots.len(), "gameweek changed, clearing snapshots");
        }
        self.clear();
        self.gameweek = Some(gameweek);
        had_snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

//! Domain events derived from consecutive stat snapshots.

use crate::cli::types::PlayerId;
use crate::error::AlertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of in-match occurrence.
///
/// The tag used for notification deduplication is built from the
/// lowercase name returned by [`EventKind::as_str`], so those strings are
/// part of the external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Goal,
    Assist,
    YellowCard,
    RedCard,
    OwnGoal,
    PenaltySaved,
    PenaltyMissed,
    Substitution,
    BonusPoints,
    MatchEnd,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::Goal,
        EventKind::Assist,
        EventKind::YellowCard,
        EventKind::RedCard,
        EventKind::OwnGoal,
        EventKind::PenaltySaved,
        EventKind::PenaltyMissed,
        EventKind::Substitution,
        EventKind::BonusPoints,
        EventKind::MatchEnd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Goal => "goal",
            EventKind::Assist => "assist",
            EventKind::YellowCard => "yellow_card",
            EventKind::RedCard => "red_card",
            EventKind::OwnGoal => "own_goal",
            EventKind::PenaltySaved => "penalty_saved",
            EventKind::PenaltyMissed => "penalty_missed",
            EventKind::Substitution => "substitution",
            EventKind::BonusPoints => "bonus_points",
            EventKind::MatchEnd => "match_end",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "goal" | "goals" => Ok(EventKind::Goal),
            "assist" | "assists" => Ok(EventKind::Assist),
            "yellow_card" | "yellow_cards" | "yellow" => Ok(EventKind::YellowCard),
            "red_card" | "red_cards" | "red" => Ok(EventKind::RedCard),
            "own_goal" | "own_goals" => Ok(EventKind::OwnGoal),
            "penalty_saved" | "penalty_saves" => Ok(EventKind::PenaltySaved),
            "penalty_missed" | "penalty_misses" => Ok(EventKind::PenaltyMissed),
            "substitution" | "substitutions" | "sub" => Ok(EventKind::Substitution),
            "bonus_points" | "bonus" => Ok(EventKind::BonusPoints),
            "match_end" | "full_time" => Ok(EventKind::MatchEnd),
            _ => Err(AlertError::InvalidEventKind {
                kind: s.to_string(),
            }),
        }
    }
}

/// A player the user is following, with the display names events carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedPlayer {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
}

impl TrackedPlayer {
    pub fn new(id: PlayerId, name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            team: team.into(),
        }
    }
}

/// Immutable record of one detected occurrence. Consumed once by the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub kind: EventKind,
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_name: String,
    /// Units this event stands for: 1 for counted events, the bonus
    /// awarded for `BonusPoints`, minutes played for `Substitution` and
    /// `MatchEnd`.
    pub magnitude: u32,
    /// Unix milliseconds of the poll that observed it.
    pub timestamp: u64,
}

impl DomainEvent {
    pub fn new(kind: EventKind, player: &TrackedPlayer, magnitude: u32, timestamp: u64) -> Self {
        Self {
            kind,
            player_id: player.id,
            player_name: player.name.clone(),
            team_name: player.team.clone(),
            magnitude,
            timestamp,
        }
    }
}

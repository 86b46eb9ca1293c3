//! Stat diffing: turns two consecutive observations into domain events.

use crate::{
    engine::{
        events::{DomainEvent, EventKind, TrackedPlayer},
        snapshot::PlayerStatsSnapshot,
    },
    fpl::types::RawStats,
};


/// Minutes in a full match; a frozen clock at or past this is just full time.
pub const FULL_MATCH_MINUTES: u32 = 90;

/// Decides whether a player has left the pitch.
///
/// The live feed has no explicit "subbed" field, so this is inferred. Swap
/// the rule out if the feed ever grows one.
pub trait SubstitutionRule: Send + Sync {
    fn is_substituted(
        &self,
        previous: &PlayerStatsSnapshot,
        current: &RawStats,
        match_finished: bool,
    ) -> bool;
}

impl<F> SubstitutionRule for F
where
    F: Fn(&PlayerStatsSnapshot, &RawStats, bool) -> bool + Send + Sync,
{
    fn is_substituted(
        &self,
        previous: &PlayerStatsSnapshot,
        current: &RawStats,
        match_finished: bool,
    ) -> bool {
        self(previous, current, match_finished)
    }
}

/// Infers a substitution from minutes that stopped advancing mid-match.
///
/// Fires when the match is still live, the player had played some but not
/// all of the match, their minutes did not move since the last poll, they
/// were not sent off, and nothing else in their line changed this cycle.
/// A goal or card in the same cycle means they were still on the pitch.
///
/// Known blind spot: a poll landing in the half-time break sees minutes
/// frozen at 45.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrozenMinutesRule;

impl SubstitutionRule for FrozenMinutesRule {
    fn is_substituted(
        &self,
        previous: &PlayerStatsSnapshot,
        current: &RawStats,
        match_finished: bool,
    ) -> bool {
        !match_finished
            && previous.minutes > 0
            && previous.minutes < FULL_MATCH_MINUTES
            && current.minutes == previous.minutes
            && !previous.was_subbed_off
            && current.red_cards == 0
            && !on_pitch_activity(previous, current)
    }
}

/// Any counter that only moves while the player is on the pitch went up.
fn on_pitch_activity(previous: &PlayerStatsSnapshot, current: &RawStats) -> bool {
    current.goals_scored > previous.goals
        || current.assists > previous.assists
        || current.yellow_cards > previous.yellow_cards
        || current.own_goals > previous.own_goals
        || current.saves > previous.saves
        || current.penalties_saved > previous.penalties_saved
        || current.penalties_missed > previous.penalties_missed
}

/// Result of one diff: the events to route and the snapshot to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub events: Vec<DomainEvent>,
    pub snapshot: PlayerStatsSnapshot,
}

/// Pure differ between a stored snapshot and freshly fetched stats.
pub struct EventDetector {
    substitution: Box<dyn SubstitutionRule>,
}

impl Default for EventDetector {
    fn default() -> Self {
        Self::new(FrozenMinutesRule)
    }
}

impl EventDetector {
    pub fn new(rule: impl SubstitutionRule + 'static) -> Self {
        Self {
            substitution: Box::new(rule),
        }
    }

    /// Diff `current` against `previous`.
    ///
    /// A `None` baseline is a first observation: it yields no events, so
    /// starting to track a player mid-match never replays what already
    /// happened. Counters that went down are ignored, and the committed
    /// snapshot keeps the highest value seen so a withdrawn then restored
    /// stat is not announced twice.
    pub fn detect(
        &self,
        player: &TrackedPlayer,
        previous: Option<&PlayerStatsSnapshot>,
        current: &RawStats,
        match_finished: bool,
        observed_at: u64,
    ) -> Detection {
        let Some(prev) = previous else {
            return Detection {
                events: Vec::new(),
                snapshot: PlayerStatsSnapshot::baseline(current, match_finished),
            };
        };

        let mut events = Vec::new();
        let mut emit = |kind: EventKind, magnitude: u32| {
            events.push(DomainEvent::new(kind, player, magnitude, observed_at));
        };

        for _ in 0..delta(prev.goals, current.goals_scored) {
            emit(EventKind::Goal, 1);
        }
        for _ in 0..delta(prev.assists, current.assists) {
            emit(EventKind::Assist, 1);
        }
        // A second yellow arrives together with the red; announce the booking once.
        if delta(prev.yellow_cards, current.yellow_cards) > 0 {
            emit(EventKind::YellowCard, 1);
        }
        for _ in 0..delta(prev.red_cards, current.red_cards) {
            emit(EventKind::RedCard, 1);
        }
        for _ in 0..delta(prev.own_goals, current.own_goals) {
            emit(EventKind::OwnGoal, 1);
        }
        for _ in 0..delta(prev.penalties_saved, current.penalties_saved) {
            emit(EventKind::PenaltySaved, 1);
        }
        for _ in 0..delta(prev.penalties_missed, current.penalties_missed) {
            emit(EventKind::PenaltyMissed, 1);
        }

        let subbed_now =
            !prev.was_subbed_off && self.substitution.is_substituted(prev, current, match_finished);
        if subbed_now {
            emit(EventKind::Substitution, prev.minutes);
        }

        let bonus = delta(prev.bonus, current.bonus);
        if bonus > 0 {
            emit(EventKind::BonusPoints, bonus);
        }

        let minutes = prev.minutes.max(current.minutes);
        if match_finished && !prev.match_finished && minutes > 0 {
            emit(EventKind::MatchEnd, minutes);
        }

        let snapshot = PlayerStatsSnapshot {
            minutes,
            goals: prev.goals.max(current.goals_scored),
            assists: prev.assists.max(current.assists),
            yellow_cards: prev.yellow_cards.max(current.yellow_cards),
            red_cards: prev.red_cards.max(current.red_cards),
            bonus: prev.bonus.max(current.bonus),
            saves: prev.saves.max(current.saves),
            own_goals: prev.own_goals.max(current.own_goals),
            penalties_saved: prev.penalties_saved.max(current.penalties_saved),
            penalties_missed: prev.penalties_missed.max(current.penalties_missed),
            was_subbed_off: prev.was_subbed_off || subbed_now,
            match_finished: prev.match_finished || match_finished,
        };

        Detection { events, snapshot }
    }
}

/// Non-negative difference; a decrease is a data anomaly and counts as zero.
fn delta(previous: u32, current: u32) -> u32 {
    current.saturating_sub(previous)
}

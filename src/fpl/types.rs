use crate::cli::types::{FixtureId, PlayerId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::warn;


/// Any missing, null, negative or non-numeric counter reads as zero.
fn de_lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v.min(u32::MAX as u64) as u32)
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u32))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn de_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Live per-player counters for the current gameweek.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawStats {
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub minutes: u32,
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub goals_scored: u32,
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub assists: u32,
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub yellow_cards: u32,
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub red_cards: u32,
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub bonus: u32,
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub saves: u32,
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub own_goals: u32,
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub penalties_saved: u32,
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub penalties_missed: u32,
}

/// Per-fixture breakdown; only the fixture id is needed here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExplainEntry {
    pub fixture: FixtureId,
}

/// One element of the `/event/{gw}/live/` list form.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LiveElement {
    pub id: PlayerId,
    #[serde(default, deserialize_with = "de_null_default")]
    pub stats: RawStats,
    #[serde(default, deserialize_with = "de_null_default")]
    pub explain: Vec<ExplainEntry>,
}

/// Same record keyed by element id instead of carrying it inline.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyedLiveElement {
    #[serde(default, deserialize_with = "de_null_default")]
    pub stats: RawStats,
    #[serde(default, deserialize_with = "de_null_default")]
    pub explain: Vec<ExplainEntry>,
}

/// The live endpoint has been seen in two shapes:
/// - list: `{"elements": [{"id": 1, "stats": {...}}]}`
/// - map: `{"1": {"stats": {...}}}`
///
/// Elements stay as raw values so one malformed record cannot sink the batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LivePayload {
    List { elements: Vec<Value> },
    Map(HashMap<String, Value>),
}

/// A fixture row from `/fixtures/?event={gw}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Fixture {
    pub id: FixtureId,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub finished_provisional: bool,
}

impl Fixture {
    pub fn is_finished(&self) -> bool {
        self.finished || self.finished_provisional
    }
}

/// Stats for one player in the batch, with the fixtures they featured in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivePlayerStats {
    pub stats: RawStats,
    pub fixtures: Vec<FixtureId>,
}

impl LivePlayerStats {
    fn from_parts(stats: RawStats, explain: &[ExplainEntry]) -> Self {
        let mut fixtures: Vec<FixtureId> = Vec::with_capacity(explain.len());
        for entry in explain {
            if !fixtures.contains(&entry.fixture) {
                fixtures.push(entry.fixture);
            }
        }
        Self { stats, fixtures }
    }
}

/// One batch snapshot of the whole gameweek.
#[derive(Debug, Clone, Default)]
pub struct LiveGameweek {
    pub players: HashMap<PlayerId, LivePlayerStats>,
    pub finished_fixtures: HashSet<FixtureId>,
}

impl LiveGameweek {
    pub fn stats_for(&self, player_id: PlayerId) -> Option<&LivePlayerStats> {
        self.players.get(&player_id)
    }

    /// Build a batch from the live payload and the gameweek's fixtures.
    ///
    /// Elements that fail to parse are logged and skipped.
    pub fn from_payload(payload: LivePayload, fixtures: &[Fixture]) -> Self {
        let mut players = HashMap::new();

        match payload {
            LivePayload::List { elements } => {
                for raw in elements {
                    match serde_json::from_value::<LiveElement>(raw) {
                        Ok(element) => {
                            players.insert(element.id, LivePlayerStats::from_parts(element.stats, &element.explain));
                        }
                        Err(e) => warn!(error = %e, "skipping malformed live element"),
                    }
                }
            }
            LivePayload::Map(entries) => {
                for (key, raw) in entries {
                    let Ok(id) = key.parse::<PlayerId>() else {
                        warn!(key = %key, "skipping live element with non-numeric id");
                        continue;
                    };
                    match serde_json::from_value::<KeyedLiveElement>(raw) {
                        Ok(element) => {
                            players.insert(id, LivePlayerStats::from_parts(element.stats, &element.explain));
                        }
                        Err(e) => warn!(player_id = %id, error = %e, "skipping malformed live element"),
                    }
                }
            }
        }

        let finished_fixtures = fixtures
            .iter()
            .filter(|f| f.is_finished())
            .map(|f| f.id)
            .collect();

        Self {
            players,
            finished_fixtures,
        }
    }

    /// A player's match is over once every fixture they featured in has finished.
    /// Players with no fixture (blank gameweek) are never considered finished.
    pub fn is_match_finished(&self, player_id: PlayerId) -> bool {
        match self.players.get(&player_id) {
            Some(p) if !p.fixtures.is_empty() => p
                .fixtures
                .iter()
                .all(|f| self.finished_fixtures.contains(f)),
            _ => false,
        }
    }
}

/// Subset of `/bootstrap-static/` used to resolve display names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapStatic {
    #[serde(default)]
    pub elements: Vec<BootstrapElement>,
    #[serde(default)]
    pub teams: Vec<BootstrapTeam>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapElement {
    pub id: PlayerId,
    #[serde(default)]
    pub web_name: String,
    pub team: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapTeam {
    pub id: u32,
    pub name: String,
}

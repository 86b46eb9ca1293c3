//! HTTP access to the live FPL endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::{
    cli::types::{GameweekId, PlayerId},
    engine::events::TrackedPlayer,
    error::{AlertError, Result},
    fpl::types::{BootstrapStatic, Fixture, LiveGameweek, LivePayload},
};


/// Base path for the public FPL API.
pub const FPL_BASE_URL: &str = "https://fantasy.premierleague.com/api";

const USER_AGENT: &str = concat!("fpl-live-alerts/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout for the FPL API client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the scheduler gets its batch of live stats from.
#[async_trait]
pub trait LiveStatsSource: Send + Sync {
    /// Fetch one snapshot of live stats for the whole gameweek.
    async fn fetch_live(&self, gameweek: GameweekId) -> Result<LiveGameweek>;
}

/// Live stats source backed by the FPL REST API.
#[derive(Debug, Clone)]
pub struct HttpLiveStatsSource {
    client: Client,
    base_url: String,
}

impl HttpLiveStatsSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let v = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(v)
    }

    /// Resolve display names and team names for the given player ids.
    ///
    /// Ids missing from `/bootstrap-static/` are returned with their id as the
    /// name so they can still be tracked.
    pub async fn fetch_players(&self, ids: &[PlayerId]) -> Result<Vec<TrackedPlayer>> {
        let raw = self.get_json("/bootstrap-static/", &[]).await?;
        let bootstrap: BootstrapStatic = serde_json::from_value(raw)?;
        Ok(resolve_tracked_players(&bootstrap, ids))
    }
}

#[async_trait]
impl LiveStatsSource for HttpLiveStatsSource {
    async fn fetch_live(&self, gameweek: GameweekId) -> Result<LiveGameweek> {
        let live_raw = self
            .get_json(&format!("/event/{}/live/", gameweek.as_u16()), &[])
            .await?;
        if live_raw.is_null() {
            return Err(AlertError::NoData);
        }
        let payload: LivePayload = serde_json::from_value(live_raw)?;

        let fixtures_raw = self
            .get_json("/fixtures/", &[("event", gameweek.as_u16().to_string())])
            .await?;
        let fixtures: Vec<Fixture> = serde_json::from_value(fixtures_raw)?;

        Ok(LiveGameweek::from_payload(payload, &fixtures))
    }
}

/// Join bootstrap elements with their team names, in the order of `ids`.
pub fn resolve_tracked_players(bootstrap: &BootstrapStatic, ids: &[PlayerId]) -> Vec<TrackedPlayer> {
    let teams: HashMap<u32, &str> = bootstrap
        .teams
        .iter()
        .map(|t| (t.id, t.name.as_str()))
        .collect();
    let elements: HashMap<PlayerId, _> = bootstrap.elements.iter().map(|e| (e.id, e)).collect();

    ids.iter()
        .map(|id| match elements.get(id) {
            Some(e) => TrackedPlayer::new(
                *id,
                e.web_name.clone(),
                teams.get(&e.team).copied().unwrap_or("Unknown"),
            ),
            None => TrackedPlayer::new(*id, format!("Player {}", id), "Unknown"),
        })
        .collect()
}

//! Fantasy Premier League live data: wire types and the HTTP source.

pub mod http;
pub mod types;

pub use http::{HttpLiveStatsSource, LiveStatsSource, FPL_BASE_URL};
pub use types::{LiveGameweek, LivePlayerStats, RawStats};

//! Type-safe wrappers for FPL identifiers.

pub mod ids;
pub mod time;

pub use ids::{FixtureId, PlayerId};
pub use time::GameweekId;

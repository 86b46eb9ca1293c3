//! Live event engine: snapshots, diffing and the polling loop.

pub mod detector;
pub mod events;
pub mod scheduler;
pub mod snapshot;

pub use detector::{Detection, EventDetector, FrozenMinutesRule, SubstitutionRule};
pub use events::{DomainEvent, EventKind, TrackedPlayer};
pub use scheduler::{EventSink, PollOutcome, PollScheduler, DEFAULT_FETCH_TIMEOUT, DEFAULT_POLL_INTERVAL};
pub use snapshot::{PlayerStatsSnapshot, StatsSnapshotStore};

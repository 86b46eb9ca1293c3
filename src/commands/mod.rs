//! Command implementations for the fpl-alerts CLI

pub mod settings;
pub mod subscription;
pub mod watch;

//! Core utilities shared across the application:
//! - `fs`: data directory and small file helpers
//! - `http`: header construction for the notifications backend

pub mod fs;
pub mod http;

pub use fs::{default_data_dir, try_read_to_string};
pub use http::bearer_header_map;

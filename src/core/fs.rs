//! File system helpers

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

/// Directory name under the user cache dir.
pub const APP_DIR_NAME: &str = "fpl-live-alerts";

/// Path: ~/.cache/fpl-live-alerts
pub fn default_data_dir() -> PathBuf {
    let base = dirs::cache_dir().unwrap_or_else(|| {
        let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.push(".cache");
        home
    });
    base.join(APP_DIR_NAME)
}

/// Try to read a file into a String
pub fn try_read_to_string(path: &Path) -> Option<String> {
    let mut f = fs::File::open(path).ok()?;
    let mut s = String::new();

    f.read_to_string(&mut s).ok()?;

    Some(s)
}

//! Infrastructure implementations for Confab.
//!
//! SQLite-backed repositories (conversation store, keyword index), the
//! HTTP completion client, and configuration loading. Everything here
//! implements a port trait from `confab-core`.

pub mod completion;
pub mod config;
pub mod sqlite;

use std::path::PathBuf;

/// Resolve the data directory: `$CONFAB_DATA_DIR`, else `~/.confab`.
pub fn resolve_data_dir() -> PathBuf {
    match std::env::var("CONFAB_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".confab"),
    }
}

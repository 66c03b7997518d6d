//! Centralized path helpers for config and data directories.

use std::env;
use std::path::PathBuf;

use crate::core::app;

/// Env var overriding the data directory (tests, portable installs).
pub const DATA_DIR_ENV: &str = "PROOF_PAGER_DATA_DIR";

/// Project directories (config, cache, data) from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Config directory (~/.config/proof-pager/).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Data directory for stored proofs (~/.local/share/proof-pager/proofs/).
/// `PROOF_PAGER_DATA_DIR` replaces the platform data directory when set.
pub fn data_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var(DATA_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Some(PathBuf::from(dir).join("proofs"));
    }
    project_dirs().map(|d| d.data_dir().join("proofs"))
}

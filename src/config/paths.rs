//! Configuration path resolution
//!
//! Checks the KEXPORT_CONFIG_DIR environment variable first, then falls
//! back to the platform config directory (XDG on Unix, AppData on Windows).

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    std::env::var("KEXPORT_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            ProjectDirs::from("", "", "kexport")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".").join(".config").join("kexport"))
        })
}

/// Path of the config file itself
pub fn config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

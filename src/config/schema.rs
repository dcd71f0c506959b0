//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Upper bound on concurrently processed workloads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Export root directory; a timestamped directory is generated when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Run helmify over each workload directory after export
    #[serde(default)]
    pub helmify: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            output_dir: None,
            helmify: false,
        }
    }
}

fn default_workers() -> usize {
    10
}

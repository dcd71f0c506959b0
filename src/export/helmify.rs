//! Optional chart packaging
//!
//! Runs the external `helmify` binary over a workload's export directory.
//! Fire-and-forget per workload: a failure is reported for that workload
//! and the rest of the run proceeds.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tokio::process::Command;

/// Package one workload directory into `{dir}-helmified`
pub async fn helmify_dir(dir: &Path) -> Result<()> {
    let output_dir = dir.with_file_name(format!(
        "{}-helmified",
        dir.file_name().and_then(|n| n.to_str()).unwrap_or("chart")
    ));
    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    tracing::info!("running helmify for {}", dir.display());
    let status = Command::new("helmify")
        .arg("-f")
        .arg(dir)
        .arg(&output_dir)
        .status()
        .await
        .context("failed to spawn helmify (is it installed?)")?;

    if !status.success() {
        bail!("helmify exited with {}", status);
    }
    Ok(())
}

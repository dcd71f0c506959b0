//! Export layout
//!
//! Grouped mode writes one directory per workload with one file per
//! resource; flat mode writes one multi-document file per type at the
//! export root plus the namespace definition. Individual write failures are
//! logged and skipped; they never abort the run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::export::sanitize::sanitize;
use crate::group::WorkloadGroup;
use crate::group::classify::classify;
use crate::kube::store::ResourceStore;
use crate::models::{ResourceRef, ResourceType};

/// Default export root: `{namespace}-grouped-{timestamp}` (grouped) or
/// `{namespace}-export-{timestamp}` (flat)
pub fn default_export_root(namespace: &str, flat: bool) -> PathBuf {
    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let mode = if flat { "export" } else { "grouped" };
    PathBuf::from(format!("{}-{}-{}", namespace, mode, stamp))
}

/// Directory a workload's files land in
pub fn group_dir(root: &Path, group: &WorkloadGroup) -> PathBuf {
    root.join(&group.workload.name)
}

/// Write every member of a group as `{type}-{name}.yaml` under the
/// workload's directory. Returns the number of files written.
pub fn write_group(root: &Path, group: &WorkloadGroup, store: &ResourceStore) -> Result<usize> {
    let dir = group_dir(root, group);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut written = 0;
    for member in &group.members {
        let Some(obj) = store.get(member) else {
            tracing::warn!("{} vanished from store before export", member);
            continue;
        };
        let Some(cleaned) = sanitize(obj) else {
            tracing::debug!("{} had no content after cleaning; dropped", member);
            continue;
        };
        let path = dir.join(member_file_name(member));
        match write_manifest(&path, &cleaned) {
            Ok(()) => written += 1,
            Err(e) => tracing::warn!("could not write {}: {}", path.display(), e),
        }
    }
    Ok(written)
}

/// Flat layout: one multi-document file per type containing every unmanaged
/// object of that type, plus the namespace definition. Returns the number
/// of files written.
pub fn write_flat(root: &Path, store: &ResourceStore) -> Result<usize> {
    fs::create_dir_all(root).with_context(|| format!("failed to create {}", root.display()))?;

    let mut written = 0;

    if let Some(ns) = sanitize(store.namespace_manifest()) {
        let path = root.join("namespace.yaml");
        match write_manifest(&path, &ns) {
            Ok(()) => written += 1,
            Err(e) => tracing::warn!("could not write {}: {}", path.display(), e),
        }
    }

    for rt in ResourceType::namespaced() {
        let mut docs = Vec::new();
        for (name, obj) in store.of_type(rt.as_str()) {
            if classify(rt.as_str(), obj).managed {
                continue;
            }
            match sanitize(obj) {
                Some(cleaned) => match serde_yaml::to_string(&cleaned) {
                    Ok(doc) => docs.push(doc),
                    Err(e) => {
                        tracing::warn!("could not serialize {}/{}: {}", rt, name, e)
                    }
                },
                None => tracing::debug!("{}/{} had no content after cleaning", rt, name),
            }
        }
        if docs.is_empty() {
            continue;
        }
        let path = root.join(format!("{}.yaml", rt));
        match fs::write(&path, docs.join("---\n")) {
            Ok(()) => written += 1,
            Err(e) => tracing::warn!("could not write {}: {}", path.display(), e),
        }
    }

    Ok(written)
}

fn write_manifest(path: &Path, obj: &serde_json::Value) -> Result<()> {
    let yaml = serde_yaml::to_string(obj)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    fs::write(path, yaml).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// File name a member would be written to within its group directory
pub fn member_file_name(member: &ResourceRef) -> String {
    format!("{}-{}.yaml", member.resource_type, member.name)
}

//! Export orchestration
//!
//! Iterates the unmanaged workloads in a store snapshot, builds each one's
//! group on a bounded worker pool, hands finished groups to the writer, and
//! reports a run summary. Workloads are independent, so the pool size only
//! bounds concurrent output; it has no correctness effect.

pub mod helmify;
pub mod sanitize;
pub mod writer;

pub use sanitize::sanitize;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use futures::{StreamExt, stream};

use crate::group::classify::classify;
use crate::group::{WorkloadGroup, build_group};
use crate::kube::store::ResourceStore;
use crate::models::{ResourceRef, ResourceType};

/// Tunables for one export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Build groups and print the summary without writing anything
    pub dry_run: bool,
    /// One file per type at the root instead of per-workload directories
    pub flat: bool,
    /// Upper bound on concurrently processed workloads
    pub workers: usize,
    /// Run helmify over each workload directory after writing it
    pub helmify: bool,
    /// Export root directory
    pub output: PathBuf,
}

/// Outcome for one workload's pipeline
#[derive(Debug)]
pub struct GroupReport {
    pub group: WorkloadGroup,
    pub written: usize,
    pub write_error: Option<String>,
    pub helmify_error: Option<String>,
}

/// Outcome of a grouped export run
#[derive(Debug)]
pub struct ExportSummary {
    /// Reports in workload order
    pub groups: Vec<GroupReport>,
    /// Members appearing in more than one group, with their group count
    pub shared: BTreeMap<ResourceRef, usize>,
}

/// Outcome of a flat export run
#[derive(Debug)]
pub struct FlatReport {
    /// Unmanaged objects per type
    pub counts: BTreeMap<&'static str, usize>,
    pub files: usize,
}

/// The workloads a grouped run processes: every workload-type object in the
/// snapshot the classifier leaves unmanaged, in deterministic order.
pub fn unmanaged_workloads(store: &ResourceStore) -> Vec<(ResourceType, String)> {
    let mut workloads = Vec::new();
    for rt in ResourceType::workloads() {
        for (name, obj) in store.of_type(rt.as_str()) {
            let verdict = classify(rt.as_str(), obj);
            if verdict.managed {
                tracing::debug!("skipping managed workload {}/{} ({:?})", rt, name, verdict.reason);
                continue;
            }
            workloads.push((*rt, name.clone()));
        }
    }
    workloads
}

/// Run a grouped export: build, write, and optionally package each
/// unmanaged workload's group concurrently, then assemble the summary.
pub async fn export_grouped(store: Arc<ResourceStore>, opts: &ExportOptions) -> ExportSummary {
    let workloads = unmanaged_workloads(&store);
    tracing::info!(
        "processing {} unmanaged workloads in {}",
        workloads.len(),
        store.namespace()
    );

    let mut reports: Vec<GroupReport> = stream::iter(workloads)
        .map(|(rt, name)| {
            let store = Arc::clone(&store);
            let opts = opts.clone();
            async move { process_workload(rt, &name, &store, &opts).await }
        })
        .buffer_unordered(opts.workers.max(1))
        .collect()
        .await;

    reports.sort_by(|a, b| a.group.workload.cmp(&b.group.workload));
    let shared = shared_members(&reports);
    ExportSummary {
        groups: reports,
        shared,
    }
}

async fn process_workload(
    resource_type: ResourceType,
    name: &str,
    store: &ResourceStore,
    opts: &ExportOptions,
) -> GroupReport {
    let group = build_group(resource_type, name, store);
    let mut report = GroupReport {
        group,
        written: 0,
        write_error: None,
        helmify_error: None,
    };

    if opts.dry_run {
        return report;
    }

    match writer::write_group(&opts.output, &report.group, store) {
        Ok(written) => report.written = written,
        Err(e) => {
            tracing::warn!("export failed for {}: {}", report.group.workload, e);
            report.write_error = Some(e.to_string());
        }
    }

    if opts.helmify && report.write_error.is_none() {
        let dir = writer::group_dir(&opts.output, &report.group);
        if let Err(e) = helmify::helmify_dir(&dir).await {
            tracing::warn!("helmify failed for {}: {}", report.group.workload, e);
            report.helmify_error = Some(e.to_string());
        }
    }

    report
}

/// Run a flat export: one multi-document file per type plus the namespace
/// definition.
pub fn export_flat(store: &ResourceStore, opts: &ExportOptions) -> Result<FlatReport> {
    let mut counts = BTreeMap::new();
    for rt in ResourceType::namespaced() {
        let count = store
            .of_type(rt.as_str())
            .filter(|(_, obj)| !classify(rt.as_str(), obj).managed)
            .count();
        if count > 0 {
            counts.insert(rt.as_str(), count);
        }
    }

    let files = if opts.dry_run {
        0
    } else {
        writer::write_flat(&opts.output, store)?
    };

    Ok(FlatReport { counts, files })
}

/// Members appearing in more than one group. Groups legitimately share
/// members; this is reporting, not exclusivity enforcement.
fn shared_members(reports: &[GroupReport]) -> BTreeMap<ResourceRef, usize> {
    let mut occurrences: BTreeMap<ResourceRef, usize> = BTreeMap::new();
    for report in reports {
        for member in &report.group.members {
            *occurrences.entry(member.clone()).or_insert(0) += 1;
        }
    }
    occurrences.retain(|_, count| *count > 1);
    occurrences
}

/// Print the end-of-run summary for a grouped export
pub fn print_grouped_summary(summary: &ExportSummary, store: &ResourceStore, opts: &ExportOptions) {
    if opts.dry_run {
        println!("Dry run: no files written.");
    }
    println!("Export summary for namespace {}:", store.namespace());

    if summary.groups.is_empty() {
        println!("  no unmanaged workloads found");
        return;
    }

    for report in &summary.groups {
        println!(
            "  {} ({} resources)",
            report.group.workload,
            report.group.members.len()
        );
        for member in &report.group.members {
            println!("      {}", member);
        }
        if report.group.rbac_incomplete {
            println!("      [cluster-scoped RBAC was not readable; closure incomplete]");
        }
        if let Some(err) = &report.write_error {
            println!("      [write failed: {}]", err);
        }
        if let Some(err) = &report.helmify_error {
            println!("      [helmify failed: {}]", err);
        }
    }

    if !summary.shared.is_empty() {
        println!("Shared across groups:");
        for (member, count) in &summary.shared {
            println!("  {} ({} groups)", member, count);
        }
    }

    print_unavailable(store);
    if !opts.dry_run {
        println!("Exported to {}", opts.output.display());
    }
}

/// Print the end-of-run summary for a flat export
pub fn print_flat_summary(report: &FlatReport, store: &ResourceStore, opts: &ExportOptions) {
    if opts.dry_run {
        println!("Dry run: no files written.");
    }
    println!("Export summary for namespace {}:", store.namespace());
    if report.counts.is_empty() {
        println!("  no unmanaged resources found");
    }
    for (resource_type, count) in &report.counts {
        println!("  {} ({} resources)", resource_type, count);
    }
    print_unavailable(store);
    if !opts.dry_run {
        println!("Exported to {}", opts.output.display());
    }
}

fn print_unavailable(store: &ResourceStore) {
    if !store.unavailable().is_empty() {
        let types: Vec<&str> = store.unavailable().iter().copied().collect();
        println!("Unavailable resource types (skipped): {}", types.join(", "));
    }
}

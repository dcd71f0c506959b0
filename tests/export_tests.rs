//! Export layout and orchestration

mod common;

use std::sync::Arc;

use common::{FixtureReader, configmap, deployment, service};
use kexport::export::{self, ExportOptions, writer};
use kexport::kube::ResourceStore;
use kexport::models::ResourceType;
use kexport::build_group;
use serde_json::json;

async fn sample_store() -> ResourceStore {
    let reader = FixtureReader::new("shop")
        .with(ResourceType::Deployment, deployment("frontend", json!({ "app": "frontend" })))
        .with(ResourceType::Service, service("frontend-svc", json!({ "app": "frontend" })))
        .with(ResourceType::ConfigMap, configmap("unreferenced-cfg"))
        .with(
            ResourceType::ConfigMap,
            json!({
                "apiVersion": "v1",
                "kind": "ConfigMap",
                "metadata": {
                    "name": "helm-cfg",
                    "labels": { "helm.sh/chart": "thing-1.0.0" }
                },
                "data": {}
            }),
        );
    ResourceStore::load(&reader, "shop").await.unwrap()
}

fn options(output: std::path::PathBuf) -> ExportOptions {
    ExportOptions {
        dry_run: false,
        flat: false,
        workers: 4,
        helmify: false,
        output,
    }
}

#[tokio::test]
async fn test_grouped_layout_one_dir_per_workload_one_file_per_resource() {
    let store = sample_store().await;
    let group = build_group(ResourceType::Deployment, "frontend", &store);

    let tmp = tempfile::tempdir().unwrap();
    let written = writer::write_group(tmp.path(), &group, &store).unwrap();
    assert_eq!(written, 2);

    let dir = tmp.path().join("frontend");
    assert!(dir.join("deployments-frontend.yaml").exists());
    assert!(dir.join("services-frontend-svc.yaml").exists());

    // written manifests are cleaned
    let contents = std::fs::read_to_string(dir.join("services-frontend-svc.yaml")).unwrap();
    let doc: serde_json::Value = serde_yaml::from_str(&contents).unwrap();
    assert_eq!(doc["kind"], "Service");
    assert!(doc.get("status").is_none());
}

#[tokio::test]
async fn test_flat_layout_one_file_per_type_plus_namespace() {
    let store = sample_store().await;

    let tmp = tempfile::tempdir().unwrap();
    let written = writer::write_flat(tmp.path(), &store).unwrap();

    assert!(tmp.path().join("namespace.yaml").exists());
    assert!(tmp.path().join("deployments.yaml").exists());
    assert!(tmp.path().join("services.yaml").exists());
    assert!(tmp.path().join("configmaps.yaml").exists());
    assert_eq!(written, 4);

    // Helm-managed configmap is not exported
    let cms = std::fs::read_to_string(tmp.path().join("configmaps.yaml")).unwrap();
    assert!(cms.contains("unreferenced-cfg"));
    assert!(!cms.contains("helm-cfg"));

    let ns = std::fs::read_to_string(tmp.path().join("namespace.yaml")).unwrap();
    let doc: serde_json::Value = serde_yaml::from_str(&ns).unwrap();
    assert_eq!(doc["metadata"]["name"], "shop");
    assert!(doc["metadata"].get("creationTimestamp").is_none());
}

#[tokio::test]
async fn test_dry_run_builds_groups_but_writes_nothing() {
    let store = Arc::new(sample_store().await);
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("out");

    let mut opts = options(output.clone());
    opts.dry_run = true;

    let summary = export::export_grouped(Arc::clone(&store), &opts).await;

    assert_eq!(summary.groups.len(), 1);
    assert_eq!(summary.groups[0].group.workload.name, "frontend");
    assert!(!output.exists());
}

#[tokio::test]
async fn test_grouped_export_writes_and_reports() {
    let store = Arc::new(sample_store().await);
    let tmp = tempfile::tempdir().unwrap();
    let opts = options(tmp.path().join("out"));

    let summary = export::export_grouped(Arc::clone(&store), &opts).await;

    assert_eq!(summary.groups.len(), 1);
    let report = &summary.groups[0];
    assert_eq!(report.written, 2);
    assert!(report.write_error.is_none());
    assert!(summary.shared.is_empty());
    assert!(opts.output.join("frontend").join("deployments-frontend.yaml").exists());
}

#[tokio::test]
async fn test_shared_members_are_reported_across_groups() {
    let shared_cfg_workload = |name: &str| {
        let mut w = deployment(name, json!({ "app": name }));
        w["spec"]["template"]["spec"]["volumes"] =
            json!([{ "name": "cfg", "configMap": { "name": "common-cfg" } }]);
        w
    };

    let reader = FixtureReader::new("shop")
        .with(ResourceType::Deployment, shared_cfg_workload("frontend"))
        .with(ResourceType::Deployment, shared_cfg_workload("backend"))
        .with(ResourceType::ConfigMap, configmap("common-cfg"));
    let store = Arc::new(ResourceStore::load(&reader, "shop").await.unwrap());

    let tmp = tempfile::tempdir().unwrap();
    let mut opts = options(tmp.path().join("out"));
    opts.dry_run = true;

    let summary = export::export_grouped(Arc::clone(&store), &opts).await;

    assert_eq!(summary.groups.len(), 2);
    let shared: Vec<String> = summary.shared.keys().map(|r| r.to_string()).collect();
    assert_eq!(shared, ["configmaps/common-cfg"]);
    assert_eq!(
        summary.shared.values().copied().collect::<Vec<_>>(),
        [2]
    );
}

#[tokio::test]
async fn test_flat_report_counts_unmanaged_only() {
    let store = sample_store().await;
    let tmp = tempfile::tempdir().unwrap();
    let mut opts = options(tmp.path().join("out"));
    opts.dry_run = true;
    opts.flat = true;

    let report = export::export_flat(&store, &opts).unwrap();

    assert_eq!(report.counts.get("deployments"), Some(&1));
    assert_eq!(report.counts.get("services"), Some(&1));
    // helm-cfg excluded, unreferenced-cfg counted
    assert_eq!(report.counts.get("configmaps"), Some(&1));
    assert_eq!(report.files, 0);
    assert!(!opts.output.exists());
}

//! RBAC closure resolution
//!
//! Bindings reference ServiceAccounts through subject lists, so closure
//! membership is found by scanning bindings. Cluster-scoped lookups may be
//! denied; the group must then say "incomplete" rather than pretending the
//! closure is empty.

mod common;

use common::{FixtureReader, deployment};
use kexport::build_group;
use kexport::kube::ResourceStore;
use kexport::models::{ResourceRef, ResourceType};
use serde_json::{Value, json};

fn workload_with_sa(name: &str, sa: &str) -> Value {
    let mut workload = deployment(name, json!({ "app": name }));
    workload["spec"]["template"]["spec"]["serviceAccountName"] = json!(sa);
    workload
}

fn service_account(name: &str) -> Value {
    json!({ "apiVersion": "v1", "kind": "ServiceAccount", "metadata": { "name": name } })
}

fn role_binding(name: &str, sa: &str, role_kind: &str, role_name: &str) -> Value {
    json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "RoleBinding",
        "metadata": { "name": name },
        "subjects": [{ "kind": "ServiceAccount", "name": sa, "namespace": "shop" }],
        "roleRef": { "apiGroup": "rbac.authorization.k8s.io", "kind": role_kind, "name": role_name }
    })
}

fn cluster_role(name: &str) -> Value {
    json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "ClusterRole",
        "metadata": { "name": name },
        "rules": [{ "apiGroups": [""], "resources": ["pods"], "verbs": ["get", "list"] }]
    })
}

#[tokio::test]
async fn test_role_binding_to_cluster_role_closure() {
    let reader = FixtureReader::new("shop")
        .with(ResourceType::Deployment, workload_with_sa("worker", "worker-sa"))
        .with(ResourceType::ServiceAccount, service_account("worker-sa"))
        .with(
            ResourceType::RoleBinding,
            role_binding("worker-rb", "worker-sa", "ClusterRole", "pod-reader"),
        )
        .with(ResourceType::ClusterRole, cluster_role("pod-reader"))
        .with(ResourceType::ClusterRole, cluster_role("unrelated-role"));

    let store = ResourceStore::load(&reader, "shop").await.unwrap();
    let group = build_group(ResourceType::Deployment, "worker", &store);

    assert!(group.members.contains(&ResourceRef::namespaced("serviceaccounts", "worker-sa")));
    assert!(group.members.contains(&ResourceRef::namespaced("rolebindings", "worker-rb")));
    assert!(group.members.contains(&ResourceRef::cluster("clusterroles", "pod-reader")));
    assert!(!group.members.contains(&ResourceRef::cluster("clusterroles", "unrelated-role")));
    assert!(!group.rbac_incomplete);
}

#[tokio::test]
async fn test_role_binding_to_namespaced_role() {
    let role = json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "Role",
        "metadata": { "name": "config-reader" },
        "rules": [{ "apiGroups": [""], "resources": ["configmaps"], "verbs": ["get"] }]
    });

    let reader = FixtureReader::new("shop")
        .with(ResourceType::Deployment, workload_with_sa("worker", "worker-sa"))
        .with(ResourceType::ServiceAccount, service_account("worker-sa"))
        .with(
            ResourceType::RoleBinding,
            role_binding("worker-rb", "worker-sa", "Role", "config-reader"),
        )
        .with(ResourceType::Role, role);

    let store = ResourceStore::load(&reader, "shop").await.unwrap();
    let group = build_group(ResourceType::Deployment, "worker", &store);

    assert!(group.members.contains(&ResourceRef::namespaced("roles", "config-reader")));
    assert!(!group.rbac_incomplete);
}

#[tokio::test]
async fn test_binding_for_other_namespace_subject_is_ignored() {
    let foreign_binding = json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "RoleBinding",
        "metadata": { "name": "foreign-rb" },
        "subjects": [{ "kind": "ServiceAccount", "name": "worker-sa", "namespace": "other" }],
        "roleRef": { "apiGroup": "rbac.authorization.k8s.io", "kind": "Role", "name": "config-reader" }
    });

    let reader = FixtureReader::new("shop")
        .with(ResourceType::Deployment, workload_with_sa("worker", "worker-sa"))
        .with(ResourceType::ServiceAccount, service_account("worker-sa"))
        .with(ResourceType::RoleBinding, foreign_binding);

    let store = ResourceStore::load(&reader, "shop").await.unwrap();
    let group = build_group(ResourceType::Deployment, "worker", &store);

    assert!(!group.members.contains(&ResourceRef::namespaced("rolebindings", "foreign-rb")));
}

#[tokio::test]
async fn test_subject_without_namespace_defaults_to_store_namespace() {
    let binding = json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "RoleBinding",
        "metadata": { "name": "worker-rb" },
        "subjects": [{ "kind": "ServiceAccount", "name": "worker-sa" }],
        "roleRef": { "apiGroup": "rbac.authorization.k8s.io", "kind": "Role", "name": "missing-role" }
    });

    let reader = FixtureReader::new("shop")
        .with(ResourceType::Deployment, workload_with_sa("worker", "worker-sa"))
        .with(ResourceType::ServiceAccount, service_account("worker-sa"))
        .with(ResourceType::RoleBinding, binding);

    let store = ResourceStore::load(&reader, "shop").await.unwrap();
    let group = build_group(ResourceType::Deployment, "worker", &store);

    // binding is a member even though its role does not exist in the store
    assert!(group.members.contains(&ResourceRef::namespaced("rolebindings", "worker-rb")));
    assert!(!group.members.iter().any(|m| m.resource_type == "roles"));
}

#[tokio::test]
async fn test_unreadable_cluster_rbac_marks_group_incomplete() {
    let reader = FixtureReader::new("shop")
        .with(ResourceType::Deployment, workload_with_sa("worker", "worker-sa"))
        .with(ResourceType::ServiceAccount, service_account("worker-sa"))
        .with(
            ResourceType::RoleBinding,
            role_binding("worker-rb", "worker-sa", "ClusterRole", "pod-reader"),
        )
        .deny(ResourceType::ClusterRole)
        .deny(ResourceType::ClusterRoleBinding);

    let store = ResourceStore::load(&reader, "shop").await.unwrap();
    let group = build_group(ResourceType::Deployment, "worker", &store);

    // namespaced half still resolves
    assert!(group.members.contains(&ResourceRef::namespaced("rolebindings", "worker-rb")));
    // cluster half is flagged, not silently empty
    assert!(group.rbac_incomplete);
    assert!(!group.members.iter().any(|m| m.cluster_scoped));
}

#[tokio::test]
async fn test_system_cluster_roles_are_never_members() {
    let reader = FixtureReader::new("shop")
        .with(ResourceType::Deployment, workload_with_sa("worker", "worker-sa"))
        .with(ResourceType::ServiceAccount, service_account("worker-sa"))
        .with(
            ResourceType::RoleBinding,
            role_binding("worker-rb", "worker-sa", "ClusterRole", "view"),
        )
        .with(ResourceType::ClusterRole, cluster_role("view"));

    let store = ResourceStore::load(&reader, "shop").await.unwrap();
    let group = build_group(ResourceType::Deployment, "worker", &store);

    assert!(group.members.contains(&ResourceRef::namespaced("rolebindings", "worker-rb")));
    assert!(!group.members.contains(&ResourceRef::cluster("clusterroles", "view")));
    assert!(!group.rbac_incomplete);
}

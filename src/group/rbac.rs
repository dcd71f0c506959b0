//! RBAC closure resolution
//!
//! Bindings reference ServiceAccounts indirectly through their subject
//! lists, so the closure is found by scanning every binding rather than
//! following a name on the ServiceAccount. Cluster-scoped objects come from
//! a separate cache that may be unavailable; resolution then degrades to
//! the namespaced half and says so instead of failing the run.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::group::classify::{classify, is_system_cluster_object};
use crate::kube::store::ResourceStore;
use crate::models::{ResourceRef, ResourceType};

/// RBAC objects associated with one ServiceAccount
#[derive(Debug, Default, Clone)]
pub struct RbacClosure {
    pub members: BTreeSet<ResourceRef>,
    /// Cluster-scoped objects could not be checked (permission denial)
    pub incomplete: bool,
}

/// Resolve the RBAC closure for a ServiceAccount in the store's namespace:
/// every RoleBinding/ClusterRoleBinding whose subjects contain it, plus each
/// binding's role. Managed bindings and built-in cluster objects are
/// omitted.
pub fn resolve_service_account(sa_name: &str, store: &ResourceStore) -> RbacClosure {
    let mut closure = RbacClosure::default();

    for (binding_name, binding) in store.of_type(ResourceType::RoleBinding.as_str()) {
        if !subjects_contain(binding, sa_name, store.namespace()) {
            continue;
        }
        if classify(ResourceType::RoleBinding.as_str(), binding).managed {
            tracing::debug!("skipping managed rolebinding {}", binding_name);
            continue;
        }
        closure.members.insert(ResourceRef::namespaced(
            ResourceType::RoleBinding.as_str(),
            binding_name.clone(),
        ));
        resolve_role_ref(binding, store, &mut closure);
    }

    if store.is_unavailable(ResourceType::ClusterRoleBinding.as_str()) {
        closure.incomplete = true;
        return closure;
    }

    for (binding_name, binding) in store.of_type(ResourceType::ClusterRoleBinding.as_str()) {
        if !subjects_contain(binding, sa_name, store.namespace()) {
            continue;
        }
        if is_system_cluster_object(binding_name)
            || classify(ResourceType::ClusterRoleBinding.as_str(), binding).managed
        {
            tracing::debug!("skipping system/managed clusterrolebinding {}", binding_name);
            continue;
        }
        closure.members.insert(ResourceRef::cluster(
            ResourceType::ClusterRoleBinding.as_str(),
            binding_name.clone(),
        ));
        resolve_role_ref(binding, store, &mut closure);
    }

    closure
}

/// Follow a binding's roleRef to the Role or ClusterRole it grants.
///
/// A namespaced RoleBinding may legitimately reference a ClusterRole.
fn resolve_role_ref(binding: &Value, store: &ResourceStore, closure: &mut RbacClosure) {
    let Some(role_ref) = binding.get("roleRef") else {
        return;
    };
    let kind = role_ref.get("kind").and_then(|k| k.as_str()).unwrap_or_default();
    let Some(name) = role_ref.get("name").and_then(|n| n.as_str()) else {
        return;
    };

    match kind {
        "Role" => {
            let r = ResourceRef::namespaced(ResourceType::Role.as_str(), name);
            if let Some(role) = store.get(&r) {
                if !classify(ResourceType::Role.as_str(), role).managed {
                    closure.members.insert(r);
                }
            }
        }
        "ClusterRole" => {
            if store.is_unavailable(ResourceType::ClusterRole.as_str()) {
                closure.incomplete = true;
                return;
            }
            if is_system_cluster_object(name) {
                return;
            }
            let r = ResourceRef::cluster(ResourceType::ClusterRole.as_str(), name);
            if let Some(role) = store.get(&r) {
                if !classify(ResourceType::ClusterRole.as_str(), role).managed {
                    closure.members.insert(r);
                }
            }
        }
        other => {
            tracing::debug!("unsupported roleRef kind: {}", other);
        }
    }
}

/// Whether a binding's subject list contains the ServiceAccount.
///
/// Subjects without an explicit namespace default to the store's namespace.
fn subjects_contain(binding: &Value, sa_name: &str, namespace: &str) -> bool {
    binding
        .get("subjects")
        .and_then(|s| s.as_array())
        .into_iter()
        .flatten()
        .any(|subject| {
            subject.get("kind").and_then(|k| k.as_str()) == Some("ServiceAccount")
                && subject.get("name").and_then(|n| n.as_str()) == Some(sa_name)
                && subject
                    .get("namespace")
                    .and_then(|n| n.as_str())
                    .unwrap_or(namespace)
                    == namespace
        })
}

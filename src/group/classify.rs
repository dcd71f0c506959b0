//! Managed-object classification
//!
//! A pure predicate over a resource body deciding whether the object was
//! created by an automation layer (Helm, an operator, the platform itself)
//! or by hand. Evaluated in fixed priority order so verdicts are
//! deterministic and reproducible offline from the body alone.

use serde_json::Value;

use crate::models::ResourceType;

const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
const HELM_CHART_LABEL: &str = "helm.sh/chart";

/// Why a resource was judged managed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagedReason {
    HelmLabel,
    OwnerReference,
    OperatorLabel,
    SystemDefault,
}

/// Classification verdict for one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedVerdict {
    pub managed: bool,
    pub reason: Option<ManagedReason>,
}

impl ManagedVerdict {
    fn managed(reason: ManagedReason) -> Self {
        Self {
            managed: true,
            reason: Some(reason),
        }
    }

    fn unmanaged() -> Self {
        Self {
            managed: false,
            reason: None,
        }
    }
}

/// Classify a resource body. First matching rule wins:
/// 1. Helm chart label or managed-by Helm
/// 2. any owner reference (controller flag irrelevant)
/// 3. operator/controller label pattern, or a non-Helm managed-by value
/// 4. fixed system-default identities
pub fn classify(resource_type: &str, obj: &Value) -> ManagedVerdict {
    let labels = obj
        .get("metadata")
        .and_then(|m| m.get("labels"))
        .and_then(|l| l.as_object());

    let managed_by = labels
        .and_then(|l| l.get(MANAGED_BY_LABEL))
        .and_then(|v| v.as_str());

    if let Some(labels) = labels {
        if labels.contains_key(HELM_CHART_LABEL)
            || managed_by.is_some_and(|v| v.eq_ignore_ascii_case("helm"))
        {
            return ManagedVerdict::managed(ManagedReason::HelmLabel);
        }
    }

    let has_owner = obj
        .get("metadata")
        .and_then(|m| m.get("ownerReferences"))
        .and_then(|o| o.as_array())
        .is_some_and(|refs| !refs.is_empty());
    if has_owner {
        return ManagedVerdict::managed(ManagedReason::OwnerReference);
    }

    if let Some(labels) = labels {
        let operator_pattern = labels.iter().any(|(key, value)| {
            looks_automated(key) || value.as_str().is_some_and(looks_automated)
        });
        // managed-by reaching this point is not Helm (rule 1 took those)
        if operator_pattern || managed_by.is_some() {
            return ManagedVerdict::managed(ManagedReason::OperatorLabel);
        }
    }

    if is_system_default(resource_type, obj) {
        return ManagedVerdict::managed(ManagedReason::SystemDefault);
    }

    ManagedVerdict::unmanaged()
}

fn looks_automated(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.contains("operator") || lower.contains("controller")
}

/// Resources every namespace carries that are never worth exporting
fn is_system_default(resource_type: &str, obj: &Value) -> bool {
    let name = obj
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or_default();

    match ResourceType::parse_optional(resource_type) {
        Some(ResourceType::ServiceAccount) => name == "default",
        Some(ResourceType::ConfigMap) | Some(ResourceType::Secret) => {
            name.starts_with("kube-")
                || name.starts_with("default-token-")
                || name.starts_with("sh.helm.release")
        }
        _ => false,
    }
}

/// Built-in cluster-scoped RBAC objects that are never exported
pub fn is_system_cluster_object(name: &str) -> bool {
    const SYSTEM_PREFIXES: &[&str] = &["system:", "kubeadm:", "node-", "kubernetes-"];
    const SYSTEM_NAMES: &[&str] = &["cluster-admin", "admin", "edit", "view"];

    SYSTEM_PREFIXES.iter().any(|p| name.starts_with(p)) || SYSTEM_NAMES.contains(&name)
}

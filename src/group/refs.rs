//! Reference extraction
//!
//! One pure rule per relationship kind, each reading resource bodies and
//! returning the identifiers of related resources. Forward rules follow
//! name references out of a workload's pod template; reverse rules match a
//! candidate's selector or target against the workload.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::models::ResourceType;

/// Name references found in a workload's pod template
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PodRefs {
    pub configmaps: BTreeSet<String>,
    pub secrets: BTreeSet<String>,
    pub claims: BTreeSet<String>,
    pub service_account: Option<String>,
}

/// Locate the pod template for a workload type.
///
/// CronJobs nest theirs one level deeper than the other workload kinds.
pub fn pod_template<'a>(resource_type: ResourceType, workload: &'a Value) -> Option<&'a Value> {
    match resource_type {
        ResourceType::CronJob => workload
            .get("spec")?
            .get("jobTemplate")?
            .get("spec")?
            .get("template"),
        _ => workload.get("spec")?.get("template"),
    }
}

/// Labels the workload stamps onto its pods
pub fn pod_template_labels(
    resource_type: ResourceType,
    workload: &Value,
) -> BTreeMap<String, String> {
    string_map(
        pod_template(resource_type, workload)
            .and_then(|t| t.get("metadata"))
            .and_then(|m| m.get("labels")),
    )
}

/// Scan a workload's pod template for ConfigMap/Secret/PVC/ServiceAccount
/// references: volumes, env valueFrom, envFrom, and the service account
/// field. The literal "default" service account is never a reference.
pub fn extract_pod_refs(resource_type: ResourceType, workload: &Value) -> PodRefs {
    let mut refs = PodRefs::default();

    let Some(pod_spec) = pod_template(resource_type, workload).and_then(|t| t.get("spec")) else {
        return refs;
    };

    let sa = pod_spec
        .get("serviceAccountName")
        .or_else(|| pod_spec.get("serviceAccount"))
        .and_then(|v| v.as_str());
    if let Some(sa) = sa {
        if sa != "default" {
            refs.service_account = Some(sa.to_string());
        }
    }

    for volume in pod_spec
        .get("volumes")
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
    {
        if let Some(name) = volume
            .get("configMap")
            .and_then(|c| c.get("name"))
            .and_then(|n| n.as_str())
        {
            refs.configmaps.insert(name.to_string());
        }
        if let Some(name) = volume
            .get("secret")
            .and_then(|s| s.get("secretName"))
            .and_then(|n| n.as_str())
        {
            refs.secrets.insert(name.to_string());
        }
        if let Some(name) = volume
            .get("persistentVolumeClaim")
            .and_then(|p| p.get("claimName"))
            .and_then(|n| n.as_str())
        {
            refs.claims.insert(name.to_string());
        }
    }

    let containers = pod_spec
        .get("containers")
        .and_then(|c| c.as_array())
        .into_iter()
        .flatten();
    let init_containers = pod_spec
        .get("initContainers")
        .and_then(|c| c.as_array())
        .into_iter()
        .flatten();

    for container in containers.chain(init_containers) {
        for env in container
            .get("env")
            .and_then(|e| e.as_array())
            .into_iter()
            .flatten()
        {
            let Some(value_from) = env.get("valueFrom") else {
                continue;
            };
            if let Some(name) = value_from
                .get("configMapKeyRef")
                .and_then(|r| r.get("name"))
                .and_then(|n| n.as_str())
            {
                refs.configmaps.insert(name.to_string());
            }
            if let Some(name) = value_from
                .get("secretKeyRef")
                .and_then(|r| r.get("name"))
                .and_then(|n| n.as_str())
            {
                refs.secrets.insert(name.to_string());
            }
        }

        for env_from in container
            .get("envFrom")
            .and_then(|e| e.as_array())
            .into_iter()
            .flatten()
        {
            if let Some(name) = env_from
                .get("configMapRef")
                .and_then(|r| r.get("name"))
                .and_then(|n| n.as_str())
            {
                refs.configmaps.insert(name.to_string());
            }
            if let Some(name) = env_from
                .get("secretRef")
                .and_then(|r| r.get("name"))
                .and_then(|n| n.as_str())
            {
                refs.secrets.insert(name.to_string());
            }
        }
    }

    refs
}

/// Expand a StatefulSet's volume claim templates to the concrete claim
/// names the controller creates: `{template}-{statefulset}-{ordinal}` for
/// each ordinal up to spec.replicas (default 1).
pub fn statefulset_claims(workload: &Value) -> BTreeSet<String> {
    let mut claims = BTreeSet::new();

    let Some(name) = workload
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(|n| n.as_str())
    else {
        return claims;
    };

    let replicas = workload
        .get("spec")
        .and_then(|s| s.get("replicas"))
        .and_then(|r| r.as_u64())
        .unwrap_or(1);

    for template in workload
        .get("spec")
        .and_then(|s| s.get("volumeClaimTemplates"))
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
    {
        let Some(template_name) = template
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str())
        else {
            continue;
        };
        for ordinal in 0..replicas {
            claims.insert(format!("{}-{}-{}", template_name, name, ordinal));
        }
    }

    claims
}

/// Standard selector semantics: every key/value pair the selector specifies
/// must be present and equal on the target labels. An empty selector matches
/// nothing, to avoid catastrophic over-grouping.
pub fn selector_matches(
    selector: &BTreeMap<String, String>,
    labels: &BTreeMap<String, String>,
) -> bool {
    !selector.is_empty()
        && selector
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
}

/// A Service's pod selector
pub fn service_selector(service: &Value) -> BTreeMap<String, String> {
    string_map(service.get("spec").and_then(|s| s.get("selector")))
}

/// A NetworkPolicy's pod selector (matchLabels form)
pub fn network_policy_selector(policy: &Value) -> BTreeMap<String, String> {
    string_map(
        policy
            .get("spec")
            .and_then(|s| s.get("podSelector"))
            .and_then(|p| p.get("matchLabels")),
    )
}

/// Service names an Ingress routes to, across all rules and paths
pub fn ingress_backend_services(ingress: &Value) -> BTreeSet<String> {
    let mut backends = BTreeSet::new();
    for rule in ingress
        .get("spec")
        .and_then(|s| s.get("rules"))
        .and_then(|r| r.as_array())
        .into_iter()
        .flatten()
    {
        for path in rule
            .get("http")
            .and_then(|h| h.get("paths"))
            .and_then(|p| p.as_array())
            .into_iter()
            .flatten()
        {
            if let Some(name) = path
                .get("backend")
                .and_then(|b| b.get("service"))
                .and_then(|s| s.get("name"))
                .and_then(|n| n.as_str())
            {
                backends.insert(name.to_string());
            }
        }
    }
    backends
}

/// The Service an OpenShift Route points to
pub fn route_target_service(route: &Value) -> Option<String> {
    route
        .get("spec")
        .and_then(|s| s.get("to"))
        .and_then(|t| t.get("name"))
        .and_then(|n| n.as_str())
        .map(|s| s.to_string())
}

/// Whether an HPA's scale target is this workload (kind + name)
pub fn hpa_targets(hpa: &Value, workload_kind: &str, workload_name: &str) -> bool {
    let Some(target) = hpa.get("spec").and_then(|s| s.get("scaleTargetRef")) else {
        return false;
    };
    let kind_matches = target
        .get("kind")
        .and_then(|k| k.as_str())
        .is_some_and(|k| k.eq_ignore_ascii_case(workload_kind));
    let name_matches = target
        .get("name")
        .and_then(|n| n.as_str())
        .is_some_and(|n| n == workload_name);
    kind_matches && name_matches
}

/// Collect an object-valued field into an owned string map, ignoring
/// non-string values
fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(|v| v.as_object())
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

//! Workload group building
//!
//! Expands one workload into the set of namespace resources it references
//! or that reference it. Single pass: every rule is evaluated once against
//! the store snapshot, and there is no transitive closure beyond the defined
//! reference kinds - a ConfigMap used only by a Service in the group is not
//! pulled in.

use std::collections::BTreeSet;

use crate::group::classify::classify;
use crate::group::rbac::resolve_service_account;
use crate::group::refs;
use crate::kube::store::ResourceStore;
use crate::models::{ResourceRef, ResourceType};

/// A workload and every unmanaged resource related to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadGroup {
    pub workload: ResourceRef,
    /// Always contains the workload itself; ordered for stable output
    pub members: BTreeSet<ResourceRef>,
    /// Cluster-scoped RBAC could not be checked this run
    pub rbac_incomplete: bool,
}

/// Build the group for one workload against an immutable store snapshot.
///
/// Name references (ConfigMap/Secret/ServiceAccount/PVC) resolve by exact
/// lookup; Service/Ingress/Route/HPA/NetworkPolicy resolve by reverse
/// selector or target match over the full candidate set of that type.
/// Managed dependencies are silently omitted.
pub fn build_group(
    resource_type: ResourceType,
    name: &str,
    store: &ResourceStore,
) -> WorkloadGroup {
    let workload_ref = ResourceRef::namespaced(resource_type.as_str(), name);
    let mut group = WorkloadGroup {
        workload: workload_ref.clone(),
        members: BTreeSet::from([workload_ref]),
        rbac_incomplete: false,
    };

    let Some(workload) = store.get(&group.workload) else {
        tracing::warn!("{} not present in store snapshot", group.workload);
        return group;
    };

    // Forward name references out of the pod template
    let pod_refs = refs::extract_pod_refs(resource_type, workload);
    for cm in &pod_refs.configmaps {
        retain_unmanaged(&mut group.members, ResourceType::ConfigMap, cm, store);
    }
    for secret in &pod_refs.secrets {
        retain_unmanaged(&mut group.members, ResourceType::Secret, secret, store);
    }

    let mut claims = pod_refs.claims.clone();
    if resource_type == ResourceType::StatefulSet {
        claims.extend(refs::statefulset_claims(workload));
    }
    for claim in &claims {
        retain_unmanaged(
            &mut group.members,
            ResourceType::PersistentVolumeClaim,
            claim,
            store,
        );
    }

    let mut service_accounts = Vec::new();
    if let Some(sa) = &pod_refs.service_account {
        if retain_unmanaged(&mut group.members, ResourceType::ServiceAccount, sa, store) {
            service_accounts.push(sa.clone());
        }
    }

    // Reverse matches against the workload's pod labels
    let pod_labels = refs::pod_template_labels(resource_type, workload);
    let mut group_services = BTreeSet::new();
    for (svc_name, svc) in store.of_type(ResourceType::Service.as_str()) {
        if refs::selector_matches(&refs::service_selector(svc), &pod_labels)
            && retain_unmanaged(&mut group.members, ResourceType::Service, svc_name, store)
        {
            group_services.insert(svc_name.clone());
        }
    }

    // Ingresses and Routes chain off Services already in the group
    for (ing_name, ing) in store.of_type(ResourceType::Ingress.as_str()) {
        let backends = refs::ingress_backend_services(ing);
        if backends.iter().any(|b| group_services.contains(b)) {
            retain_unmanaged(&mut group.members, ResourceType::Ingress, ing_name, store);
        }
    }
    for (route_name, route) in store.of_type(ResourceType::Route.as_str()) {
        if refs::route_target_service(route).is_some_and(|svc| group_services.contains(&svc)) {
            retain_unmanaged(&mut group.members, ResourceType::Route, route_name, store);
        }
    }

    for (hpa_name, hpa) in store.of_type(ResourceType::HorizontalPodAutoscaler.as_str()) {
        if refs::hpa_targets(hpa, resource_type.kind(), name) {
            retain_unmanaged(
                &mut group.members,
                ResourceType::HorizontalPodAutoscaler,
                hpa_name,
                store,
            );
        }
    }

    for (policy_name, policy) in store.of_type(ResourceType::NetworkPolicy.as_str()) {
        if refs::selector_matches(&refs::network_policy_selector(policy), &pod_labels) {
            retain_unmanaged(
                &mut group.members,
                ResourceType::NetworkPolicy,
                policy_name,
                store,
            );
        }
    }

    for sa in &service_accounts {
        let closure = resolve_service_account(sa, store);
        group.members.extend(closure.members);
        group.rbac_incomplete |= closure.incomplete;
    }

    group
}

/// Add a candidate to the member set if it exists in the snapshot and is
/// unmanaged. Returns whether it was added.
fn retain_unmanaged(
    members: &mut BTreeSet<ResourceRef>,
    resource_type: ResourceType,
    name: &str,
    store: &ResourceStore,
) -> bool {
    let r = if resource_type.cluster_scoped() {
        ResourceRef::cluster(resource_type.as_str(), name)
    } else {
        ResourceRef::namespaced(resource_type.as_str(), name)
    };

    let Some(obj) = store.get(&r) else {
        tracing::debug!("{} referenced but not in store", r);
        return false;
    };
    if classify(resource_type.as_str(), obj).managed {
        tracing::debug!("{} referenced but managed; omitting", r);
        return false;
    }
    members.insert(r)
}

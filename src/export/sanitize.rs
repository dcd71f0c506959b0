//! Manifest cleaning
//!
//! Strips the runtime and server-managed fields from a resource body so the
//! result can be applied to another cluster. Pure and order-independent:
//! one object in, one cleaned object (or nothing) out.

use serde_json::Value;

/// Metadata fields assigned by the API server
const METADATA_FIELDS: &[&str] = &[
    "creationTimestamp",
    "deletionGracePeriodSeconds",
    "deletionTimestamp",
    "generation",
    "managedFields",
    "resourceVersion",
    "selfLink",
    "uid",
    "finalizers",
    "ownerReferences",
];

/// Annotations written by kubectl, OLM, and volume provisioners
const ANNOTATIONS: &[&str] = &[
    "kubectl.kubernetes.io/last-applied-configuration",
    "olm.operatorNamespace",
    "olm.operatorGroup",
    "volume.kubernetes.io/selected-node",
    "pv.kubernetes.io/bind-completed",
    "pv.kubernetes.io/bound-by-controller",
    "volume.beta.kubernetes.io/storage-provisioner",
    "volume.kubernetes.io/storage-provisioner",
];

/// Spec fields assigned at admission or runtime (Service IPs, PVC binding)
const SPEC_FIELDS: &[&str] = &[
    "clusterIP",
    "clusterIPs",
    "ipFamilies",
    "ipFamilyPolicy",
    "sessionAffinityConfig",
    "externalIPs",
    "externalTrafficPolicy",
    "healthCheckNodePort",
    "loadBalancerIP",
    "loadBalancerSourceRanges",
    "publishNotReadyAddresses",
    "volumeName",
];

/// Clean a resource body for export.
///
/// Returns None when nothing meaningful remains after stripping; such
/// objects are dropped rather than written.
pub fn sanitize(obj: &Value) -> Option<Value> {
    let mut cleaned = obj.clone();
    let map = cleaned.as_object_mut()?;

    map.remove("status");

    if let Some(meta) = map.get_mut("metadata").and_then(|m| m.as_object_mut()) {
        for field in METADATA_FIELDS {
            meta.remove(*field);
        }

        if let Some(annotations) = meta.get_mut("annotations").and_then(|a| a.as_object_mut()) {
            for annotation in ANNOTATIONS {
                annotations.remove(*annotation);
            }
        }
        // emptied maps are removed rather than emitted as {}
        if meta
            .get("annotations")
            .and_then(|a| a.as_object())
            .is_some_and(|a| a.is_empty())
        {
            meta.remove("annotations");
        }
        if meta
            .get("labels")
            .and_then(|l| l.as_object())
            .is_some_and(|l| l.is_empty())
        {
            meta.remove("labels");
        }
    }

    if let Some(spec) = map.get_mut("spec").and_then(|s| s.as_object_mut()) {
        for field in SPEC_FIELDS {
            spec.remove(*field);
        }
        if let Some(ports) = spec.get_mut("ports").and_then(|p| p.as_array_mut()) {
            for port in ports {
                if let Some(port) = port.as_object_mut() {
                    port.remove("nodePort");
                }
            }
        }
    }

    if map
        .get("metadata")
        .and_then(|m| m.as_object())
        .is_some_and(|m| m.is_empty())
    {
        map.remove("metadata");
    }

    if map.is_empty() || map.keys().all(|k| k == "apiVersion" || k == "kind") {
        return None;
    }

    Some(cleaned)
}

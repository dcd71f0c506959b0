//! In-memory cluster fixture for exercising the grouping engine offline
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};

use kexport::kube::{ClusterReader, ListError};
use kexport::models::ResourceType;

/// A fabricated cluster state: objects per type, plus types whose listing
/// is denied to simulate partial access.
pub struct FixtureReader {
    namespace: String,
    namespaced: HashMap<&'static str, Vec<Value>>,
    cluster: HashMap<&'static str, Vec<Value>>,
    denied: HashSet<&'static str>,
}

impl FixtureReader {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            namespaced: HashMap::new(),
            cluster: HashMap::new(),
            denied: HashSet::new(),
        }
    }

    /// Add an object of a type to the fixture
    pub fn with(mut self, resource_type: ResourceType, obj: Value) -> Self {
        let map = if resource_type.cluster_scoped() {
            &mut self.cluster
        } else {
            &mut self.namespaced
        };
        map.entry(resource_type.as_str()).or_default().push(obj);
        self
    }

    /// Make listing a type fail with AccessDenied
    pub fn deny(mut self, resource_type: ResourceType) -> Self {
        self.denied.insert(resource_type.as_str());
        self
    }
}

#[async_trait]
impl ClusterReader for FixtureReader {
    async fn list_namespaced(
        &self,
        namespace: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<Value>, ListError> {
        if self.denied.contains(resource_type.as_str()) {
            return Err(ListError::AccessDenied(format!(
                "cannot list {}",
                resource_type
            )));
        }
        if namespace != self.namespace {
            return Err(ListError::NotFound(format!("namespace {}", namespace)));
        }
        Ok(self
            .namespaced
            .get(resource_type.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn list_cluster(&self, resource_type: ResourceType) -> Result<Vec<Value>, ListError> {
        if self.denied.contains(resource_type.as_str()) {
            return Err(ListError::AccessDenied(format!(
                "cannot list {}",
                resource_type
            )));
        }
        Ok(self
            .cluster
            .get(resource_type.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn get_namespace(&self, namespace: &str) -> Result<Value, ListError> {
        if namespace != self.namespace {
            return Err(ListError::NotFound(format!("namespace {}", namespace)));
        }
        Ok(json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": {
                "name": namespace,
                "labels": { "kubernetes.io/metadata.name": namespace },
                "creationTimestamp": "2024-01-01T00:00:00Z"
            },
            "status": { "phase": "Active" }
        }))
    }
}

/// A minimal unmanaged Deployment with the given pod labels
pub fn deployment(name: &str, pod_labels: Value) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": { "name": name, "labels": pod_labels.clone() },
        "spec": {
            "replicas": 1,
            "selector": { "matchLabels": pod_labels.clone() },
            "template": {
                "metadata": { "labels": pod_labels },
                "spec": {
                    "containers": [{ "name": "main", "image": "app:latest" }]
                }
            }
        }
    })
}

/// A minimal unmanaged Service with the given selector
pub fn service(name: &str, selector: Value) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": { "name": name },
        "spec": {
            "selector": selector,
            "ports": [{ "port": 80, "targetPort": 8080 }]
        }
    })
}

/// A minimal unmanaged ConfigMap
pub fn configmap(name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": { "name": name },
        "data": { "key": "value" }
    })
}

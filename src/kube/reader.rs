//! Cluster read collaborator
//!
//! The store never talks to the API server directly; it goes through the
//! `ClusterReader` trait so the whole grouping engine can be tested against
//! an in-memory fixture instead of a live cluster.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::ListParams;
use kube::core::{DynamicObject, TypeMeta};
use kube::{Api, Client};
use serde_json::Value;

use crate::models::ResourceType;

/// Errors from a single listing call
#[derive(Debug, Clone, thiserror::Error)]
pub enum ListError {
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Read-only access to cluster state
///
/// One call lists every object of a type; there is no per-instance fetch.
#[async_trait]
pub trait ClusterReader: Send + Sync {
    /// List all objects of a namespaced type in a namespace
    async fn list_namespaced(
        &self,
        namespace: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<Value>, ListError>;

    /// List all objects of a cluster-scoped type
    async fn list_cluster(&self, resource_type: ResourceType) -> Result<Vec<Value>, ListError>;

    /// Fetch the namespace object itself
    async fn get_namespace(&self, namespace: &str) -> Result<Value, ListError>;
}

/// Production reader over the Kubernetes API
pub struct ApiReader {
    client: Client,
}

impl ApiReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn dynamic_api(&self, namespace: Option<&str>, resource_type: ResourceType) -> Api<DynamicObject> {
        let ar = resource_type.api_resource();
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        }
    }

    async fn list_with(
        &self,
        api: Api<DynamicObject>,
        resource_type: ResourceType,
    ) -> Result<Vec<Value>, ListError> {
        let ar = resource_type.api_resource();
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(map_kube_error)?;

        let mut values = Vec::with_capacity(list.items.len());
        for mut obj in list.items {
            // LIST responses omit apiVersion/kind on items; fill them back in
            // so exported manifests are applyable
            if obj.types.is_none() {
                obj.types = Some(TypeMeta {
                    api_version: ar.api_version.clone(),
                    kind: ar.kind.clone(),
                });
            }
            let value = serde_json::to_value(&obj)
                .map_err(|e| ListError::Transport(format!("serialization failed: {}", e)))?;
            values.push(value);
        }
        Ok(values)
    }
}

#[async_trait]
impl ClusterReader for ApiReader {
    async fn list_namespaced(
        &self,
        namespace: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<Value>, ListError> {
        let api = self.dynamic_api(Some(namespace), resource_type);
        self.list_with(api, resource_type).await
    }

    async fn list_cluster(&self, resource_type: ResourceType) -> Result<Vec<Value>, ListError> {
        let api = self.dynamic_api(None, resource_type);
        self.list_with(api, resource_type).await
    }

    async fn get_namespace(&self, namespace: &str) -> Result<Value, ListError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let ns = api.get(namespace).await.map_err(map_kube_error)?;
        serde_json::to_value(&ns)
            .map_err(|e| ListError::Transport(format!("serialization failed: {}", e)))
    }
}

/// Map kube client errors onto the reader's error taxonomy
fn map_kube_error(err: kube::Error) -> ListError {
    match err {
        kube::Error::Api(ae) if ae.code == 403 => ListError::AccessDenied(ae.message),
        kube::Error::Api(ae) if ae.code == 404 => ListError::NotFound(ae.message),
        other => ListError::Transport(other.to_string()),
    }
}

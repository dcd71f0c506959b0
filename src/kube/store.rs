//! Resource store
//!
//! Snapshot cache of every resource of every relevant type in the target
//! namespace, fetched once up front (one LIST call per type, never one per
//! instance) and indexed by (type, name). Read-only after population, so it
//! can be shared across workers without locking.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::Value;

use crate::kube::reader::{ClusterReader, ListError};
use crate::models::{ResourceRef, ResourceType};

/// Errors that abort the whole run
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    #[error("namespace {namespace} not found: {source}")]
    NamespaceNotFound {
        namespace: String,
        #[source]
        source: ListError,
    },
    #[error("no resource type could be listed in {namespace}: {reason}")]
    NoClusterAccess { namespace: String, reason: String },
}

/// Immutable per-run snapshot of cluster state
#[derive(Debug)]
pub struct ResourceStore {
    namespace: String,
    namespace_manifest: Value,
    namespaced: HashMap<&'static str, BTreeMap<String, Value>>,
    cluster: HashMap<&'static str, BTreeMap<String, Value>>,
    unavailable: BTreeSet<&'static str>,
}

impl ResourceStore {
    /// Populate the store with one listing call per resource type.
    ///
    /// A type that cannot be listed (permissions, or an API the cluster does
    /// not serve, e.g. routes outside OpenShift) is recorded as unavailable
    /// and the run continues without it. Only a failed namespace lookup is
    /// fatal; if every namespaced type fails, the run is treated as having
    /// no cluster access at all.
    pub async fn load(
        reader: &dyn ClusterReader,
        namespace: &str,
    ) -> Result<Self, FatalError> {
        let namespace_manifest = reader.get_namespace(namespace).await.map_err(|source| {
            FatalError::NamespaceNotFound {
                namespace: namespace.to_string(),
                source,
            }
        })?;

        let mut store = Self {
            namespace: namespace.to_string(),
            namespace_manifest,
            namespaced: HashMap::new(),
            cluster: HashMap::new(),
            unavailable: BTreeSet::new(),
        };

        let mut last_error = None;
        for rt in ResourceType::namespaced() {
            match reader.list_namespaced(namespace, *rt).await {
                Ok(objects) => {
                    store.namespaced.insert(rt.as_str(), index_by_name(*rt, objects));
                }
                Err(err) => {
                    tracing::warn!("{} unavailable in {}: {}", rt, namespace, err);
                    store.unavailable.insert(rt.as_str());
                    last_error = Some(err);
                }
            }
        }

        if store.namespaced.is_empty() {
            let reason = last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no resource types configured".to_string());
            return Err(FatalError::NoClusterAccess {
                namespace: namespace.to_string(),
                reason,
            });
        }

        for rt in ResourceType::cluster() {
            match reader.list_cluster(*rt).await {
                Ok(objects) => {
                    store.cluster.insert(rt.as_str(), index_by_name(*rt, objects));
                }
                Err(err) => {
                    tracing::warn!("cluster-scoped {} unavailable: {}", rt, err);
                    store.unavailable.insert(rt.as_str());
                }
            }
        }

        Ok(store)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn namespace_manifest(&self) -> &Value {
        &self.namespace_manifest
    }

    /// Iterate all objects of a type in name order; empty if unavailable
    pub fn of_type(&self, resource_type: &str) -> impl Iterator<Item = (&String, &Value)> {
        self.map_for(resource_type).into_iter().flatten()
    }

    pub fn get(&self, r: &ResourceRef) -> Option<&Value> {
        self.map_for(&r.resource_type)?.get(&r.name)
    }

    pub fn contains(&self, resource_type: &str, name: &str) -> bool {
        self.map_for(resource_type)
            .map(|m| m.contains_key(name))
            .unwrap_or(false)
    }

    /// Types that could not be listed this run
    pub fn unavailable(&self) -> &BTreeSet<&'static str> {
        &self.unavailable
    }

    pub fn is_unavailable(&self, resource_type: &str) -> bool {
        self.unavailable.contains(resource_type)
    }

    fn map_for(&self, resource_type: &str) -> Option<&BTreeMap<String, Value>> {
        match ResourceType::parse_optional(resource_type) {
            Some(rt) if rt.cluster_scoped() => self.cluster.get(rt.as_str()),
            Some(rt) => self.namespaced.get(rt.as_str()),
            None => None,
        }
    }
}

/// Index a listing by metadata.name, skipping nameless objects
fn index_by_name(resource_type: ResourceType, objects: Vec<Value>) -> BTreeMap<String, Value> {
    let mut indexed = BTreeMap::new();
    for obj in objects {
        match obj
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str())
        {
            Some(name) => {
                indexed.insert(name.to_string(), obj);
            }
            None => {
                tracing::warn!("skipping {} object without metadata.name", resource_type);
            }
        }
    }
    indexed
}

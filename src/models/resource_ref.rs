//! Resource identity

use std::fmt;

/// Identity of a single resource within one run.
///
/// The (type, name) pair is the dedup key everywhere: member sets, shared
/// resource reporting, and store lookups. Namespaced and cluster-scoped
/// resources live in separate scopes, so the flag participates in identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceRef {
    /// Lowercase plural resource type, e.g. "configmaps"
    pub resource_type: String,
    pub name: String,
    pub cluster_scoped: bool,
}

impl ResourceRef {
    pub fn namespaced(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            cluster_scoped: false,
        }
    }

    pub fn cluster(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            cluster_scoped: true,
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.name)
    }
}

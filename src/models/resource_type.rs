//! Resource type registry
//!
//! Central enum for every resource type the exporter reads. Eliminates
//! hardcoded plural/kind strings throughout the codebase and carries the
//! API coordinates needed to build a dynamic client for each type.

use kube::core::ApiResource;
use std::fmt;
use std::str::FromStr;

/// Enumeration of all resource types handled by the exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    // Workload types - the grouping roots
    Deployment,
    StatefulSet,
    CronJob,
    Job,
    // Resources a workload references by name
    ConfigMap,
    Secret,
    PersistentVolumeClaim,
    ServiceAccount,
    // Resources that reference a workload by selector or target
    Service,
    Ingress,
    Route,
    NetworkPolicy,
    HorizontalPodAutoscaler,
    // RBAC, namespaced
    Role,
    RoleBinding,
    // RBAC, cluster-scoped
    ClusterRole,
    ClusterRoleBinding,
}

impl ResourceType {
    /// Lowercase plural name, used as the store key and in file names
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Deployment => "deployments",
            ResourceType::StatefulSet => "statefulsets",
            ResourceType::CronJob => "cronjobs",
            ResourceType::Job => "jobs",
            ResourceType::ConfigMap => "configmaps",
            ResourceType::Secret => "secrets",
            ResourceType::PersistentVolumeClaim => "persistentvolumeclaims",
            ResourceType::ServiceAccount => "serviceaccounts",
            ResourceType::Service => "services",
            ResourceType::Ingress => "ingresses",
            ResourceType::Route => "routes",
            ResourceType::NetworkPolicy => "networkpolicies",
            ResourceType::HorizontalPodAutoscaler => "horizontalpodautoscalers",
            ResourceType::Role => "roles",
            ResourceType::RoleBinding => "rolebindings",
            ResourceType::ClusterRole => "clusterroles",
            ResourceType::ClusterRoleBinding => "clusterrolebindings",
        }
    }

    /// PascalCase kind name as it appears in manifests
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceType::Deployment => "Deployment",
            ResourceType::StatefulSet => "StatefulSet",
            ResourceType::CronJob => "CronJob",
            ResourceType::Job => "Job",
            ResourceType::ConfigMap => "ConfigMap",
            ResourceType::Secret => "Secret",
            ResourceType::PersistentVolumeClaim => "PersistentVolumeClaim",
            ResourceType::ServiceAccount => "ServiceAccount",
            ResourceType::Service => "Service",
            ResourceType::Ingress => "Ingress",
            ResourceType::Route => "Route",
            ResourceType::NetworkPolicy => "NetworkPolicy",
            ResourceType::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
            ResourceType::Role => "Role",
            ResourceType::RoleBinding => "RoleBinding",
            ResourceType::ClusterRole => "ClusterRole",
            ResourceType::ClusterRoleBinding => "ClusterRoleBinding",
        }
    }

    /// API group ("" for the core group)
    pub fn group(&self) -> &'static str {
        match self {
            ResourceType::Deployment | ResourceType::StatefulSet => "apps",
            ResourceType::CronJob | ResourceType::Job => "batch",
            ResourceType::ConfigMap
            | ResourceType::Secret
            | ResourceType::PersistentVolumeClaim
            | ResourceType::ServiceAccount
            | ResourceType::Service => "",
            ResourceType::Ingress | ResourceType::NetworkPolicy => "networking.k8s.io",
            ResourceType::Route => "route.openshift.io",
            ResourceType::HorizontalPodAutoscaler => "autoscaling",
            ResourceType::Role
            | ResourceType::RoleBinding
            | ResourceType::ClusterRole
            | ResourceType::ClusterRoleBinding => "rbac.authorization.k8s.io",
        }
    }

    /// API version within the group
    pub fn version(&self) -> &'static str {
        match self {
            ResourceType::HorizontalPodAutoscaler => "v2",
            _ => "v1",
        }
    }

    pub fn cluster_scoped(&self) -> bool {
        matches!(
            self,
            ResourceType::ClusterRole | ResourceType::ClusterRoleBinding
        )
    }

    /// ApiResource for dynamic listing of this type
    pub fn api_resource(&self) -> ApiResource {
        let group = self.group();
        let version = self.version();
        let api_version = if group.is_empty() {
            version.to_string()
        } else {
            format!("{}/{}", group, version)
        };
        ApiResource {
            group: group.to_string(),
            version: version.to_string(),
            api_version,
            kind: self.kind().to_string(),
            plural: self.as_str().to_string(),
        }
    }

    /// Workload types - the roots a group is built around
    pub fn workloads() -> &'static [Self] {
        &[
            ResourceType::Deployment,
            ResourceType::StatefulSet,
            ResourceType::CronJob,
            ResourceType::Job,
        ]
    }

    /// All namespaced types, workloads included
    pub fn namespaced() -> &'static [Self] {
        &[
            ResourceType::Deployment,
            ResourceType::StatefulSet,
            ResourceType::CronJob,
            ResourceType::Job,
            ResourceType::ConfigMap,
            ResourceType::Secret,
            ResourceType::PersistentVolumeClaim,
            ResourceType::ServiceAccount,
            ResourceType::Service,
            ResourceType::Ingress,
            ResourceType::Route,
            ResourceType::NetworkPolicy,
            ResourceType::HorizontalPodAutoscaler,
            ResourceType::Role,
            ResourceType::RoleBinding,
        ]
    }

    /// Cluster-scoped types (optional cache, permission permitting)
    pub fn cluster() -> &'static [Self] {
        &[ResourceType::ClusterRole, ResourceType::ClusterRoleBinding]
    }

    /// Try to parse a plural type name, returning None if unknown
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deployments" => Ok(ResourceType::Deployment),
            "statefulsets" => Ok(ResourceType::StatefulSet),
            "cronjobs" => Ok(ResourceType::CronJob),
            "jobs" => Ok(ResourceType::Job),
            "configmaps" => Ok(ResourceType::ConfigMap),
            "secrets" => Ok(ResourceType::Secret),
            "persistentvolumeclaims" => Ok(ResourceType::PersistentVolumeClaim),
            "serviceaccounts" => Ok(ResourceType::ServiceAccount),
            "services" => Ok(ResourceType::Service),
            "ingresses" => Ok(ResourceType::Ingress),
            "routes" => Ok(ResourceType::Route),
            "networkpolicies" => Ok(ResourceType::NetworkPolicy),
            "horizontalpodautoscalers" => Ok(ResourceType::HorizontalPodAutoscaler),
            "roles" => Ok(ResourceType::Role),
            "rolebindings" => Ok(ResourceType::RoleBinding),
            "clusterroles" => Ok(ResourceType::ClusterRole),
            "clusterrolebindings" => Ok(ResourceType::ClusterRoleBinding),
            _ => Err(format!("unknown resource type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_round_trip() {
        for rt in ResourceType::namespaced()
            .iter()
            .chain(ResourceType::cluster())
        {
            assert_eq!(ResourceType::parse_optional(rt.as_str()), Some(*rt));
        }
    }

    #[test]
    fn test_workloads_are_namespaced() {
        for rt in ResourceType::workloads() {
            assert!(!rt.cluster_scoped());
            assert!(ResourceType::namespaced().contains(rt));
        }
    }

    #[test]
    fn test_api_resource_coordinates() {
        let ar = ResourceType::Deployment.api_resource();
        assert_eq!(ar.api_version, "apps/v1");
        assert_eq!(ar.plural, "deployments");

        let ar = ResourceType::ConfigMap.api_resource();
        assert_eq!(ar.api_version, "v1");

        let ar = ResourceType::HorizontalPodAutoscaler.api_resource();
        assert_eq!(ar.api_version, "autoscaling/v2");
    }
}

//! kexport library
//!
//! Extracts the hand-created resources of a namespace and re-groups them
//! into portable, cleaned manifest files, per workload or flat. The library
//! surface exists so the grouping engine can be exercised against in-memory
//! fixtures without a cluster.

pub mod cli;
pub mod config;
pub mod export;
pub mod group;
pub mod kube;
pub mod models;

// Re-export commonly used types for convenience
pub use export::{ExportOptions, ExportSummary, sanitize};
pub use group::{ManagedReason, ManagedVerdict, WorkloadGroup, build_group, classify};
pub use crate::kube::{ApiReader, ClusterReader, FatalError, ListError, ResourceStore};
pub use models::{ResourceRef, ResourceType};

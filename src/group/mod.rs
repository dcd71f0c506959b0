//! Workload grouping engine
//!
//! Classifies resources as managed vs unmanaged and expands each unmanaged
//! workload into the set of namespace resources it references or that
//! reference it.

pub mod builder;
pub mod classify;
pub mod rbac;
pub mod refs;

pub use builder::{WorkloadGroup, build_group};
pub use classify::{ManagedReason, ManagedVerdict, classify, is_system_cluster_object};
pub use rbac::RbacClosure;

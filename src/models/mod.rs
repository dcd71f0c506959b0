//! Core data model
//!
//! Resource identity and the registry of resource types the exporter
//! understands.

mod resource_ref;
mod resource_type;

pub use resource_ref::ResourceRef;
pub use resource_type::ResourceType;

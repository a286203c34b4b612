//! `armature-registry` — explicit dependency wiring.
//!
//! A compile-time-checked registration table plus a per-request resolution
//! scope, and the naming-convention registrar that fills the table from
//! module manifests. The registry is built once at startup, single-threaded,
//! and only read afterwards; request handlers resolve through a
//! [`RequestScope`] that lives exactly as long as the request.

pub mod convention;
pub mod registry;
pub mod scope;

pub use convention::{bind_role, ModuleManifest, Provider, DESCRIPTOR_MARKER};
pub use registry::{Lifetime, Registry, RegistryError};
pub use scope::RequestScope;

//! `armature-storage` — audited entity storage.
//!
//! In-memory persistence for dev/test: the store owns the audit lifecycle
//! (id/guid/creation stamps at insert, modification restamps on mutation,
//! soft delete via `is_active`).

pub mod seed;
pub mod store;

pub use seed::seed_if_empty;
pub use store::{EntityStore, InMemoryEntityStore};

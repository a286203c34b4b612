//! `armature-mapping` — object mapping + shared dependency composition.
//!
//! A process-wide mapping engine compiled once at startup from per-module
//! profile manifests, with one extension enabled: rules can also transform
//! structured filter expressions. The [`compose`] module is the composition
//! root that wires stores, role registrations, the mapping engine and the
//! diagnostics logger into the registry, in a fixed order.

pub mod compose;
pub mod engine;
pub mod filter;

pub use compose::{build_mapper, register, ComposeError, MappingModule};
pub use engine::{Mapper, MapperBuilder, MappingError};
pub use filter::{CompareOp, FilterExpr};

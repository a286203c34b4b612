//! `armature-messages` — the scaffold's worked example domain.
//!
//! One entity, a repository over the audited store, a service on top, and
//! the static manifest the convention registrar scans.

pub mod manifest;
pub mod message;
pub mod repository;
pub mod service;

pub use manifest::{bind_stores, seed, MANIFEST};
pub use message::{Message, NewMessage};
pub use repository::{MessagesRepository, StoredMessagesRepository};
pub use service::{DefaultMessagesService, MessagesService};

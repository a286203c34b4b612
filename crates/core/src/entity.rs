//! Entity trait + the audit block shared by every persisted entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::UserId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Identity and audit fields carried by every persisted entity.
///
/// The storage layer owns the lifecycle: `id`, `guid` and the creation stamps
/// are assigned at insert time, the modification stamps are rewritten on every
/// mutation, and `is_active` is the only delete this shape performs (soft
/// delete; rows are never hard-deleted through it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityAudit {
    pub id: i64,
    pub guid: Uuid,
    pub is_active: bool,
    pub created_on: DateTime<Utc>,
    pub created_by: UserId,
    pub modified_on: DateTime<Utc>,
    pub modified_by: UserId,
}

impl EntityAudit {
    /// Placeholder audit block for a record that has not been inserted yet.
    /// The storage layer replaces it wholesale at insert time.
    pub fn unsaved() -> Self {
        let nobody = UserId::from_uuid(Uuid::nil());
        let at = Utc::now();
        Self {
            id: 0,
            guid: Uuid::nil(),
            is_active: true,
            created_on: at,
            created_by: nobody,
            modified_on: at,
            modified_by: nobody,
        }
    }

    /// Build the audit block for a freshly inserted record.
    pub fn stamp_created(id: i64, actor: UserId, at: DateTime<Utc>) -> Self {
        Self {
            id,
            guid: Uuid::now_v7(),
            is_active: true,
            created_on: at,
            created_by: actor,
            modified_on: at,
            modified_by: actor,
        }
    }

    /// Rewrite the modification stamps for a mutation.
    pub fn stamp_modified(&mut self, actor: UserId, at: DateTime<Utc>) {
        self.modified_on = at;
        self.modified_by = actor;
    }

    /// Soft delete: clears `is_active` and restamps modification fields.
    pub fn deactivate(&mut self, actor: UserId, at: DateTime<Utc>) {
        self.is_active = false;
        self.stamp_modified(actor, at);
    }
}

/// Access to the audit block of a persisted entity.
pub trait Audited {
    fn audit(&self) -> &EntityAudit;
    fn audit_mut(&mut self) -> &mut EntityAudit;
}

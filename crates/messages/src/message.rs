//! Message entity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use armature_core::{Audited, Entity, EntityAudit};

/// A persisted message. The audit block is flattened so filters address its
/// fields (`guid`, `created_on`, ...) at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(flatten)]
    pub audit: EntityAudit,
    pub recipient: String,
    pub body: String,
}

impl Message {
    /// Build an unsaved message; the store assigns identity and stamps.
    pub fn new(recipient: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            audit: EntityAudit::unsaved(),
            recipient: recipient.into(),
            body: body.into(),
        }
    }
}

impl Entity for Message {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.audit.guid
    }
}

impl Audited for Message {
    fn audit(&self) -> &EntityAudit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut EntityAudit {
        &mut self.audit
    }
}

/// Fields accepted when creating a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub recipient: String,
    pub body: String,
}

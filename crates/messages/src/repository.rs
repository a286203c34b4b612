//! Messages repository over the audited entity store.

use std::sync::Arc;

use uuid::Uuid;

use armature_core::UserId;
use armature_mapping::FilterExpr;
use armature_storage::EntityStore;

use crate::message::{Message, NewMessage};

pub trait MessagesRepository: Send + Sync {
    fn add(&self, actor: UserId, message: NewMessage) -> Message;
    /// Active messages only; soft-deleted ones read as absent.
    fn find(&self, guid: Uuid) -> Option<Message>;
    /// Active messages matching `filter` (all of them when `None`), ordered
    /// by insertion.
    fn list(&self, filter: Option<&FilterExpr>) -> Vec<Message>;
    /// Soft delete. False when the message is absent or already removed.
    fn remove(&self, actor: UserId, guid: Uuid) -> bool;
}

pub struct StoredMessagesRepository {
    store: Arc<dyn EntityStore<Message>>,
}

impl StoredMessagesRepository {
    pub fn new(store: Arc<dyn EntityStore<Message>>) -> Self {
        Self { store }
    }
}

impl MessagesRepository for StoredMessagesRepository {
    fn add(&self, actor: UserId, message: NewMessage) -> Message {
        self.store
            .insert(actor, Message::new(message.recipient, message.body))
    }

    fn find(&self, guid: Uuid) -> Option<Message> {
        self.store.get(guid).filter(|m| m.audit.is_active)
    }

    fn list(&self, filter: Option<&FilterExpr>) -> Vec<Message> {
        let mut messages = self.store.list();

        if let Some(filter) = filter {
            messages.retain(|m| {
                serde_json::to_value(m)
                    .map(|v| filter.matches(&v))
                    .unwrap_or(false)
            });
        }

        messages.sort_by_key(|m| m.audit.id);
        messages
    }

    fn remove(&self, actor: UserId, guid: Uuid) -> bool {
        match self.store.get(guid) {
            Some(m) if m.audit.is_active => self.store.deactivate(actor, guid),
            _ => false,
        }
    }
}

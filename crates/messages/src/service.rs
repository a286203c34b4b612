//! Messages service: domain rules above the repository.

use std::sync::Arc;

use uuid::Uuid;

use armature_core::{DomainError, DomainResult, UserId};
use armature_mapping::FilterExpr;

use crate::message::{Message, NewMessage};
use crate::repository::MessagesRepository;

const MAX_RECIPIENT_LEN: usize = 256;
const MAX_BODY_LEN: usize = 4096;

pub trait MessagesService: Send + Sync {
    fn create(&self, actor: UserId, message: NewMessage) -> DomainResult<Message>;
    fn get(&self, guid: Uuid) -> DomainResult<Message>;
    fn list(&self, filter: Option<&FilterExpr>) -> Vec<Message>;
    fn remove(&self, actor: UserId, guid: Uuid) -> DomainResult<()>;
}

pub struct DefaultMessagesService {
    repository: Arc<dyn MessagesRepository>,
}

impl DefaultMessagesService {
    pub fn new(repository: Arc<dyn MessagesRepository>) -> Self {
        Self { repository }
    }
}

impl MessagesService for DefaultMessagesService {
    fn create(&self, actor: UserId, message: NewMessage) -> DomainResult<Message> {
        if message.recipient.trim().is_empty() {
            return Err(DomainError::validation("recipient must not be empty"));
        }
        if message.recipient.len() > MAX_RECIPIENT_LEN {
            return Err(DomainError::validation("recipient is too long"));
        }
        if message.body.trim().is_empty() {
            return Err(DomainError::validation("body must not be empty"));
        }
        if message.body.len() > MAX_BODY_LEN {
            return Err(DomainError::validation("body is too long"));
        }

        Ok(self.repository.add(actor, message))
    }

    fn get(&self, guid: Uuid) -> DomainResult<Message> {
        self.repository.find(guid).ok_or(DomainError::NotFound)
    }

    fn list(&self, filter: Option<&FilterExpr>) -> Vec<Message> {
        self.repository.list(filter)
    }

    fn remove(&self, actor: UserId, guid: Uuid) -> DomainResult<()> {
        if self.repository.remove(actor, guid) {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }
}

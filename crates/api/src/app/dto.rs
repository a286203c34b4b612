//! Request/response DTOs, wire mapping rules, and body validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use armature_mapping::{MapperBuilder, MappingError, MappingModule};
use armature_messages::{Message, NewMessage};

use crate::problem::{FieldErrors, Validate};

const MAX_RECIPIENT_LEN: usize = 256;
const MAX_BODY_LEN: usize = 4096;

// -------------------------
// Response DTOs
// -------------------------

/// Wire shape of a message (camelCase on the wire, `id` is the guid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: Uuid,
    pub recipient: String,
    pub body: String,
    pub is_active: bool,
    pub created_on: DateTime<Utc>,
    pub modified_on: DateTime<Utc>,
}

/// XML list envelope; the JSON path serializes the plain vector instead.
#[derive(Debug, Serialize)]
pub struct MessageListDto {
    pub message: Vec<MessageDto>,
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub body: String,
}

impl Validate for CreateMessageRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.recipient.trim().is_empty() {
            field_error(&mut errors, "recipient", "The recipient field is required.");
        } else if self.recipient.len() > MAX_RECIPIENT_LEN {
            field_error(
                &mut errors,
                "recipient",
                "The recipient field must be at most 256 characters.",
            );
        }

        if self.body.trim().is_empty() {
            field_error(&mut errors, "body", "The body field is required.");
        } else if self.body.len() > MAX_BODY_LEN {
            field_error(
                &mut errors,
                "body",
                "The body field must be at most 4096 characters.",
            );
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl From<CreateMessageRequest> for NewMessage {
    fn from(request: CreateMessageRequest) -> Self {
        Self {
            recipient: request.recipient,
            body: request.body,
        }
    }
}

fn field_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesQuery {
    pub recipient: Option<String>,
}

// -------------------------
// Mapping rules
// -------------------------

pub fn message_to_dto(message: &Message) -> MessageDto {
    MessageDto {
        id: message.audit.guid,
        recipient: message.recipient.clone(),
        body: message.body.clone(),
        is_active: message.audit.is_active,
        created_on: message.audit.created_on,
        modified_on: message.audit.modified_on,
    }
}

/// Domain field ↔ wire field correspondences for filter mapping.
const MESSAGE_FIELDS: &[(&str, &str)] = &[
    ("guid", "id"),
    ("recipient", "recipient"),
    ("body", "body"),
    ("is_active", "isActive"),
    ("created_on", "createdOn"),
    ("modified_on", "modifiedOn"),
];

fn message_profile(builder: &mut MapperBuilder) -> Result<(), MappingError> {
    builder.rule_with_fields::<Message, MessageDto>(message_to_dto, MESSAGE_FIELDS)
}

/// Mapping profiles this crate contributes to the composition root.
pub static MAPPINGS: MappingModule = MappingModule {
    module: "api",
    profiles: &[message_profile],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_collects_all_field_errors() {
        let request = CreateMessageRequest {
            recipient: String::new(),
            body: "   ".to_string(),
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["recipient"], ["The recipient field is required."]);
        assert_eq!(errors["body"], ["The body field is required."]);
    }

    #[test]
    fn create_request_accepts_valid_input() {
        let request = CreateMessageRequest {
            recipient: "ops".to_string(),
            body: "disk almost full".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn dto_takes_identity_from_the_audit_block() {
        let message = Message::new("ops", "hello");
        let dto = message_to_dto(&message);

        assert_eq!(dto.id, message.audit.guid);
        assert_eq!(dto.recipient, "ops");
        assert_eq!(dto.body, "hello");
        assert!(dto.is_active);
    }
}

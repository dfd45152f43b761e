//! State-changing to-do requests.

use chrono::{DateTime, Utc};
use common::TodoId;
use serde::{Deserialize, Serialize};
use store::constraints::{MAX_NOTE_LENGTH, MAX_TITLE_LENGTH, MIN_TITLE_LENGTH};

use super::response::TodoResponse;
use crate::messages::validator_message;
use crate::request::{Request, RequestKind, Validatable, Validation};

/// Checks shared by every request that writes a title and priority.
fn validate_title_and_priority(title: &str, priority: i32) -> Validation {
    let length = title.chars().count();
    if length < MIN_TITLE_LENGTH {
        return Validation::invalid(validator_message::min_length("Title", MIN_TITLE_LENGTH));
    }
    if length > MAX_TITLE_LENGTH {
        return Validation::invalid(validator_message::max_length("Title", MAX_TITLE_LENGTH));
    }
    if priority < 0 {
        return Validation::invalid(validator_message::min_length("Priority", 0));
    }
    Validation::Valid
}

fn validate_note(note: Option<&str>) -> Validation {
    match note {
        Some(note) if note.chars().count() > MAX_NOTE_LENGTH => {
            Validation::invalid(validator_message::max_length("Note", MAX_NOTE_LENGTH))
        }
        _ => Validation::Valid,
    }
}

/// Creates a new to-do item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    pub priority: i32,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub reminder: Option<DateTime<Utc>>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>, priority: i32) -> Self {
        Self {
            title: title.into(),
            priority,
            ..Self::default()
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_reminder(mut self, reminder: DateTime<Utc>) -> Self {
        self.reminder = Some(reminder);
        self
    }
}

impl Validatable for CreateTodo {
    fn validate(&self) -> Validation {
        let validation = validate_title_and_priority(&self.title, self.priority);
        if !validation.is_valid() {
            return validation;
        }
        validate_note(self.note.as_deref())
    }
}

impl Request for CreateTodo {
    type Response = TodoResponse;
    const KIND: RequestKind = RequestKind::Command;
}

/// Replaces the title, priority, and note of an existing item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[serde(default = "TodoId::nil")]
    pub id: TodoId,
    pub title: String,
    pub priority: i32,
    #[serde(default)]
    pub note: Option<String>,
}

impl UpdateTodo {
    pub fn new(id: TodoId, title: impl Into<String>, priority: i32) -> Self {
        Self {
            id,
            title: title.into(),
            priority,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl Validatable for UpdateTodo {
    fn validate(&self) -> Validation {
        if self.id.is_nil() {
            return Validation::invalid(validator_message::INVALID_ID);
        }
        let validation = validate_title_and_priority(&self.title, self.priority);
        if !validation.is_valid() {
            return validation;
        }
        validate_note(self.note.as_deref())
    }
}

impl Request for UpdateTodo {
    type Response = TodoResponse;
    const KIND: RequestKind = RequestKind::Command;
}

/// Removes an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTodo {
    pub id: TodoId,
}

impl DeleteTodo {
    pub fn new(id: TodoId) -> Self {
        Self { id }
    }
}

impl Validatable for DeleteTodo {
    fn validate(&self) -> Validation {
        if self.id.is_nil() {
            return Validation::invalid(validator_message::INVALID_ID);
        }
        Validation::Valid
    }
}

impl Request for DeleteTodo {
    type Response = bool;
    const KIND: RequestKind = RequestKind::Command;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(validation: Validation) -> Option<String> {
        validation.message().map(str::to_string)
    }

    #[test]
    fn create_accepts_boundary_lengths() {
        assert!(CreateTodo::new("x", 0).validate().is_valid());
        assert!(CreateTodo::new("x".repeat(500), 3).validate().is_valid());
    }

    #[test]
    fn create_rejects_empty_title() {
        assert_eq!(
            message(CreateTodo::new("", 1).validate()).as_deref(),
            Some("The field 'Title' must be more than 1 characters.")
        );
    }

    #[test]
    fn create_rejects_long_title() {
        assert_eq!(
            message(CreateTodo::new("x".repeat(501), 1).validate()).as_deref(),
            Some("The field 'Title' must be less than 500 characters.")
        );
    }

    #[test]
    fn create_rejects_long_note() {
        let validation = CreateTodo::new("a", 1).with_note("n".repeat(501)).validate();
        assert_eq!(
            message(validation).as_deref(),
            Some("The field 'Note' must be less than 500 characters.")
        );
        assert!(CreateTodo::new("a", 1).with_note("n".repeat(500)).validate().is_valid());
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        assert!(CreateTodo::new("é".repeat(500), 1).validate().is_valid());
    }

    #[test]
    fn create_rejects_negative_priority() {
        assert_eq!(
            message(CreateTodo::new("a", -1).validate()).as_deref(),
            Some("The field 'Priority' must be more than 0 characters.")
        );
    }

    #[test]
    fn title_is_checked_before_priority() {
        let validation = CreateTodo::new("", -1).validate();
        assert!(validation.message().unwrap().contains("'Title'"));
    }

    #[test]
    fn update_rejects_nil_id_first() {
        let validation = UpdateTodo::new(TodoId::nil(), "", -1).validate();
        assert_eq!(validation.message(), Some(validator_message::INVALID_ID));
    }

    #[test]
    fn update_rejects_long_note() {
        let update = UpdateTodo::new(TodoId::new(), "a", 1).with_note("n".repeat(501));
        assert_eq!(
            message(update.validate()).as_deref(),
            Some("The field 'Note' must be less than 500 characters.")
        );
        let update = UpdateTodo::new(TodoId::new(), "a", 1).with_note("n".repeat(500));
        assert!(update.validate().is_valid());
    }

    #[test]
    fn delete_rejects_nil_id() {
        assert!(!DeleteTodo::new(TodoId::nil()).validate().is_valid());
        assert!(DeleteTodo::new(TodoId::new()).validate().is_valid());
    }

    #[test]
    fn update_body_without_id_deserializes_to_nil() {
        let update: UpdateTodo = serde_json::from_str(r#"{"title":"a","priority":1}"#).unwrap();
        assert!(update.id.is_nil());
    }

    #[test]
    fn create_body_requires_title_and_priority() {
        assert!(serde_json::from_str::<CreateTodo>("{}").is_err());
        let create: CreateTodo =
            serde_json::from_str(r#"{"title":"","priority":1,"note":null}"#).unwrap();
        assert!(!create.validate().is_valid());
    }
}

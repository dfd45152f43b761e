//! Persisted entity model.

use chrono::{DateTime, Utc};
use common::TodoId;
use serde::{Deserialize, Serialize};

/// Column limits shared by validation and the database schema.
pub mod constraints {
    pub const MIN_TITLE_LENGTH: usize = 1;
    pub const MAX_TITLE_LENGTH: usize = 500;
    pub const MAX_NOTE_LENGTH: usize = 500;
    pub const MAX_AUDIT_BY_LENGTH: usize = 50;
}

/// Creation and modification metadata carried by every auditable entity.
///
/// All four fields are written only by the audit interceptor while
/// changes are being saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub created: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub last_modified_by: Option<String>,
}

/// Capability of entities whose writes are stamped with audit metadata.
pub trait Auditable {
    fn audit(&self) -> &AuditStamp;

    fn audit_mut(&mut self) -> &mut AuditStamp;
}

/// A persisted entity with a stable identity.
pub trait Entity: Auditable + Clone + Send + Sync + 'static {
    /// Identity type. Assigned at creation and never changed.
    type Id: Copy + Eq + std::hash::Hash + std::fmt::Display + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoEntity {
    id: TodoId,
    pub title: String,
    pub note: Option<String>,
    pub priority: i32,
    pub reminder: Option<DateTime<Utc>>,
    #[serde(flatten)]
    audit: AuditStamp,
}

impl TodoEntity {
    /// Creates a new, unsaved item with a fresh ID and empty audit stamp.
    pub fn new(
        title: impl Into<String>,
        priority: i32,
        note: Option<String>,
        reminder: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: TodoId::new(),
            title: title.into(),
            note,
            priority,
            reminder,
            audit: AuditStamp::default(),
        }
    }

    /// Rebuilds an item from stored columns.
    pub fn from_parts(
        id: TodoId,
        title: String,
        note: Option<String>,
        priority: i32,
        reminder: Option<DateTime<Utc>>,
        audit: AuditStamp,
    ) -> Self {
        Self {
            id,
            title,
            note,
            priority,
            reminder,
            audit,
        }
    }
}

impl Auditable for TodoEntity {
    fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditStamp {
        &mut self.audit
    }
}

impl Entity for TodoEntity {
    type Id = TodoId;

    fn id(&self) -> TodoId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entity_has_fresh_id_and_empty_stamp() {
        let a = TodoEntity::new("Buy milk", 1, None, None);
        let b = TodoEntity::new("Buy milk", 1, None, None);

        assert_ne!(a.id(), b.id());
        assert!(!a.id().is_nil());
        assert_eq!(a.audit(), &AuditStamp::default());
    }

    #[test]
    fn audit_fields_flatten_into_entity_json() {
        let entity = TodoEntity::new("Buy milk", 2, Some("semi-skimmed".to_string()), None);
        let json = serde_json::to_value(&entity).unwrap();

        assert_eq!(json["title"], "Buy milk");
        assert_eq!(json["priority"], 2);
        assert!(json.get("created").is_some());
        assert!(json.get("audit").is_none());
    }
}

use common::TodoId;
use serde::{Deserialize, Serialize};
use store::{Entity, TodoEntity};

/// Public view of a to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoResponse {
    pub id: TodoId,
    pub title: String,
    pub priority: i32,
    pub note: Option<String>,
}

impl From<&TodoEntity> for TodoResponse {
    fn from(entity: &TodoEntity) -> Self {
        Self {
            id: entity.id(),
            title: entity.title.clone(),
            priority: entity.priority,
            note: entity.note.clone(),
        }
    }
}

impl From<TodoEntity> for TodoResponse {
    fn from(entity: TodoEntity) -> Self {
        Self {
            id: entity.id(),
            title: entity.title,
            priority: entity.priority,
            note: entity.note,
        }
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a to-do item.
///
/// Wraps a UUID so that item IDs cannot be mixed up with user IDs or
/// other UUID-based identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Creates a new random ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The all-zero ID. Never assigned to a stored item.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Creates an ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true for the all-zero ID.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TodoId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<TodoId> for Uuid {
    fn from(id: TodoId) -> Self {
        id.0
    }
}

/// Identity of the caller performing a write.
///
/// Unauthenticated callers are represented by the nil UUID rather than by
/// an absent value, so audit stamps are always populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// The sentinel identity used when no caller is authenticated.
    pub fn anonymous() -> Self {
        Self(Uuid::nil())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a user ID, falling back to the anonymous sentinel for
    /// missing or malformed input.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(Self)
            .unwrap_or_else(Self::anonymous)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_nil()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

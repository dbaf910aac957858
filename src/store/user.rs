//! User record and request body shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier, immutable after creation.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
}

impl User {
    /// Create a user with an explicit id.
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Body accepted by create and update.
///
/// Only the JSON structure is checked: absent fields become empty strings
/// and an `id` of any JSON type is accepted and then ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInput {
    /// Caller-supplied id, never stored.
    #[serde(default)]
    pub id: Option<Value>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
}

impl UserInput {
    /// Create an input with no id.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Materialize into a stored record under `id`.
    pub fn into_user(self, id: impl Into<String>) -> User {
        User {
            id: id.into(),
            name: self.name,
            email: self.email,
        }
    }
}

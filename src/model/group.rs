//! Group entity
//!
//! Groups are named containers for combos. Referential integrity
//! (every combo's `group_id` pointing at a real group) is enforced by
//! the backend, not re-checked by consumers of the cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, user-defined container for combos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Group {
    /// Create a group with a generated id and empty description
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            enabled: true,
            created_at: now,
            modified_at: now,
        }
    }

    /// Create a group with a description
    #[must_use]
    pub fn with_description(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut group = Self::new(name);
        group.description = description.into();
        group
    }
}

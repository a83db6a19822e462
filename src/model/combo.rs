//! Combo entity, creation drafts, and partial updates
//!
//! A combo maps a typed keyword to an expanded snippet of text. The
//! backend is the authority for ids and timestamps; this module only
//! defines the shapes that cross that boundary and the validation rules
//! both sides agree on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::matching::MatchingMode;

/// Validation failures for combo drafts and patched combos
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComboValidationError {
    /// Keyword is empty
    #[error("Keyword must not be empty")]
    EmptyKeyword,

    /// Keyword is shorter than the two-character minimum
    #[error("Keyword must be at least 2 characters, got {0}")]
    KeywordTooShort(usize),

    /// Keyword contains whitespace, which the expansion engine rejects
    #[error("Keyword must not contain spaces")]
    KeywordContainsSpaces,

    /// Snippet body is empty
    #[error("Snippet must not be empty")]
    EmptySnippet,
}

/// A keyword-triggered text snippet
///
/// The id is immutable after creation. Keyword and snippet bounds are
/// validated at the backend boundary, not re-checked by consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combo {
    /// Stable unique identifier, assigned at creation
    pub id: Uuid,

    /// Display name shown in lists
    pub name: String,

    /// Free-text description
    pub description: String,

    /// The trigger keyword
    pub keyword: String,

    /// The expansion body
    pub snippet: String,

    /// Owning group
    pub group_id: Uuid,

    /// How the keyword is matched in running text
    pub matching_mode: MatchingMode,

    /// Whether keyword matching is case sensitive
    pub case_sensitive: bool,

    /// Whether this combo participates in expansion and search
    pub enabled: bool,

    /// Number of times this combo has been expanded
    pub use_count: u64,

    /// When this combo was last expanded, if ever
    pub last_used: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl Combo {
    /// Validate the keyword and snippet against the shared rules
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ComboValidationError`].
    pub fn validate(&self) -> Result<(), ComboValidationError> {
        validate_fields(&self.keyword, &self.snippet)
    }

    /// The `last_used` timestamp as epoch milliseconds, never-used as 0
    ///
    /// Sorting by this value puts never-used combos at the oldest end.
    #[must_use]
    pub fn last_used_millis(&self) -> i64 {
        self.last_used.map_or(0, |t| t.timestamp_millis())
    }
}

/// Input for creating a new combo
///
/// Carries everything the caller decides; the backend stamps id,
/// timestamps, and zeroed usage counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboDraft {
    pub name: String,
    pub description: String,
    pub keyword: String,
    pub snippet: String,
    pub group_id: Uuid,
    pub matching_mode: MatchingMode,
    pub case_sensitive: bool,
}

impl ComboDraft {
    /// Create a draft with the required fields and defaults for the rest
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        keyword: impl Into<String>,
        snippet: impl Into<String>,
        group_id: Uuid,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            keyword: keyword.into(),
            snippet: snippet.into(),
            group_id,
            matching_mode: MatchingMode::default(),
            case_sensitive: false,
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the matching mode
    #[must_use]
    pub const fn with_matching_mode(mut self, mode: MatchingMode) -> Self {
        self.matching_mode = mode;
        self
    }

    /// Set case sensitivity
    #[must_use]
    pub const fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Validate the draft against the shared rules
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ComboValidationError`].
    pub fn validate(&self) -> Result<(), ComboValidationError> {
        validate_fields(&self.keyword, &self.snippet)
    }

    /// Materialize the draft into a combo with fresh id and timestamps
    ///
    /// # Errors
    ///
    /// Returns a [`ComboValidationError`] if the draft is invalid.
    pub fn build(self) -> Result<Combo, ComboValidationError> {
        self.validate()?;
        let now = Utc::now();
        Ok(Combo {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            keyword: self.keyword,
            snippet: self.snippet,
            group_id: self.group_id,
            matching_mode: self.matching_mode,
            case_sensitive: self.case_sensitive,
            enabled: true,
            use_count: 0,
            last_used: None,
            created_at: now,
            modified_at: now,
        })
    }
}

/// Partial update for an existing combo
///
/// Only `Some` fields are changed. Identifier, usage counters, and
/// timestamps are never patchable from this side of the boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub keyword: Option<String>,
    pub snippet: Option<String>,
    pub group_id: Option<Uuid>,
    pub matching_mode: Option<MatchingMode>,
    pub case_sensitive: Option<bool>,
    pub enabled: Option<bool>,
}

impl ComboPatch {
    /// A patch that changes nothing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the patch carries no changes
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.keyword.is_none()
            && self.snippet.is_none()
            && self.group_id.is_none()
            && self.matching_mode.is_none()
            && self.case_sensitive.is_none()
            && self.enabled.is_none()
    }

    /// Apply the patch to a combo, bumping its modification timestamp
    pub fn apply(&self, combo: &mut Combo) {
        if let Some(name) = &self.name {
            combo.name = name.clone();
        }
        if let Some(description) = &self.description {
            combo.description = description.clone();
        }
        if let Some(keyword) = &self.keyword {
            combo.keyword = keyword.clone();
        }
        if let Some(snippet) = &self.snippet {
            combo.snippet = snippet.clone();
        }
        if let Some(group_id) = self.group_id {
            combo.group_id = group_id;
        }
        if let Some(mode) = self.matching_mode {
            combo.matching_mode = mode;
        }
        if let Some(case_sensitive) = self.case_sensitive {
            combo.case_sensitive = case_sensitive;
        }
        if let Some(enabled) = self.enabled {
            combo.enabled = enabled;
        }
        combo.modified_at = Utc::now();
    }
}

fn validate_fields(keyword: &str, snippet: &str) -> Result<(), ComboValidationError> {
    if keyword.is_empty() {
        return Err(ComboValidationError::EmptyKeyword);
    }
    let length = keyword.chars().count();
    if length < 2 {
        return Err(ComboValidationError::KeywordTooShort(length));
    }
    if keyword.contains(char::is_whitespace) {
        return Err(ComboValidationError::KeywordContainsSpaces);
    }
    if snippet.is_empty() {
        return Err(ComboValidationError::EmptySnippet);
    }
    Ok(())
}

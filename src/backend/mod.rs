//! Asynchronous backend interface
//!
//! The store and search controller never touch persistence, the
//! expansion engine, or transport directly; everything round-trips
//! through [`ComboBackend`]. Implementations decide where the data
//! actually lives: the bundled [`memory::MemoryBackend`] keeps it
//! in-process, a host application may proxy over IPC instead.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Combo, ComboDraft, ComboPatch, ComboValidationError, Group};

pub use memory::MemoryBackend;

/// Backend operation errors
#[derive(Debug, Error)]
pub enum BackendError {
    /// No combo with the given id exists
    #[error("Combo not found: {0}")]
    ComboNotFound(Uuid),

    /// No group with the given id exists
    #[error("Group not found: {0}")]
    GroupNotFound(Uuid),

    /// The input failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ComboValidationError),

    /// Storage or transport failure, opaque to this layer
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// The narrow asynchronous interface the core consumes
///
/// Every call either resolves with an authoritative value or rejects
/// with a [`BackendError`]. Retry policy, if any, lives behind this
/// trait; callers surface failures and leave local state untouched.
#[async_trait]
pub trait ComboBackend: Send + Sync {
    /// Load the full combo collection
    async fn load_all_items(&self) -> Result<Vec<Combo>, BackendError>;

    /// Create a combo from a draft, returning the stored record
    async fn create_item(&self, draft: ComboDraft) -> Result<Combo, BackendError>;

    /// Apply a partial update, returning the stored record
    async fn update_item(&self, id: Uuid, patch: ComboPatch) -> Result<Combo, BackendError>;

    /// Delete a combo
    async fn delete_item(&self, id: Uuid) -> Result<(), BackendError>;

    /// Copy a combo under a fresh id, returning the copy
    async fn duplicate_item(&self, id: Uuid) -> Result<Combo, BackendError>;

    /// Flip a combo's enabled flag, returning the new state
    async fn toggle_item_enabled(&self, id: Uuid) -> Result<bool, BackendError>;

    /// Reassign a combo to another group
    async fn move_item_to_group(&self, item_id: Uuid, group_id: Uuid) -> Result<(), BackendError>;

    /// Search combos by free-text query, best matches first
    async fn search_items(&self, query: &str) -> Result<Vec<Combo>, BackendError>;

    /// Load all groups
    async fn load_all_groups(&self) -> Result<Vec<Group>, BackendError>;
}

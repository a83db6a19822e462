//! Combodeck - the selection and incremental-search core of a
//! keyword-triggered text snippet manager
//!
//! This crate owns the UI-facing state of a combo library: a
//! write-through collection cache ([`store::ComboStore`]), a
//! multi-select model with anchor/range semantics
//! ([`select::SelectionModel`]), a pure filter/sort projection
//! ([`view::project`]), a debounced generation-tagged search session
//! ([`search::SearchController`]), and a keyboard cursor
//! ([`nav::Navigator`]). Persistence, the expansion engine, and
//! platform hooks live behind the [`backend::ComboBackend`] trait.
//!
//! Instances are created by the hosting shell and passed by reference;
//! nothing in this crate is a global.

use thiserror::Error;

pub mod backend;
pub mod model;
pub mod nav;
pub mod search;
pub mod select;
pub mod store;
pub mod view;

pub use backend::{BackendError, ComboBackend, MemoryBackend};
pub use model::{Combo, ComboDraft, ComboPatch, ComboValidationError, Group, MatchingMode};
pub use nav::{Direction, Navigator};
pub use search::{SearchController, SearchPhase, SearchTuning};
pub use select::{SelectMode, SelectionModel};
pub use store::{ComboStore, StoreError};
pub use view::{SortDirection, SortKey, ViewOptions};

/// Error enum covering all failure states of the crate
#[derive(Debug, Error)]
pub enum CombodeckError {
    /// Backend error
    #[error("Backend error: {0}")]
    Backend(#[from] backend::BackendError),
    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(#[from] model::ComboValidationError),
}

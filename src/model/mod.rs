//! Core data model: combos, groups, and matching modes
//!
//! These are pure data structures with minimal logic. The store and
//! backend layers own all mutation; model types only carry field data,
//! validation, and patch application.

pub mod combo;
pub mod group;
pub mod matching;

pub use combo::{Combo, ComboDraft, ComboPatch, ComboValidationError};
pub use group::Group;
pub use matching::MatchingMode;

//! Keyword matching modes

use serde::{Deserialize, Serialize};

/// How a combo's keyword is recognized in running text
///
/// The expansion engine consumes this; within this crate it is an
/// opaque tag carried through create/update and search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchingMode {
    /// Keyword must sit on a word boundary
    #[default]
    Strict,
    /// Keyword triggers even mid-word
    Loose,
}

impl MatchingMode {
    /// Short description for UI labels
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Strict => "strict (word boundary)",
            Self::Loose => "loose (mid-word)",
        }
    }
}

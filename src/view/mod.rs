//! Filter/sort projection
//!
//! A pure function from (collection, view options) to an ordered list of
//! combo ids. Nothing here mutates the collection; callers re-run the
//! projection whenever the collection or any option changes, and
//! identical inputs always produce identical output.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Combo;

/// Sort column for the combo list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Name,
    Keyword,
    LastUsed,
    UseCount,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Flip the direction
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Inputs to the projection besides the collection itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Restrict to a single group, or show all
    pub group: Option<Uuid>,

    /// Free-text filter, matched case-insensitively as a substring of
    /// name, keyword, description, or snippet
    pub query: String,

    /// Sort column
    pub sort_key: SortKey,

    /// Sort direction
    pub direction: SortDirection,
}

impl ViewOptions {
    /// Select a sort column
    ///
    /// Picking the current column flips the direction; picking a new
    /// column resets to ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.direction = self.direction.flipped();
        } else {
            self.sort_key = key;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Project the collection into an ordered list of ids
///
/// Filtering runs before sorting: group restriction first, then the
/// trimmed query. The sort is stable, so combos that compare equal keep
/// their relative collection order.
#[must_use]
pub fn project(combos: &[Combo], options: &ViewOptions) -> Vec<Uuid> {
    let needle = options.query.trim().to_lowercase();

    let mut kept: Vec<&Combo> = combos
        .iter()
        .filter(|c| options.group.is_none_or(|g| c.group_id == g))
        .filter(|c| needle.is_empty() || matches_query(c, &needle))
        .collect();

    // The direction reverses the comparator, not the sorted output, so
    // ties keep their collection order under either direction.
    let dir = options.direction;
    match options.sort_key {
        SortKey::Name => {
            kept.sort_by(|a, b| oriented(dir, a.name.to_lowercase().cmp(&b.name.to_lowercase())));
        }
        SortKey::Keyword => {
            kept.sort_by(|a, b| {
                oriented(dir, a.keyword.to_lowercase().cmp(&b.keyword.to_lowercase()))
            });
        }
        SortKey::LastUsed => {
            kept.sort_by(|a, b| oriented(dir, a.last_used_millis().cmp(&b.last_used_millis())));
        }
        SortKey::UseCount => {
            kept.sort_by(|a, b| oriented(dir, a.use_count.cmp(&b.use_count)));
        }
    }

    kept.into_iter().map(|c| c.id).collect()
}

const fn oriented(direction: SortDirection, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

fn matches_query(combo: &Combo, needle: &str) -> bool {
    combo.name.to_lowercase().contains(needle)
        || combo.keyword.to_lowercase().contains(needle)
        || combo.description.to_lowercase().contains(needle)
        || combo.snippet.to_lowercase().contains(needle)
}

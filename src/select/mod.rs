//! Multi-select model with anchor/range semantics
//!
//! Tracks which combo ids are selected, in insertion order, and derives
//! a primary id from that order. Range selection is computed against an
//! order slice supplied by the caller; the store passes its current
//! filtered/sorted view, so a shift-range can only cover visible items.

use uuid::Uuid;

use crate::model::Combo;

/// How a select gesture combines with the existing selection
///
/// The tagged variant keeps conflicting modifier combinations
/// unrepresentable: a gesture is exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Selection becomes exactly the target id
    Replace,

    /// Toggle the target id's membership, leaving the rest alone
    Toggle,

    /// Add every id between the anchor and the target, inclusive
    RangeTo {
        /// The previously touched selected id forming the other endpoint
        anchor: Uuid,
    },
}

/// Insertion-ordered selection of combo ids
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    /// Selected ids in insertion order; membership is unique
    ids: Vec<Uuid>,

    /// Most recently touched selected id, the next range anchor
    last_touched: Option<Uuid>,
}

impl SelectionModel {
    /// Create an empty selection
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ids: Vec::new(),
            last_touched: None,
        }
    }

    /// Apply a select gesture
    ///
    /// `order` is the id sequence range selection indexes into. A
    /// `target` of `None` clears the selection regardless of mode. A
    /// range whose anchor or target is absent from `order` degrades to
    /// `Replace`, which is the observable behavior of clicking without
    /// a usable anchor.
    pub fn apply(&mut self, order: &[Uuid], target: Option<Uuid>, mode: SelectMode) {
        let Some(id) = target else {
            self.clear();
            return;
        };

        match mode {
            SelectMode::Replace => {
                self.ids.clear();
                self.ids.push(id);
                self.last_touched = Some(id);
            }
            SelectMode::Toggle => {
                if let Some(pos) = self.ids.iter().position(|&x| x == id) {
                    self.ids.remove(pos);
                    // Anchor falls back to the most recently inserted
                    // survivor when the toggled-off id held it
                    if self.last_touched == Some(id) {
                        self.last_touched = self.ids.last().copied();
                    }
                } else {
                    self.ids.push(id);
                    self.last_touched = Some(id);
                }
            }
            SelectMode::RangeTo { anchor } => {
                let anchor_idx = order.iter().position(|&x| x == anchor);
                let target_idx = order.iter().position(|&x| x == id);
                let (Some(a), Some(b)) = (anchor_idx, target_idx) else {
                    self.apply(order, Some(id), SelectMode::Replace);
                    return;
                };
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                for &span_id in &order[lo..=hi] {
                    if !self.ids.contains(&span_id) {
                        self.ids.push(span_id);
                    }
                }
                self.last_touched = Some(id);
            }
        }
    }

    /// Replace the selection wholesale
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
        self.last_touched = self.ids.last().copied();
    }

    /// Empty the selection
    pub fn clear(&mut self) {
        self.ids.clear();
        self.last_touched = None;
    }

    /// Remove an id, e.g. after the combo was deleted
    pub fn remove(&mut self, id: Uuid) {
        self.ids.retain(|&x| x != id);
        if self.last_touched == Some(id) {
            self.last_touched = self.ids.last().copied();
        }
    }

    /// Drop every id not present in `existing`
    ///
    /// Called after a collection reload so the selection never refers to
    /// combos that no longer exist.
    pub fn retain_existing(&mut self, existing: &[Uuid]) {
        self.ids.retain(|id| existing.contains(id));
        if let Some(anchor) = self.last_touched
            && !self.ids.contains(&anchor)
        {
            self.last_touched = self.ids.last().copied();
        }
    }

    /// The derived primary id: first by insertion order, or `None`
    #[must_use]
    pub fn primary(&self) -> Option<Uuid> {
        self.ids.first().copied()
    }

    /// The current range anchor, if any selection was touched
    #[must_use]
    pub const fn anchor(&self) -> Option<Uuid> {
        self.last_touched
    }

    /// Whether the id is currently selected
    #[must_use]
    pub fn contains(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    /// Number of selected ids
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in insertion order
    #[must_use]
    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }

    /// The selected combos out of `combos`, in collection order
    ///
    /// Ids that no longer resolve to a combo are silently dropped.
    #[must_use]
    pub fn selected_in<'a>(&self, combos: &'a [Combo]) -> Vec<&'a Combo> {
        combos.iter().filter(|c| self.contains(c.id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_replace_selects_exactly_one() {
        let order = ids(3);
        let mut sel = SelectionModel::new();

        sel.apply(&order, Some(order[0]), SelectMode::Replace);
        sel.apply(&order, Some(order[2]), SelectMode::Replace);

        assert_eq!(sel.ids(), &[order[2]]);
        assert_eq!(sel.primary(), Some(order[2]));
    }

    #[test]
    fn test_clear_via_none_target() {
        let order = ids(2);
        let mut sel = SelectionModel::new();
        sel.apply(&order, Some(order[0]), SelectMode::Replace);

        sel.apply(&order, None, SelectMode::Toggle);
        assert!(sel.is_empty());
        assert_eq!(sel.primary(), None);
        assert_eq!(sel.anchor(), None);
    }

    #[test]
    fn test_toggle_membership() {
        let order = ids(3);
        let mut sel = SelectionModel::new();

        sel.apply(&order, Some(order[0]), SelectMode::Replace);
        sel.apply(&order, Some(order[1]), SelectMode::Toggle);
        assert_eq!(sel.len(), 2);

        sel.apply(&order, Some(order[0]), SelectMode::Toggle);
        assert_eq!(sel.ids(), &[order[1]]);
        assert_eq!(sel.primary(), Some(order[1]));
    }

    #[test]
    fn test_range_selects_inclusive_span() {
        let order = ids(3);
        let mut sel = SelectionModel::new();

        sel.apply(&order, Some(order[0]), SelectMode::Replace);
        let anchor = sel.anchor().unwrap();
        sel.apply(&order, Some(order[2]), SelectMode::RangeTo { anchor });

        assert_eq!(sel.len(), 3);
        assert!(order.iter().all(|&id| sel.contains(id)));
        // Primary stays the first-inserted id
        assert_eq!(sel.primary(), Some(order[0]));
    }

    #[test]
    fn test_range_preserves_outside_selections() {
        let order = ids(5);
        let mut sel = SelectionModel::new();

        // Select something outside the coming range, then range 2..=4
        sel.apply(&order, Some(order[0]), SelectMode::Toggle);
        sel.apply(&order, Some(order[2]), SelectMode::Toggle);
        sel.apply(
            &order,
            Some(order[4]),
            SelectMode::RangeTo { anchor: order[2] },
        );

        assert!(sel.contains(order[0]));
        assert!(sel.contains(order[2]));
        assert!(sel.contains(order[3]));
        assert!(sel.contains(order[4]));
        assert!(!sel.contains(order[1]));
    }

    #[test]
    fn test_range_backwards() {
        let order = ids(4);
        let mut sel = SelectionModel::new();

        sel.apply(&order, Some(order[3]), SelectMode::Replace);
        sel.apply(
            &order,
            Some(order[1]),
            SelectMode::RangeTo { anchor: order[3] },
        );

        assert_eq!(sel.len(), 3);
        assert!(!sel.contains(order[0]));
        assert_eq!(sel.anchor(), Some(order[1]));
    }

    #[test]
    fn test_range_with_stale_anchor_degrades_to_replace() {
        let order = ids(3);
        let gone = Uuid::new_v4();
        let mut sel = SelectionModel::new();

        sel.apply(&order, Some(order[1]), SelectMode::RangeTo { anchor: gone });
        assert_eq!(sel.ids(), &[order[1]]);
    }

    #[test]
    fn test_select_all_dedupes() {
        let order = ids(2);
        let mut sel = SelectionModel::new();
        sel.select_all([order[0], order[1], order[0]]);
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.primary(), Some(order[0]));
    }

    #[test]
    fn test_remove_clears_primary_when_last() {
        let order = ids(1);
        let mut sel = SelectionModel::new();
        sel.apply(&order, Some(order[0]), SelectMode::Replace);

        sel.remove(order[0]);
        assert!(sel.is_empty());
        assert_eq!(sel.primary(), None);
        assert_eq!(sel.anchor(), None);
    }

    #[test]
    fn test_retain_existing_prunes_stale_ids() {
        let order = ids(3);
        let mut sel = SelectionModel::new();
        sel.select_all(order.clone());

        sel.retain_existing(&order[1..]);
        assert_eq!(sel.ids(), &order[1..]);
        assert_eq!(sel.primary(), Some(order[1]));
    }

    #[test]
    fn test_selected_in_drops_missing_and_keeps_collection_order() {
        use crate::model::ComboDraft;
        let gid = Uuid::new_v4();
        let combos: Vec<_> = ["aa", "bb", "cc"]
            .iter()
            .map(|kw| ComboDraft::new(*kw, *kw, "body", gid).build().unwrap())
            .collect();

        let mut sel = SelectionModel::new();
        // Insertion order deliberately reversed relative to the collection
        sel.select_all([combos[2].id, combos[0].id, Uuid::new_v4()]);

        let picked = sel.selected_in(&combos);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].id, combos[0].id);
        assert_eq!(picked[1].id, combos[2].id);
    }

    #[test]
    fn test_toggle_off_anchor_falls_back() {
        let order = ids(3);
        let mut sel = SelectionModel::new();
        sel.apply(&order, Some(order[0]), SelectMode::Toggle);
        sel.apply(&order, Some(order[1]), SelectMode::Toggle);
        assert_eq!(sel.anchor(), Some(order[1]));

        sel.apply(&order, Some(order[1]), SelectMode::Toggle);
        assert_eq!(sel.anchor(), Some(order[0]));
    }
}

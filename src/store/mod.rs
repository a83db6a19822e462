//! Write-through combo collection store
//!
//! [`ComboStore`] is the single source of truth for what exists on the
//! client side: an ordered cache of combos and groups, the selection,
//! and the active view options. Every mutation round-trips through the
//! backend and applies the authoritative result only on success; on
//! failure the local cache is left untouched and the error propagates
//! to the caller.
//!
//! The store is an explicit instance owned by the hosting shell and
//! passed by reference; there is no global. Internal state sits behind
//! a mutex that is never held across an await, so local transitions
//! stay atomic with respect to the event loop while backend calls are
//! the only suspension points.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::backend::{BackendError, ComboBackend};
use crate::model::{Combo, ComboDraft, ComboPatch, Group};
use crate::select::{SelectMode, SelectionModel};
use crate::view::{self, SortKey, ViewOptions};

/// Errors surfaced by store mutations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected the operation; local state is unchanged
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

#[derive(Default)]
struct StoreState {
    combos: Vec<Combo>,
    groups: Vec<Group>,
    selection: SelectionModel,
    options: ViewOptions,
    loading: bool,
    load_error: Option<String>,
    /// Reload ticket; a resolution applies only while its ticket is
    /// still the current one, so the last initiated load wins
    load_ticket: u64,
}

/// Client-side collection cache with write-through mutations
pub struct ComboStore {
    backend: Arc<dyn ComboBackend>,
    state: Mutex<StoreState>,
}

impl ComboStore {
    /// Create a store over the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn ComboBackend>) -> Self {
        Self {
            backend,
            state: Mutex::new(StoreState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        // A poisoned lock only means another caller panicked mid-section;
        // the state itself is still structurally sound
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// Reload the whole collection from the backend
    ///
    /// Sets the loading flag for the call's duration and replaces the
    /// collection on success, pruning selection entries that no longer
    /// resolve. Failures are recorded as [`Self::load_error`] and the
    /// collection keeps its last good state. When reloads overlap, the
    /// last one initiated wins; a superseded resolution is dropped.
    pub async fn load_all(&self) {
        let ticket = {
            let mut s = self.state();
            s.load_ticket += 1;
            s.loading = true;
            s.load_error = None;
            s.load_ticket
        };

        let result = self.backend.load_all_items().await;

        let mut s = self.state();
        if s.load_ticket != ticket {
            debug!(ticket, current = s.load_ticket, "dropping superseded reload");
            return;
        }
        s.loading = false;
        match result {
            Ok(combos) => {
                let existing: Vec<Uuid> = combos.iter().map(|c| c.id).collect();
                s.combos = combos;
                s.selection.retain_existing(&existing);
            }
            Err(err) => {
                s.load_error = Some(err.to_string());
            }
        }
    }

    /// Reload all groups from the backend
    ///
    /// Failures are recorded the same way as combo load failures.
    pub async fn load_groups(&self) {
        match self.backend.load_all_groups().await {
            Ok(groups) => self.state().groups = groups,
            Err(err) => self.state().load_error = Some(err.to_string()),
        }
    }

    /// Whether a collection reload is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// The most recent load failure, if the collection is stale
    #[must_use]
    pub fn load_error(&self) -> Option<String> {
        self.state().load_error.clone()
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Create a combo and append the stored record to the cache
    ///
    /// # Errors
    ///
    /// Propagates the backend failure; the cache is unchanged.
    pub async fn create(&self, draft: ComboDraft) -> Result<Combo, StoreError> {
        let combo = self.backend.create_item(draft).await?;
        self.state().combos.push(combo.clone());
        Ok(combo)
    }

    /// Apply a partial update and replace the cached record in place
    ///
    /// # Errors
    ///
    /// Propagates the backend failure; the cache is unchanged.
    pub async fn update(&self, id: Uuid, patch: ComboPatch) -> Result<Combo, StoreError> {
        let combo = self.backend.update_item(id, patch).await?;
        let mut s = self.state();
        if let Some(slot) = s.combos.iter_mut().find(|c| c.id == id) {
            *slot = combo.clone();
        }
        Ok(combo)
    }

    /// Delete a combo, stripping it from the selection in the same step
    ///
    /// # Errors
    ///
    /// Propagates the backend failure; the cache and selection are
    /// unchanged.
    pub async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        self.backend.delete_item(id).await?;
        let mut s = self.state();
        s.combos.retain(|c| c.id != id);
        s.selection.remove(id);
        Ok(())
    }

    /// Duplicate a combo and append the copy to the cache
    ///
    /// # Errors
    ///
    /// Propagates the backend failure; the cache is unchanged.
    pub async fn duplicate(&self, id: Uuid) -> Result<Combo, StoreError> {
        let copy = self.backend.duplicate_item(id).await?;
        self.state().combos.push(copy.clone());
        Ok(copy)
    }

    /// Flip a combo's enabled flag, returning the new state
    ///
    /// # Errors
    ///
    /// Propagates the backend failure; the cache is unchanged.
    pub async fn toggle_enabled(&self, id: Uuid) -> Result<bool, StoreError> {
        let enabled = self.backend.toggle_item_enabled(id).await?;
        let mut s = self.state();
        if let Some(combo) = s.combos.iter_mut().find(|c| c.id == id) {
            combo.enabled = enabled;
        }
        Ok(enabled)
    }

    /// Move a combo to another group
    ///
    /// # Errors
    ///
    /// Propagates the backend failure; the cache is unchanged.
    pub async fn move_to_group(&self, id: Uuid, group_id: Uuid) -> Result<(), StoreError> {
        self.backend.move_item_to_group(id, group_id).await?;
        let mut s = self.state();
        if let Some(combo) = s.combos.iter_mut().find(|c| c.id == id) {
            combo.group_id = group_id;
        }
        Ok(())
    }

    // ── Selection ───────────────────────────────────────────────────

    /// Apply a select gesture
    ///
    /// Range selection indexes into the current filtered/sorted view,
    /// so a shift-range drawn under an active filter can only cover
    /// visible combos.
    pub fn select(&self, target: Option<Uuid>, mode: SelectMode) {
        let mut s = self.state();
        let s = &mut *s;
        let order = view::project(&s.combos, &s.options);
        s.selection.apply(&order, target, mode);
    }

    /// Replace the selection wholesale
    pub fn select_all(&self, ids: impl IntoIterator<Item = Uuid>) {
        self.state().selection.select_all(ids);
    }

    /// Clear the selection
    pub fn clear_selection(&self) {
        self.state().selection.clear();
    }

    /// The derived primary id, or `None` when nothing is selected
    #[must_use]
    pub fn primary(&self) -> Option<Uuid> {
        self.state().selection.primary()
    }

    /// The current range anchor for shift gestures
    #[must_use]
    pub fn selection_anchor(&self) -> Option<Uuid> {
        self.state().selection.anchor()
    }

    /// Whether the id is selected
    #[must_use]
    pub fn is_selected(&self, id: Uuid) -> bool {
        self.state().selection.contains(id)
    }

    /// Selected combos in collection order, stale ids silently dropped
    #[must_use]
    pub fn selected_combos(&self) -> Vec<Combo> {
        let s = self.state();
        s.selection
            .selected_in(&s.combos)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Number of selected combos
    #[must_use]
    pub fn selection_len(&self) -> usize {
        self.state().selection.len()
    }

    // ── View ────────────────────────────────────────────────────────

    /// Restrict the view to one group, or `None` for all
    pub fn set_active_group(&self, group: Option<Uuid>) {
        self.state().options.group = group;
    }

    /// Set the free-text filter
    pub fn set_query(&self, query: impl Into<String>) {
        self.state().options.query = query.into();
    }

    /// Select a sort column; re-picking the current one flips direction
    pub fn toggle_sort(&self, key: SortKey) {
        self.state().options.toggle_sort(key);
    }

    /// Snapshot of the active view options
    #[must_use]
    pub fn view_options(&self) -> ViewOptions {
        self.state().options.clone()
    }

    /// The current filtered/sorted view as full records
    #[must_use]
    pub fn visible(&self) -> Vec<Combo> {
        let s = self.state();
        let order = view::project(&s.combos, &s.options);
        order
            .into_iter()
            .filter_map(|id| s.combos.iter().find(|c| c.id == id).cloned())
            .collect()
    }

    /// The current filtered/sorted view as ids
    #[must_use]
    pub fn visible_ids(&self) -> Vec<Uuid> {
        let s = self.state();
        view::project(&s.combos, &s.options)
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// The raw collection in backend order
    #[must_use]
    pub fn combos(&self) -> Vec<Combo> {
        self.state().combos.clone()
    }

    /// All cached groups
    #[must_use]
    pub fn groups(&self) -> Vec<Group> {
        self.state().groups.clone()
    }

    /// Look up a cached combo by id
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<Combo> {
        self.state().combos.iter().find(|c| c.id == id).cloned()
    }

    /// Whether a keyword is unused across the cached collection
    ///
    /// `exclude` skips one combo, for edit forms checking against the
    /// record being edited.
    #[must_use]
    pub fn is_keyword_available(&self, keyword: &str, exclude: Option<Uuid>) -> bool {
        !self
            .state()
            .combos
            .iter()
            .any(|c| c.keyword == keyword && exclude != Some(c.id))
    }
}

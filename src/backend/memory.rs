//! In-process reference backend
//!
//! Keeps the combo library in memory behind the [`ComboBackend`]
//! interface. This is the backend a local-first host runs against, and
//! what the crate's own tests drive; it also carries failure injection
//! and a search gate so tests can exercise in-flight behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::model::{Combo, ComboDraft, ComboPatch, Group};

use super::{BackendError, ComboBackend};

/// Maximum number of search results returned
pub const MAX_SEARCH_RESULTS: usize = 50;

#[derive(Debug, Default)]
struct Library {
    combos: Vec<Combo>,
    groups: Vec<Group>,
}

/// In-memory [`ComboBackend`] implementation
pub struct MemoryBackend {
    inner: Mutex<Library>,
    fail_next: Mutex<Option<String>>,
    search_gate: Mutex<Option<Arc<Notify>>>,
    load_gate: Mutex<Option<Arc<Notify>>>,
    search_calls: AtomicUsize,
}

impl MemoryBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Library::default()),
            fail_next: Mutex::new(None),
            search_gate: Mutex::new(None),
            load_gate: Mutex::new(None),
            search_calls: AtomicUsize::new(0),
        }
    }

    /// Create a backend pre-populated with a default group
    ///
    /// Returns the backend and the default group's id.
    #[must_use]
    pub fn with_default_group() -> (Self, Uuid) {
        let backend = Self::new();
        let group = Group::new("Default");
        let id = group.id;
        backend.seed_group(group);
        (backend, id)
    }

    /// Insert a group directly, bypassing the async interface
    pub fn seed_group(&self, group: Group) {
        if let Ok(mut lib) = self.inner.lock() {
            lib.groups.push(group);
        }
    }

    /// Insert a combo directly, bypassing the async interface
    pub fn seed_combo(&self, combo: Combo) {
        if let Ok(mut lib) = self.inner.lock() {
            lib.combos.push(combo);
        }
    }

    /// Make the next backend call fail with the given message
    pub fn fail_next(&self, message: impl Into<String>) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(message.into());
        }
    }

    /// Hold every `search_items` call until the returned handle is notified
    ///
    /// Each `notify_one` releases one waiting search; `notify_waiters`
    /// releases all of them.
    pub fn hold_searches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        if let Ok(mut slot) = self.search_gate.lock() {
            *slot = Some(Arc::clone(&gate));
        }
        gate
    }

    /// Hold every `load_all_items` call until the returned handle is notified
    ///
    /// Calls that start after [`Self::ungate_loads`] pass straight
    /// through; calls already parked stay parked until notified.
    pub fn gate_loads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        if let Ok(mut slot) = self.load_gate.lock() {
            *slot = Some(Arc::clone(&gate));
        }
        gate
    }

    /// Stop gating new `load_all_items` calls
    pub fn ungate_loads(&self) {
        if let Ok(mut slot) = self.load_gate.lock() {
            *slot = None;
        }
    }

    /// Number of `search_items` calls that reached the backend
    #[must_use]
    pub fn search_call_count(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn library(&self) -> Result<MutexGuard<'_, Library>, BackendError> {
        self.inner
            .lock()
            .map_err(|_| BackendError::Unavailable("library lock poisoned".into()))
    }

    fn take_injected_failure(&self) -> Option<String> {
        self.fail_next.lock().ok().and_then(|mut slot| slot.take())
    }

    fn check_injected_failure(&self) -> Result<(), BackendError> {
        match self.take_injected_failure() {
            Some(message) => Err(BackendError::Unavailable(message)),
            None => Ok(()),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComboBackend for MemoryBackend {
    async fn load_all_items(&self) -> Result<Vec<Combo>, BackendError> {
        let gate = self.load_gate.lock().ok().and_then(|g| g.clone());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_injected_failure()?;
        Ok(self.library()?.combos.clone())
    }

    async fn create_item(&self, draft: ComboDraft) -> Result<Combo, BackendError> {
        self.check_injected_failure()?;
        let mut lib = self.library()?;
        if !lib.groups.iter().any(|g| g.id == draft.group_id) {
            return Err(BackendError::GroupNotFound(draft.group_id));
        }
        let combo = draft.build()?;
        lib.combos.push(combo.clone());
        Ok(combo)
    }

    async fn update_item(&self, id: Uuid, patch: ComboPatch) -> Result<Combo, BackendError> {
        self.check_injected_failure()?;
        let mut lib = self.library()?;
        // Group existence is checked before anything is mutated
        if let Some(gid) = patch.group_id
            && !lib.groups.iter().any(|g| g.id == gid)
        {
            return Err(BackendError::GroupNotFound(gid));
        }
        let combo = lib
            .combos
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(BackendError::ComboNotFound(id))?;

        let mut updated = combo.clone();
        patch.apply(&mut updated);
        updated.validate()?;
        *combo = updated.clone();
        Ok(updated)
    }

    async fn delete_item(&self, id: Uuid) -> Result<(), BackendError> {
        self.check_injected_failure()?;
        let mut lib = self.library()?;
        let before = lib.combos.len();
        lib.combos.retain(|c| c.id != id);
        if lib.combos.len() == before {
            return Err(BackendError::ComboNotFound(id));
        }
        Ok(())
    }

    async fn duplicate_item(&self, id: Uuid) -> Result<Combo, BackendError> {
        self.check_injected_failure()?;
        let mut lib = self.library()?;
        let original = lib
            .combos
            .iter()
            .find(|c| c.id == id)
            .ok_or(BackendError::ComboNotFound(id))?
            .clone();

        let now = Utc::now();
        let mut copy = original;
        copy.id = Uuid::new_v4();
        copy.name = format!("{} (copy)", copy.name);
        copy.use_count = 0;
        copy.last_used = None;
        copy.created_at = now;
        copy.modified_at = now;

        lib.combos.push(copy.clone());
        Ok(copy)
    }

    async fn toggle_item_enabled(&self, id: Uuid) -> Result<bool, BackendError> {
        self.check_injected_failure()?;
        let mut lib = self.library()?;
        let combo = lib
            .combos
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(BackendError::ComboNotFound(id))?;
        combo.enabled = !combo.enabled;
        combo.modified_at = Utc::now();
        Ok(combo.enabled)
    }

    async fn move_item_to_group(&self, item_id: Uuid, group_id: Uuid) -> Result<(), BackendError> {
        self.check_injected_failure()?;
        let mut lib = self.library()?;
        if !lib.groups.iter().any(|g| g.id == group_id) {
            return Err(BackendError::GroupNotFound(group_id));
        }
        let combo = lib
            .combos
            .iter_mut()
            .find(|c| c.id == item_id)
            .ok_or(BackendError::ComboNotFound(item_id))?;
        combo.group_id = group_id;
        combo.modified_at = Utc::now();
        Ok(())
    }

    async fn search_items(&self, query: &str) -> Result<Vec<Combo>, BackendError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.search_gate.lock().ok().and_then(|g| g.clone());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_injected_failure()?;

        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let combos = self.library()?.combos.clone();
        let mut scored: Vec<(i32, Combo)> = combos
            .into_iter()
            .filter(|c| c.enabled)
            .filter_map(|combo| relevance(&combo, &needle).map(|score| (score, combo)))
            .collect();

        // Stable sort keeps insertion order within a score band
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(MAX_SEARCH_RESULTS)
            .map(|(_, combo)| combo)
            .collect())
    }

    async fn load_all_groups(&self) -> Result<Vec<Group>, BackendError> {
        self.check_injected_failure()?;
        Ok(self.library()?.groups.clone())
    }
}

/// Relevance score for a combo against a lowercased query
///
/// Keyword matches outrank name matches, which outrank description and
/// snippet matches. `None` means no field matched.
fn relevance(combo: &Combo, needle: &str) -> Option<i32> {
    let keyword = combo.keyword.to_lowercase();
    let name = combo.name.to_lowercase();
    if keyword == needle {
        Some(1000)
    } else if keyword.contains(needle) {
        Some(900)
    } else if name.starts_with(needle) {
        Some(800)
    } else if name.contains(needle) {
        Some(700)
    } else if combo.description.to_lowercase().contains(needle) {
        Some(600)
    } else if combo.snippet.to_lowercase().contains(needle) {
        Some(500)
    } else {
        None
    }
}

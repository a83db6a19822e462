//! Debounced, generation-tagged incremental search
//!
//! [`SearchController`] drives the quick-picker and list search boxes:
//! a keystroke arms a debounce timer, the timer fire issues a backend
//! query tagged with a generation number, and a response is accepted
//! only while its generation is still current. Without the tag, a fast
//! keystroke's response arriving after a slower, earlier one would
//! overwrite newer results with stale ones.
//!
//! The debounce timer is an explicit abortable handle: it is cancelled
//! when a newer keystroke reschedules it, when the query is cleared,
//! and when the controller is disposed or dropped, so no callback ever
//! fires against a dead session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::backend::{BackendError, ComboBackend};
use crate::model::Combo;
use crate::nav::{Direction, Navigator};

/// Timing presets for a search box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTuning {
    /// Quiet period after the last keystroke before the query is issued
    pub debounce: Duration,
}

impl SearchTuning {
    /// Preset for the main list's search box
    #[must_use]
    pub const fn list() -> Self {
        Self {
            debounce: Duration::from_millis(300),
        }
    }

    /// Preset for the quick-picker overlay, tuned for lower latency
    #[must_use]
    pub const fn picker() -> Self {
        Self {
            debounce: Duration::from_millis(150),
        }
    }
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self::list()
    }
}

/// Where the controller is in the keystroke/query cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    /// Empty query, no results, no pending timer
    #[default]
    Idle,
    /// A keystroke armed the timer; no call in flight for this burst
    Pending,
    /// A backend call is in flight
    Searching,
}

#[derive(Default)]
struct Session {
    query: String,
    generation: u64,
    results: Vec<Combo>,
    nav: Navigator,
    error: Option<String>,
    phase: SearchPhase,
}

/// Debounced incremental-search session over a backend
pub struct SearchController {
    backend: Arc<dyn ComboBackend>,
    session: Arc<Mutex<Session>>,
    debounce: Duration,
    timer: Option<JoinHandle<()>>,
}

impl SearchController {
    /// Create a controller with the given timing preset
    #[must_use]
    pub fn new(backend: Arc<dyn ComboBackend>, tuning: SearchTuning) -> Self {
        Self {
            backend,
            session: Arc::new(Mutex::new(Session::default())),
            debounce: tuning.debounce,
            timer: None,
        }
    }

    /// Feed the current query text
    ///
    /// A non-empty trimmed query cancels any pending timer and arms a
    /// fresh one. An empty trimmed query bypasses the timer: results
    /// are cleared synchronously and the session returns to idle.
    pub fn set_query(&mut self, text: &str) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let trimmed = text.trim().to_string();
        {
            let mut s = lock(&self.session);
            s.query = text.to_string();
            if trimmed.is_empty() {
                s.results.clear();
                s.error = None;
                s.nav.set_len(0);
                s.phase = SearchPhase::Idle;
                return;
            }
            s.phase = SearchPhase::Pending;
        }

        let backend = Arc::clone(&self.backend);
        let session = Arc::clone(&self.session);
        let delay = self.debounce;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let generation = {
                let mut s = lock(&session);
                s.generation += 1;
                s.phase = SearchPhase::Searching;
                s.generation
            };
            let outcome = backend.search_items(&trimmed).await;
            resolve(&session, generation, outcome);
        }));
    }

    /// Clear the query and results synchronously
    pub fn clear(&mut self) {
        self.set_query("");
    }

    /// Cancel the timer; the session takes no further transitions
    ///
    /// Called automatically on drop. A disposed controller can still be
    /// read, and `set_query` would revive it, but the hosting view is
    /// expected to drop it instead.
    pub fn dispose(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    // ── Session snapshot ────────────────────────────────────────────

    /// The query text as last fed in
    #[must_use]
    pub fn query(&self) -> String {
        lock(&self.session).query.clone()
    }

    /// The most recently accepted result set
    #[must_use]
    pub fn results(&self) -> Vec<Combo> {
        lock(&self.session).results.clone()
    }

    /// Current phase of the keystroke/query cycle
    #[must_use]
    pub fn phase(&self) -> SearchPhase {
        lock(&self.session).phase
    }

    /// The session error from the last failed query, if any
    #[must_use]
    pub fn error(&self) -> Option<String> {
        lock(&self.session).error.clone()
    }

    /// Current generation counter, mostly useful for diagnostics
    #[must_use]
    pub fn generation(&self) -> u64 {
        lock(&self.session).generation
    }

    // ── Cursor ──────────────────────────────────────────────────────

    /// Move the result cursor with wraparound
    pub fn move_cursor(&self, direction: Direction) {
        lock(&self.session).nav.move_by(direction);
    }

    /// Current cursor index into the result set
    #[must_use]
    pub fn cursor(&self) -> usize {
        lock(&self.session).nav.cursor()
    }

    /// The result under the cursor, if any
    #[must_use]
    pub fn selected(&self) -> Option<Combo> {
        let s = lock(&self.session);
        s.nav.selected(&s.results).cloned()
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Apply a backend response to the session it was issued from
///
/// A response whose generation no longer matches the session's current
/// generation is dropped unconditionally; a newer query superseded it.
fn resolve(session: &Mutex<Session>, generation: u64, outcome: Result<Vec<Combo>, BackendError>) {
    let mut s = lock(session);
    if s.generation != generation {
        debug!(
            generation,
            current = s.generation,
            "discarding stale search response"
        );
        return;
    }
    match outcome {
        Ok(results) => {
            s.nav.set_len(results.len());
            s.nav.reset();
            s.results = results;
            s.error = None;
        }
        Err(err) => {
            s.results.clear();
            s.nav.set_len(0);
            s.error = Some(err.to_string());
        }
    }
    // A newer keystroke may already have re-armed the timer; in that
    // case the session stays pending rather than settling to idle
    if s.phase == SearchPhase::Searching {
        s.phase = SearchPhase::Idle;
    }
}

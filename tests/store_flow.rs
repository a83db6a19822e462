//! Integration tests for the combodeck core
//!
//! These tests verify end-to-end flows over the in-memory backend: the
//! list view (load, filter, sort, multi-select, mutate) and the picker
//! overlay (debounced search, cursor, activation lookup).

use std::sync::Arc;
use std::time::Duration;

use combodeck::{
    ComboDraft, ComboPatch, ComboStore, Direction, Group, MemoryBackend, SearchController,
    SearchPhase, SearchTuning, SelectMode, SortKey,
};

/// Let spawned controller tasks run to completion
async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

fn seeded() -> (Arc<MemoryBackend>, uuid::Uuid) {
    let (backend, gid) = MemoryBackend::with_default_group();
    for (name, keyword, snippet) in [
        ("Signature", "sig", "Best regards,\nJohn"),
        ("Email", "email", "john@example.com"),
        ("Address", "addr", "1 Main Street"),
    ] {
        backend.seed_combo(ComboDraft::new(name, keyword, snippet, gid).build().unwrap());
    }
    (Arc::new(backend), gid)
}

#[tokio::test]
async fn test_list_view_load_filter_and_clear() {
    let (backend, _gid) = seeded();
    let store = ComboStore::new(backend);
    store.load_all().await;
    store.load_groups().await;

    assert_eq!(store.combos().len(), 3);
    assert_eq!(store.groups().len(), 1);

    store.set_query("sig");
    let visible = store.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].keyword, "sig");

    // Clearing the filter restores everything, name-ascending
    store.set_query("");
    let names: Vec<_> = store.visible().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Address", "Email", "Signature"]);
}

#[tokio::test]
async fn test_multi_select_survives_mutation_cycle() {
    let (backend, gid) = seeded();
    let store = ComboStore::new(backend);
    store.load_all().await;

    let visible = store.visible_ids();
    store.select(Some(visible[0]), SelectMode::Replace);
    let anchor = store.selection_anchor().unwrap();
    store.select(Some(visible[2]), SelectMode::RangeTo { anchor });
    assert_eq!(store.selection_len(), 3);

    // Creating a new combo leaves the selection alone
    let extra = store
        .create(ComboDraft::new("Zeta", "zeta", "zeta body", gid))
        .await
        .unwrap();
    assert_eq!(store.selection_len(), 3);
    assert!(!store.is_selected(extra.id));

    // Deleting a selected combo strips exactly that id
    store.remove(visible[1]).await.unwrap();
    assert_eq!(store.selection_len(), 2);
    assert!(!store.is_selected(visible[1]));
    assert_eq!(store.primary(), Some(visible[0]));
}

#[tokio::test]
async fn test_sort_cycle_and_grouping() {
    let (backend, gid) = seeded();
    let other = Group::new("Work");
    let other_id = other.id;
    backend.seed_group(other);
    let store = ComboStore::new(backend);
    store.load_all().await;
    store.load_groups().await;

    let sig = store
        .combos()
        .into_iter()
        .find(|c| c.keyword == "sig")
        .unwrap();
    store.move_to_group(sig.id, other_id).await.unwrap();

    store.set_active_group(Some(other_id));
    assert_eq!(store.visible().len(), 1);

    store.set_active_group(None);
    store.toggle_sort(SortKey::Keyword);
    let keywords: Vec<_> = store.visible().into_iter().map(|c| c.keyword).collect();
    assert_eq!(keywords, vec!["addr", "email", "sig"]);

    store.toggle_sort(SortKey::Keyword);
    let keywords: Vec<_> = store.visible().into_iter().map(|c| c.keyword).collect();
    assert_eq!(keywords, vec!["sig", "email", "addr"]);
}

#[tokio::test]
async fn test_edit_form_roundtrip() {
    let (backend, _gid) = seeded();
    let store = ComboStore::new(backend);
    store.load_all().await;

    let email = store
        .combos()
        .into_iter()
        .find(|c| c.keyword == "email")
        .unwrap();

    // The form checks keyword availability before committing
    assert!(!store.is_keyword_available("sig", None));
    assert!(store.is_keyword_available("email", Some(email.id)));

    let patch = ComboPatch {
        name: Some("Work email".into()),
        snippet: Some("john@work.example.com".into()),
        ..ComboPatch::default()
    };
    let updated = store.update(email.id, patch).await.unwrap();
    assert_eq!(updated.name, "Work email");
    assert!(updated.modified_at >= updated.created_at);
    assert_eq!(store.get(email.id).unwrap().name, "Work email");
}

#[tokio::test(start_paused = true)]
async fn test_picker_flow_search_and_activate() {
    let (backend, _gid) = seeded();
    let mut picker = SearchController::new(backend.clone(), SearchTuning::picker());

    picker.set_query("jo");
    assert_eq!(picker.phase(), SearchPhase::Pending);
    settle().await;
    tokio::time::advance(Duration::from_millis(150)).await;
    settle().await;

    // "jo" hits both snippets containing "john"
    let results = picker.results();
    assert_eq!(results.len(), 2);
    assert_eq!(picker.cursor(), 0);

    picker.move_cursor(Direction::Down);
    let chosen = picker.selected().unwrap();
    assert_eq!(chosen.id, results[1].id);

    // Escape clears the overlay synchronously
    picker.clear();
    assert_eq!(picker.phase(), SearchPhase::Idle);
    assert!(picker.results().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_list_and_picker_controllers_are_independent() {
    let (backend, _gid) = seeded();
    let mut list = SearchController::new(backend.clone(), SearchTuning::list());
    let mut picker = SearchController::new(backend.clone(), SearchTuning::picker());

    list.set_query("sig");
    picker.set_query("email");
    settle().await;

    // The picker's shorter debounce fires first
    tokio::time::advance(Duration::from_millis(150)).await;
    settle().await;
    assert_eq!(picker.results().len(), 1);
    assert!(list.results().is_empty());

    tokio::time::advance(Duration::from_millis(150)).await;
    settle().await;
    assert_eq!(list.results().len(), 1);
    assert_eq!(list.results()[0].keyword, "sig");
}

#[tokio::test(start_paused = true)]
async fn test_disabled_combos_stay_listed_but_unsearchable() {
    let (backend, _gid) = seeded();
    let store = ComboStore::new(backend.clone());
    store.load_all().await;

    let sig = store
        .combos()
        .into_iter()
        .find(|c| c.keyword == "sig")
        .unwrap();
    store.toggle_enabled(sig.id).await.unwrap();

    // The list view still shows it; the picker search does not
    assert_eq!(store.visible().len(), 3);

    let mut picker = SearchController::new(backend, SearchTuning::picker());
    picker.set_query("sig");
    settle().await;
    tokio::time::advance(Duration::from_millis(150)).await;
    settle().await;
    assert!(picker.results().is_empty());
    assert!(picker.error().is_none());
}

#[tokio::test]
async fn test_duplicate_then_reload_keeps_selection_consistent() {
    let (backend, _gid) = seeded();
    let store = ComboStore::new(backend);
    store.load_all().await;

    let sig = store
        .combos()
        .into_iter()
        .find(|c| c.keyword == "sig")
        .unwrap();
    store.select(Some(sig.id), SelectMode::Replace);

    let copy = store.duplicate(sig.id).await.unwrap();
    assert_eq!(copy.name, "Signature (copy)");
    assert_eq!(store.combos().len(), 4);

    store.load_all().await;
    assert_eq!(store.combos().len(), 4);
    assert!(store.is_selected(sig.id));
    assert_eq!(store.primary(), Some(sig.id));
}

use chrono::{Duration, TimeZone, Utc};
use notepad_core::config::{DEFAULT_LAST_SELECTED_KEY, DEFAULT_NOTES_KEY};
use notepad_core::{
    LoadOutcome, ManualClock, MemoryKvRepository, NoteStore, SaveStatus, StoreConfig,
};
use std::collections::HashSet;

const T0_MS: i64 = 1_717_243_200_000;

fn two_note_payload() -> String {
    r#"[
        {"id":"a","title":"Shopping","content":"<p>milk</p>",
         "createdAt":"2024-06-01T10:00:00.000Z","updatedAt":"2024-06-01T10:00:00.000Z"},
        {"id":"b","title":"Work","content":"<p>deploy</p>",
         "createdAt":"2024-06-01T11:00:00.000Z","updatedAt":"2024-06-01T11:00:00.000Z"}
    ]"#
    .to_string()
}

fn open_store(repo: MemoryKvRepository) -> (NoteStore<MemoryKvRepository, ManualClock>, ManualClock) {
    let clock = ManualClock::at_epoch_ms(T0_MS);
    let store = NoteStore::open(repo, clock.clone(), StoreConfig::default());
    (store, clock)
}

fn ids(notes: &[&notepad_core::Note]) -> Vec<String> {
    notes.iter().map(|note| note.id.clone()).collect()
}

#[test]
fn empty_storage_initializes_one_selected_note() {
    let clock = ManualClock::at_epoch_ms(T0_MS);
    let mut store = NoteStore::new(MemoryKvRepository::new(), clock, StoreConfig::default());

    assert_eq!(store.load(), LoadOutcome::Initialized);
    assert_eq!(store.notes().len(), 1);
    assert_eq!(store.notes()[0].content, "<p></p>");

    let selected = store.restore_selection().unwrap();
    assert_eq!(store.active_id(), Some(selected.as_str()));
    assert_eq!(
        store.repo().raw(DEFAULT_LAST_SELECTED_KEY),
        Some(selected.as_str())
    );
}

#[test]
fn corrupted_storage_is_recovered_silently() {
    let repo = MemoryKvRepository::new().with_entry(DEFAULT_NOTES_KEY, "{not json");
    let clock = ManualClock::at_epoch_ms(T0_MS);
    let mut store = NoteStore::new(repo, clock, StoreConfig::default());

    assert_eq!(store.load(), LoadOutcome::Recovered);
    assert_eq!(store.notes().len(), 1);
    assert_eq!(store.save_status(), SaveStatus::Pending);

    assert_eq!(store.flush(), SaveStatus::Saved);
    let stored = store.repo().raw(DEFAULT_NOTES_KEY).unwrap();
    assert!(stored.contains(&store.notes()[0].id));
}

#[test]
fn default_note_survives_reopen() {
    let (mut store, _clock) = open_store(MemoryKvRepository::new());
    let first_id = store.active_id().unwrap().to_string();
    assert_eq!(store.save_status(), SaveStatus::Pending);
    store.flush();

    let (mut reopened, _clock) = open_store(store.into_repo());
    assert_eq!(reopened.notes().len(), 1);
    assert_eq!(reopened.active_id(), Some(first_id.as_str()));
    assert_eq!(reopened.save_status(), SaveStatus::Saved);
    reopened.flush();

    let (third, _clock) = open_store(reopened.into_repo());
    assert_eq!(third.notes().len(), 1);
    assert_eq!(third.notes()[0].id, first_id);
}

#[test]
fn filter_matches_content_and_orders_newest_first() {
    let repo = MemoryKvRepository::new().with_entry(DEFAULT_NOTES_KEY, two_note_payload());
    let (store, _clock) = open_store(repo);

    assert_eq!(ids(&store.filter("milk")), vec!["a"]);
    assert_eq!(ids(&store.filter("")), vec!["b", "a"]);
    assert_eq!(ids(&store.filter("  WORK ")), vec!["b"]);
    assert!(store.filter("nothing-matches").is_empty());
}

#[test]
fn last_selected_is_restored_and_stale_ids_fall_back_to_head() {
    let repo = MemoryKvRepository::new()
        .with_entry(DEFAULT_NOTES_KEY, two_note_payload())
        .with_entry(DEFAULT_LAST_SELECTED_KEY, "a");
    let (store, _clock) = open_store(repo);
    assert_eq!(store.active_id(), Some("a"));

    let repo = MemoryKvRepository::new()
        .with_entry(DEFAULT_NOTES_KEY, two_note_payload())
        .with_entry(DEFAULT_LAST_SELECTED_KEY, "gone");
    let (store, _clock) = open_store(repo);
    assert_eq!(store.active_id(), Some("b"));
}

#[test]
fn duplicate_copies_title_and_content_under_new_id() {
    let (mut store, clock) = open_store(MemoryKvRepository::new());
    let source = store.create(Some("Notes"), Some("<p>x</p>"));
    clock.advance_ms(5_000);

    let copy_id = store.duplicate().unwrap();
    let copy = store.current().unwrap();

    assert_ne!(copy_id, source);
    assert_eq!(copy.id, copy_id);
    assert_eq!(copy.title, "Notes (copy)");
    assert_eq!(copy.content, "<p>x</p>");
    assert_eq!(copy.created_at, clock_now(&clock));
    assert_eq!(copy.updated_at, clock_now(&clock));
    assert_eq!(store.notes()[0].id, copy_id);
}

#[test]
fn ids_stay_unique_across_creates_and_duplicates() {
    let (mut store, _clock) = open_store(MemoryKvRepository::new());
    for _ in 0..10 {
        store.create(None, None);
        store.duplicate();
    }
    let unique: HashSet<&str> = store.notes().iter().map(|note| note.id.as_str()).collect();
    assert_eq!(unique.len(), store.notes().len());
    assert_eq!(store.notes().len(), 21);
}

#[test]
fn deleting_the_only_note_synthesizes_a_replacement() {
    let (mut store, _clock) = open_store(MemoryKvRepository::new());
    let only = store.active_id().unwrap().to_string();

    let removed = store.delete().unwrap();

    assert_eq!(removed.id, only);
    assert_eq!(store.notes().len(), 1);
    assert_ne!(store.notes()[0].id, only);
    assert_eq!(store.active_id(), Some(store.notes()[0].id.as_str()));
    assert_eq!(store.save_status(), SaveStatus::Pending);
}

#[test]
fn delete_selects_new_head() {
    let repo = MemoryKvRepository::new().with_entry(DEFAULT_NOTES_KEY, two_note_payload());
    let (mut store, _clock) = open_store(repo);
    assert!(store.select("b"));

    store.delete().unwrap();

    assert_eq!(store.active_id(), Some("a"));
    assert_eq!(store.notes().len(), 1);
}

#[test]
fn unknown_select_keeps_current_selection() {
    let repo = MemoryKvRepository::new().with_entry(DEFAULT_NOTES_KEY, two_note_payload());
    let (mut store, _clock) = open_store(repo);
    let before = store.active_id().map(str::to_string);

    assert!(!store.select("missing"));
    assert_eq!(store.active_id().map(str::to_string), before);
}

#[test]
fn edits_move_note_to_head_and_blank_titles_become_untitled() {
    let repo = MemoryKvRepository::new().with_entry(DEFAULT_NOTES_KEY, two_note_payload());
    let (mut store, _clock) = open_store(repo);
    store.select("a");

    assert!(store.update_title("   "));

    assert_eq!(store.notes()[0].id, "a");
    assert_eq!(store.notes()[0].title, "Untitled");
    assert!(store.notes()[0].updated_at >= store.notes()[0].created_at);
}

#[test]
fn content_is_sanitized_before_storage() {
    let (mut store, _clock) = open_store(MemoryKvRepository::new());

    let clean = store
        .update_content("<p onclick=\"x()\">hi</p><script>bad()</script>")
        .unwrap();

    assert_eq!(clean, "<p>hi</p>");
    assert_eq!(store.current().unwrap().content, "<p>hi</p>");
}

#[test]
fn burst_of_edits_produces_one_write_with_final_content() {
    let (mut store, clock) = open_store(MemoryKvRepository::new());

    store.update_content("<p>first</p>");
    clock.advance_ms(200);
    store.update_content("<p>second</p>");
    assert_eq!(store.save_status(), SaveStatus::Pending);

    clock.advance_ms(449);
    assert!(!store.tick());
    assert_eq!(store.repo().write_count(DEFAULT_NOTES_KEY), 0);

    clock.advance_ms(1);
    assert!(store.tick());
    assert!(!store.tick());

    let repo = store.repo();
    assert_eq!(repo.write_count(DEFAULT_NOTES_KEY), 1);
    let stored = repo.raw(DEFAULT_NOTES_KEY).unwrap();
    assert!(stored.contains("<p>second</p>"));
    assert!(!stored.contains("<p>first</p>"));
    assert_eq!(store.save_status(), SaveStatus::Saved);
}

#[test]
fn quota_failure_reports_failed_and_keeps_memory_state() {
    let (mut store, clock) = open_store(MemoryKvRepository::new());
    store.repo_mut().set_quota(Some(64));

    store.update_content("<p>this will not fit in the quota at all</p>");
    clock.advance_ms(450);
    assert!(store.tick());

    assert_eq!(store.save_status(), SaveStatus::Failed);
    assert_eq!(store.repo().write_count(DEFAULT_NOTES_KEY), 0);
    assert_eq!(
        store.current().unwrap().content,
        "<p>this will not fit in the quota at all</p>"
    );

    store.repo_mut().set_quota(None);
    store.update_title("Recovered");
    assert_eq!(store.flush(), SaveStatus::Saved);
    assert_eq!(store.repo().write_count(DEFAULT_NOTES_KEY), 1);
}

#[test]
fn persisted_collection_reloads_round_trip() {
    let (mut store, _clock) = open_store(MemoryKvRepository::new());
    let id = store.create(Some("Plans"), Some("<p>ship <b>it</b></p>"));
    store.flush();

    let repo = store.into_repo();
    let (reopened, _clock) = open_store(repo);

    assert_eq!(reopened.notes().len(), 2);
    assert_eq!(reopened.active_id(), Some(id.as_str()));
    let note = reopened.current().unwrap();
    assert_eq!(note.title, "Plans");
    assert_eq!(note.content, "<p>ship <b>it</b></p>");
}

#[test]
fn collection_stays_sorted_newest_first() {
    let (mut store, clock) = open_store(MemoryKvRepository::new());
    let older = store.create(Some("older"), None);
    clock.advance_ms(1_000);
    store.create(Some("newer"), None);
    clock.advance_ms(1_000);

    store.select(&older);
    store.update_content("<p>touched</p>");

    let notes = store.notes();
    assert_eq!(notes[0].id, older);
    assert!(notes
        .windows(2)
        .all(|pair| pair[0].updated_at >= pair[1].updated_at));
}

#[test]
fn debounce_deadline_follows_config() {
    let config = StoreConfig {
        save_debounce_ms: 1_000,
        ..StoreConfig::default()
    };
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
    let mut store = NoteStore::open(MemoryKvRepository::new(), clock.clone(), config);

    store.update_title("x");

    assert_eq!(
        store.next_deadline(),
        Some(clock_now(&clock) + Duration::milliseconds(1_000))
    );
}

#[test]
fn mixed_operations_keep_collection_consistent() {
    let (mut store, clock) = open_store(MemoryKvRepository::new());

    for step in 0..100 {
        clock.advance_ms(10);
        match step % 5 {
            0 => {
                store.create(Some(&format!("note {step}")), None);
            }
            1 => {
                store.duplicate().unwrap();
            }
            2 => {
                store.delete().unwrap();
            }
            3 => {
                store.update_content(&format!("<p>step {step}</p>")).unwrap();
            }
            _ => {
                let last = store.notes().last().unwrap().id.clone();
                assert!(store.select(&last));
            }
        }

        let notes = store.notes();
        assert!(!notes.is_empty(), "step {step}: empty collection");
        let unique: HashSet<&str> = notes.iter().map(|note| note.id.as_str()).collect();
        assert_eq!(unique.len(), notes.len(), "step {step}: duplicate ids");
        let active = store.active_id().unwrap();
        assert!(
            notes.iter().any(|note| note.id == active),
            "step {step}: active id {active} missing"
        );
        assert!(
            notes
                .windows(2)
                .all(|pair| pair[0].updated_at >= pair[1].updated_at),
            "step {step}: collection out of order"
        );
    }

    assert_eq!(store.flush(), SaveStatus::Saved);
    let expected: Vec<String> = store.notes().iter().map(|note| note.id.clone()).collect();
    let (reopened, _clock) = open_store(store.into_repo());
    let reloaded: Vec<String> = reopened.notes().iter().map(|note| note.id.clone()).collect();
    assert_eq!(reloaded, expected);
}

fn clock_now(clock: &ManualClock) -> chrono::DateTime<Utc> {
    use notepad_core::Clock;
    clock.now()
}

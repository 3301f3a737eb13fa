use std::{fs, path::Path};

use notedex::{
    build_metadata, Config, DateField, DateRange, EditorLauncher, ErrorKind, NoteStorage,
    Result, SkipEditor, StorePaths,
};
use tempfile::TempDir;

/// Editor stand-in that overwrites the note with fixed content.
struct WriteContent(&'static str);

impl EditorLauncher for WriteContent {
    fn edit(&self, path: &Path) -> Result<()> {
        fs::write(path, self.0)?;
        Ok(())
    }
}

fn setup() -> (TempDir, NoteStorage) {
    let dir = TempDir::new().unwrap();
    let config = Config {
        note_dir: dir.path().join("notes"),
        editor: String::new(),
        ignore: vec!["drafts/**".to_string()],
    };
    let storage = NoteStorage::new(StorePaths::new(dir.path().join("store")), config);
    storage.initialize().unwrap();
    (dir, storage)
}

fn write_note(storage: &NoteStorage, title: &str, content: &str) {
    let path = storage.note_dir().join(format!("{}.md", title));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn titles(records: &[notedex::NoteRecord]) -> Vec<&str> {
    records.iter().map(|r| r.title.as_str()).collect()
}

#[test]
fn test_upsert_then_load_keeps_derived_counts() {
    let (_dir, storage) = setup();
    write_note(&storage, "alpha", ".one.two\nthree words here\n");

    let path = storage.resolve_path("alpha").unwrap();
    let built = build_metadata(&path).unwrap();
    storage.upsert(built.clone()).unwrap();

    let loaded = storage.get_note("alpha").unwrap();
    assert_eq!(loaded.tags, built.tags);
    assert_eq!(loaded.word_count, 3);
    assert_eq!(loaded.char_count, built.char_count);

    let tags = storage.load_tag_index().unwrap();
    assert_eq!(tags["one"].notes, vec![built.file_path]);
}

#[test]
fn test_create_or_open_creates_and_stamps_visit() {
    let (_dir, storage) = setup();

    let record = storage
        .create_or_open_note("journal", &WriteContent(".life\ndear diary"), None)
        .unwrap();

    assert!(Path::new(&record.file_path).is_file());
    assert_eq!(record.tags, vec!["life"]);
    assert_eq!(record.word_count, 2);
    assert!(record.last_visited.is_some());
    assert_eq!(storage.get_note("journal").unwrap(), record);
}

#[test]
fn test_create_or_open_uses_template_for_new_notes() {
    let (_dir, storage) = setup();
    let templates = storage.paths().templates_dir();
    fs::create_dir_all(&templates).unwrap();
    fs::write(templates.join("meeting.md"), ".meeting\n## Attendees\n").unwrap();

    assert_eq!(storage.list_templates().unwrap(), vec!["meeting"]);

    let record = storage
        .create_or_open_note("standup", &SkipEditor, Some("meeting"))
        .unwrap();
    assert_eq!(record.tags, vec!["meeting"]);

    let err = storage
        .create_or_open_note("other", &SkipEditor, Some("missing"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!storage.note_dir().join("other.md").exists());
}

#[test]
fn test_reserved_word_is_rejected_before_touching_disk() {
    let (_dir, storage) = setup();

    let err = storage
        .create_or_open_note("search", &SkipEditor, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(!storage.paths().index_file().exists());
}

#[test]
fn test_reindex_preserves_created_timestamps() {
    let (_dir, storage) = setup();
    write_note(&storage, "a", ".x\nbody");
    write_note(&storage, "nested/b", "no tags\nbody");
    write_note(&storage, "drafts/ignored", "skip me");

    let first = storage.reindex_all().unwrap();
    assert_eq!(first.notes, 2);
    assert_eq!(first.tags, 1);

    // Pretend the notes were indexed long ago.
    let mut index = storage.load_index();
    for record in index.values_mut() {
        record.created = "200101.000000".to_string();
    }
    storage.save_index(&index).unwrap();

    storage.reindex_all().unwrap();
    storage.reindex_all().unwrap();

    let index = storage.load_index();
    assert_eq!(index.len(), 2);
    assert!(index.values().all(|r| r.created == "200101.000000"));
    assert!(index.contains_key("b"));
    assert!(!index.contains_key("ignored"));
}

#[test]
fn test_reindex_fails_fast_on_unreadable_note() {
    let (_dir, storage) = setup();
    write_note(&storage, "good", "fine");
    fs::write(storage.note_dir().join("bad.md"), [0xff, 0xfe, 0x00]).unwrap();

    let err = storage.reindex_all().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert!(storage.load_index().is_empty());
}

#[test]
fn test_corrupt_index_is_recovered_by_reindex() {
    let (_dir, storage) = setup();
    write_note(&storage, "a", "body");
    fs::write(storage.paths().index_file(), "not json").unwrap();

    assert!(storage.list_notes().is_empty());
    storage.reindex_all().unwrap();
    assert_eq!(titles(&storage.list_notes()), vec!["a"]);
}

#[test]
fn test_corrupt_tag_index_asks_for_reindex() {
    let (_dir, storage) = setup();
    write_note(&storage, "a", ".t\nbody");
    storage.reindex_all().unwrap();
    fs::write(storage.paths().tags_file(), "{").unwrap();

    let err = storage.search_by_tags(&["t".to_string()]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptState);

    storage.reindex_all().unwrap();
    assert_eq!(storage.search_by_tags(&["t".to_string()]).unwrap().len(), 1);
}

#[test]
fn test_stale_tag_index_is_fixed_by_reindex() {
    let (_dir, storage) = setup();
    write_note(&storage, "a", ".old\nbody");
    storage.reindex_all().unwrap();

    // Primary index saved, tag rebuild never happened.
    let mut index = storage.load_index();
    index.get_mut("a").unwrap().tags = vec!["new".to_string()];
    storage.save_index(&index).unwrap();
    assert!(storage.load_tag_index().unwrap().contains_key("old"));

    write_note(&storage, "a", ".new\nbody");
    storage.reindex_all().unwrap();
    let tags = storage.load_tag_index().unwrap();
    assert!(tags.contains_key("new"));
    assert!(!tags.contains_key("old"));
}

#[test]
fn test_pinning_rules() {
    let (_dir, storage) = setup();
    write_note(&storage, "a", "body");
    storage.reindex_all().unwrap();

    let err = storage.pin("ghost").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert!(storage.pin("a").unwrap());
    assert!(!storage.pin("a").unwrap());
    assert_eq!(storage.list_pinned(), vec!["a"]);

    assert!(storage.unpin("a").unwrap());
    assert!(!storage.unpin("a").unwrap());
    assert!(storage.list_pinned().is_empty());
}

#[test]
fn test_rename_moves_pin_and_file() {
    let (_dir, storage) = setup();
    write_note(&storage, "old", ".keep\nbody text");
    storage.reindex_all().unwrap();
    storage.pin("old").unwrap();
    let before = storage.get_note("old").unwrap();

    let record = storage.rename_note("old", "new").unwrap();

    assert_eq!(record.title, "new");
    assert_eq!(record.created, before.created);
    assert!(Path::new(&record.file_path).is_file());
    assert!(!Path::new(&before.file_path).exists());
    assert_eq!(storage.list_pinned(), vec!["new"]);
    assert!(storage.get_note("old").is_err());

    let tags = storage.load_tag_index().unwrap();
    assert_eq!(tags["keep"].notes, vec![record.file_path]);
}

#[test]
fn test_rename_onto_existing_title_changes_nothing() {
    let (_dir, storage) = setup();
    write_note(&storage, "a", "first");
    write_note(&storage, "b", "second");
    storage.reindex_all().unwrap();
    storage.pin("a").unwrap();
    let index_before = storage.load_index();

    let err = storage.rename_note("a", "b").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    assert_eq!(storage.load_index(), index_before);
    assert_eq!(storage.list_pinned(), vec!["a"]);
    assert_eq!(
        fs::read_to_string(storage.note_dir().join("b.md")).unwrap(),
        "second"
    );

    let err = storage.rename_note("ghost", "c").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_tag_edits_rewrite_the_tag_line() {
    let (_dir, storage) = setup();
    write_note(&storage, "plain", "first line\nbody");
    write_note(&storage, "tagged", ".a\nbody");
    storage.reindex_all().unwrap();

    let record = storage
        .add_tags_to_note("plain", &["Work".to_string(), "urgent".to_string()])
        .unwrap();
    assert_eq!(record.tags, vec!["work", "urgent"]);
    let content = fs::read_to_string(&record.file_path).unwrap();
    assert_eq!(content, ".work.urgent\nfirst line\nbody");

    let record = storage
        .add_tags_to_note("tagged", &["b".to_string(), "a".to_string()])
        .unwrap();
    assert_eq!(record.tags, vec!["a", "b"]);

    let record = storage
        .remove_tags_from_note("tagged", &["a".to_string(), "b".to_string()])
        .unwrap();
    assert!(record.tags.is_empty());
    assert_eq!(fs::read_to_string(&record.file_path).unwrap(), "\nbody");

    let tags = storage.load_tag_index().unwrap();
    assert!(!tags.contains_key("a"));
    assert_eq!(tags["work"].count, 1);

    let err = storage
        .add_tags_to_note("ghost", &["x".to_string()])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_delete_then_recover_rebuilds_the_record() {
    let (_dir, storage) = setup();
    let opened = storage
        .create_or_open_note("draft", &WriteContent(".idea\none two three"), None)
        .unwrap();
    assert!(opened.last_visited.is_some());
    storage.pin("draft").unwrap();

    let trashed = storage.delete_note("draft").unwrap();
    assert!(trashed.is_file());
    assert!(storage.get_note("draft").is_err());
    assert!(storage.list_pinned().is_empty());
    assert!(!storage.load_tag_index().unwrap().contains_key("idea"));
    assert_eq!(storage.list_trashed().unwrap(), vec!["draft"]);

    let recovered = storage.recover_note("draft").unwrap();
    assert!(!recovered.file_path.is_empty());
    assert_eq!(recovered.word_count, 3);
    assert_eq!(recovered.tags, vec!["idea"]);
    assert!(recovered.last_visited.is_none());
    assert!(storage.list_pinned().is_empty());
    assert!(storage.list_trashed().unwrap().is_empty());
    assert!(storage.load_tag_index().unwrap().contains_key("idea"));
}

#[test]
fn test_delete_and_recover_failures() {
    let (_dir, storage) = setup();
    write_note(&storage, "a", "body");
    storage.reindex_all().unwrap();

    assert_eq!(
        storage.delete_note("A").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        storage.recover_note("a").unwrap_err().kind(),
        ErrorKind::NotFound
    );

    storage.delete_note("a").unwrap();
    write_note(&storage, "a", "replacement");
    storage.reindex_all().unwrap();

    let err = storage.recover_note("a").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(
        fs::read_to_string(storage.note_dir().join("a.md")).unwrap(),
        "replacement"
    );
    assert_eq!(storage.list_trashed().unwrap(), vec!["a"]);
}

#[test]
fn test_trash_collisions_keep_both_files() {
    let (_dir, storage) = setup();
    write_note(&storage, "draft", "first");
    storage.reindex_all().unwrap();
    storage.delete_note("draft").unwrap();

    write_note(&storage, "draft", "second");
    storage.reindex_all().unwrap();
    storage.delete_note("draft").unwrap();

    let trashed = storage.list_trashed().unwrap();
    assert_eq!(trashed.len(), 2);
    assert!(trashed[0] == "draft");
    assert!(trashed[1].starts_with("draft~"));

    let recovered = storage.recover_note("draft").unwrap();
    assert_eq!(fs::read_to_string(&recovered.file_path).unwrap(), "second");
    assert_eq!(storage.search_trash("DRAFT").unwrap().len(), 1);
}

#[test]
fn test_empty_trash_counts_removed_files() {
    let (_dir, storage) = setup();
    assert_eq!(storage.empty_trash().unwrap(), 0);

    write_note(&storage, "a", "x");
    write_note(&storage, "b", "y");
    storage.reindex_all().unwrap();
    storage.delete_note("a").unwrap();
    storage.delete_note("b").unwrap();

    assert_eq!(storage.empty_trash().unwrap(), 2);
    assert!(storage.list_trashed().unwrap().is_empty());
    assert_eq!(
        storage.recover_note("a").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn test_tag_search_scores_by_matches() {
    let (_dir, storage) = setup();
    write_note(&storage, "A", ".work.urgent\n");
    write_note(&storage, "B", ".work.project\n");
    write_note(&storage, "C", ".personal\n");
    storage.reindex_all().unwrap();

    let hits = storage
        .search_by_tags(&["work".to_string(), "urgent".to_string()])
        .unwrap();
    let scored: Vec<(&str, i64)> = hits
        .iter()
        .map(|h| (h.record.title.as_str(), h.score))
        .collect();
    assert_eq!(scored, vec![("A", 2), ("B", 1)]);

    let strict = storage.filter_by_all_tags(&["work".to_string(), "urgent".to_string()]);
    assert_eq!(titles(&strict), vec!["A"]);
}

#[test]
fn test_title_search_is_case_insensitive() {
    let (_dir, storage) = setup();
    write_note(&storage, "Shopping List", "");
    write_note(&storage, "shop ideas", "");
    write_note(&storage, "other", "");
    storage.reindex_all().unwrap();

    let hits = storage.search_by_title("SHOP");
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.score == 1));

    let fuzzy = storage.fuzzy_search_titles("shpls");
    assert_eq!(fuzzy[0].record.title, "Shopping List");
}

#[test]
fn test_date_search_uses_chosen_field() {
    let (_dir, storage) = setup();
    write_note(&storage, "a", "");
    write_note(&storage, "b", "");
    storage.reindex_all().unwrap();

    let mut index = storage.load_index();
    index.get_mut("a").unwrap().created = "230615.120000".to_string();
    index.get_mut("a").unwrap().modified = "240215.080000".to_string();
    index.get_mut("b").unwrap().created = String::new();
    index.get_mut("b").unwrap().modified = "240301.000000".to_string();
    storage.save_index(&index).unwrap();

    let year = DateRange::parse("23", None).unwrap();
    assert_eq!(titles(&storage.search_by_date(&year, DateField::Created)), vec!["a"]);
    assert!(storage.search_by_date(&year, DateField::Modified).is_empty());

    let span = DateRange::parse("2402", Some("2403")).unwrap();
    assert_eq!(
        titles(&storage.search_by_date(&span, DateField::Modified)),
        vec!["a", "b"]
    );
    assert!(storage.search_by_date(&span, DateField::Created).is_empty());
}

#[test]
fn test_recent_and_popular_rankings() {
    let (_dir, storage) = setup();
    write_note(&storage, "a", ".x.y\n");
    write_note(&storage, "b", ".x\n");
    write_note(&storage, "c", ".z\n");
    storage.reindex_all().unwrap();

    let mut index = storage.load_index();
    index.get_mut("a").unwrap().modified = "240101.000000".to_string();
    index.get_mut("b").unwrap().modified = "240301.000000".to_string();
    index.get_mut("c").unwrap().modified = "240201.000000".to_string();
    index.get_mut("a").unwrap().last_visited = Some("240401.000000".to_string());
    storage.save_index(&index).unwrap();

    assert_eq!(titles(&storage.recent_notes(2)), vec!["a", "b"]);

    let popular = storage.popular_tags(2).unwrap();
    let names: Vec<&str> = popular.iter().map(|t| t.tag.as_str()).collect();
    assert_eq!(names, vec!["x", "y"]);
    assert_eq!(popular[0].count, 2);
}

#[test]
fn test_tag_remove_add_cycles_keep_the_body_in_place() {
    let (_dir, storage) = setup();
    write_note(&storage, "cycle", ".a\nbody");
    storage.reindex_all().unwrap();
    let before = storage.get_note("cycle").unwrap();

    for _ in 0..3 {
        storage
            .remove_tags_from_note("cycle", &["a".to_string()])
            .unwrap();
        storage.add_tags_to_note("cycle", &["a".to_string()]).unwrap();
    }

    let after = storage.get_note("cycle").unwrap();
    assert_eq!(fs::read_to_string(&after.file_path).unwrap(), ".a\nbody");
    assert_eq!(after.char_count, before.char_count);
    assert_eq!(after.tags, vec!["a"]);
}

#[test]
fn test_reindex_drops_pins_of_vanished_notes() {
    let (_dir, storage) = setup();
    write_note(&storage, "x", "body");
    write_note(&storage, "y", "body");
    storage.reindex_all().unwrap();
    storage.pin("x").unwrap();
    storage.pin("y").unwrap();

    fs::remove_file(storage.note_dir().join("x.md")).unwrap();
    let summary = storage.reindex_all().unwrap();
    assert_eq!(summary.pruned_pins, 1);
    assert_eq!(storage.list_pinned(), vec!["y"]);

    write_note(&storage, "x", "reborn");
    storage.reindex_all().unwrap();
    assert_eq!(storage.list_pinned(), vec!["y"]);
}

#[test]
fn test_corrupt_pins_load_as_empty_and_are_rewritten() {
    let (_dir, storage) = setup();
    write_note(&storage, "a", "body");
    storage.reindex_all().unwrap();
    fs::write(storage.paths().pins_file(), "{").unwrap();

    assert!(storage.list_pinned().is_empty());

    assert!(storage.pin("a").unwrap());
    let raw = fs::read_to_string(storage.paths().pins_file()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(parsed.get("a").is_some());
    assert_eq!(storage.list_pinned(), vec!["a"]);
}

#[test]
fn test_concurrent_upserts_all_land() {
    let (_dir, storage) = setup();
    let count = 16;
    for i in 0..count {
        write_note(&storage, &format!("note{}", i), ".t\nbody");
    }

    let handles: Vec<_> = (0..count)
        .map(|i| {
            let storage = storage.clone();
            std::thread::spawn(move || {
                let path = storage.resolve_path(&format!("note{}", i)).unwrap();
                storage.upsert(build_metadata(&path).unwrap()).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(storage.list_notes().len(), count);
    let tags = storage.load_tag_index().unwrap();
    assert_eq!(tags["t"].count, count);
    assert_eq!(tags["t"].notes.len(), count);
}

#[test]
fn test_reindex_reports_shadowed_duplicate_titles() {
    let (_dir, storage) = setup();
    write_note(&storage, "a/x", "first");
    write_note(&storage, "b/x", "second");

    let summary = storage.reindex_all().unwrap();
    assert_eq!(summary.notes, 1);
    assert_eq!(summary.shadowed, 1);
}

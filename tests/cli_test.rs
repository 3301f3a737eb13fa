use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn notedex(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("notedex").unwrap();
    cmd.arg("--store")
        .arg(dir.path().join("store"))
        .arg("--notes-dir")
        .arg(dir.path().join("notes"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn open_tag_and_search() {
    let dir = TempDir::new().unwrap();

    notedex(&dir)
        .args(["open", "--no-edit", "groceries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("groceries.md"));
    assert!(dir.path().join("notes/groceries.md").is_file());

    notedex(&dir)
        .args(["tag", "groceries", "errands,home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#errands"));

    notedex(&dir)
        .args(["search", "--tags", "home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("groceries"));

    notedex(&dir)
        .args(["search", "GROC"])
        .assert()
        .success()
        .stdout(predicate::str::contains("groceries"));
}

#[test]
fn pin_delete_recover_cycle() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("notes")).unwrap();
    fs::write(dir.path().join("notes/todo.md"), ".work\nship it").unwrap();

    notedex(&dir)
        .arg("reindex")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed 1 notes, 1 tags"));

    notedex(&dir).args(["pin", "todo"]).assert().success();
    notedex(&dir)
        .args(["pin", "todo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already pinned"));

    notedex(&dir).args(["delete", "todo"]).assert().success();
    notedex(&dir)
        .arg("trash")
        .assert()
        .success()
        .stdout(predicate::str::contains("todo"));
    notedex(&dir)
        .arg("pins")
        .assert()
        .success()
        .stdout(predicate::str::contains("No notes found."));

    notedex(&dir).args(["recover", "todo"]).assert().success();
    assert!(dir.path().join("notes/todo.md").is_file());

    notedex(&dir)
        .args(["empty-trash", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Trash is empty."));
}

#[test]
fn failures_exit_non_zero() {
    let dir = TempDir::new().unwrap();

    notedex(&dir)
        .args(["pin", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Note not found: ghost"));

    notedex(&dir)
        .args(["date", "2413"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date specifier"));

    notedex(&dir)
        .args(["open", "--no-edit", "../escape"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("escapes the note directory"));
}

#[test]
fn relative_store_inside_notes_dir_skips_trash() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("notes")).unwrap();
    fs::write(dir.path().join("notes/old.md"), "bye").unwrap();

    let run = |args: &[&str]| {
        let mut cmd = Command::cargo_bin("notedex").unwrap();
        cmd.current_dir(dir.path())
            .args(["--store", "notes/.store", "--notes-dir", "notes"])
            .args(args)
            .env_remove("RUST_LOG");
        cmd
    };

    run(&["reindex"]).assert().success();
    run(&["delete", "old"]).assert().success();
    assert!(dir.path().join("notes/.store/trash/old.md").is_file());

    run(&["reindex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed 0 notes, 0 tags"));
}

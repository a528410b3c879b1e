//! Whole-run scenarios against on-disk stores: id sequencing, transaction
//! boundaries across reopen, the version gate and session cleanup.
//!
//! Run with: `cargo test --test end_to_end`

use std::path::{Path, PathBuf};

use symtrail::config::WriterConfig;
use symtrail::db::SUPPORTED_DATABASE_VERSION;
use symtrail::name::NameHierarchy;
use symtrail::types::{ReferenceKind, SourceRange, SymbolKind};
use symtrail::{Writer, WriterError};

fn temp_db() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("project.srctrldb");
    (dir, path)
}

fn open(path: &Path) -> Writer {
    let mut writer = Writer::default();
    writer.open(path).expect("open database");
    writer
}

fn no_wrap() -> WriterConfig {
    let mut config = WriterConfig::default();
    config.session.wrap_in_transaction = false;
    config
}

#[test]
fn test_id_sequence_for_inheritance_scenario() {
    let (_dir, path) = temp_db();
    let mut writer = open(&path);
    writer.begin().unwrap();

    writer.register_file("/a.cpp").unwrap();
    let api_name = NameHierarchy::with_delimiter(".", "api");
    let api = writer.record_symbol(&api_name).unwrap();
    let my_type = writer.record_symbol(&api_name.child("MyType")).unwrap();
    let base = writer
        .record_symbol(&NameHierarchy::with_delimiter(".", "BaseType"))
        .unwrap();
    let inherits = writer
        .create_reference(my_type, base, ReferenceKind::Inheritance)
        .unwrap();
    let again = writer
        .create_reference(my_type, base, ReferenceKind::Inheritance)
        .unwrap();

    assert_eq!(api.get(), 1);
    assert_eq!(my_type.get(), 2);
    assert_eq!(base.get(), 3);
    assert_eq!(inherits.get(), 4);
    assert_eq!(again, inherits);
    writer.commit().unwrap();
}

#[test]
fn test_identity_survives_reopen() {
    let (_dir, path) = temp_db();
    let name = NameHierarchy::with_delimiter("::", "std").child("string");

    let first = {
        let writer = open(&path);
        writer.record_symbol(&name).unwrap()
    };
    let writer = open(&path);
    assert_eq!(writer.record_symbol(&name).unwrap(), first);
    assert_eq!(writer.database().unwrap().stats().unwrap().num_symbols, 1);
}

#[test]
fn test_rollback_is_invisible_after_reopen() {
    let (_dir, path) = temp_db();
    {
        let mut writer = open(&path);
        writer.begin().unwrap();
        for name in ["one", "two", "three"] {
            writer
                .record_symbol(&NameHierarchy::from_single_name(name))
                .unwrap();
        }
        writer.rollback().unwrap();
        writer.close().unwrap();
    }

    let writer = open(&path);
    assert!(writer.is_empty().unwrap());
}

#[test]
fn test_version_gate_refuses_and_preserves_store() {
    let (_dir, path) = temp_db();
    {
        let writer = open(&path);
        writer.register_file("/a.cpp").unwrap();
    }
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute(
            "UPDATE meta SET value = ?1 WHERE key = 'storage_version'",
            [(SUPPORTED_DATABASE_VERSION - 1).to_string()],
        )
        .unwrap();
    }

    let mut writer = Writer::default();
    let err = writer.open(&path).unwrap_err();
    assert!(matches!(err, WriterError::IncompatibleVersion { .. }));
    assert!(!writer.is_open());
    assert!(writer.last_error().is_some());

    let conn = rusqlite::Connection::open(&path).unwrap();
    let files: i64 = conn
        .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
        .unwrap();
    let version: String = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'storage_version'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(files, 1);
    assert_eq!(version, (SUPPORTED_DATABASE_VERSION - 1).to_string());
}

#[test]
fn test_clear_restarts_ids() {
    let (_dir, path) = temp_db();
    let mut writer = open(&path);
    writer
        .record_symbol(&NameHierarchy::from_single_name("old"))
        .unwrap();
    writer.register_file("/old.cpp").unwrap();

    writer.clear().unwrap();
    assert!(writer.is_empty().unwrap());
    let fresh = writer
        .record_symbol(&NameHierarchy::from_single_name("new"))
        .unwrap();
    assert_eq!(fresh.get(), 1);
    assert_eq!(writer.register_file("/new.cpp").unwrap().get(), 1);
}

#[test]
fn test_session_commits_on_success() {
    let (_dir, path) = temp_db();
    let id = Writer::session(&path, WriterConfig::default(), |writer| {
        let file = writer.register_file("/lib.rs")?;
        let sym = writer.record_symbol(&NameHierarchy::from_single_name("run"))?;
        writer.set_symbol_kind(sym, SymbolKind::Function)?;
        writer.set_symbol_location(sym, &SourceRange::new(file, 3, 4, 3, 6)?)?;
        Ok::<_, WriterError>(sym)
    })
    .unwrap();

    let writer = open(&path);
    let stored = writer.database().unwrap().symbol(id).unwrap().unwrap();
    assert_eq!(stored.kind, Some(SymbolKind::Function));
    assert!(stored.location.is_some());
}

#[test]
fn test_session_rolls_back_on_error() {
    let (_dir, path) = temp_db();
    let result = Writer::session(&path, WriterConfig::default(), |writer| {
        writer.record_symbol(&NameHierarchy::from_single_name("a"))?;
        writer.record_symbol(&NameHierarchy::from_single_name("b"))?;
        // an inverted range aborts the run
        SourceRange::new(writer.register_file("/x.c")?, 9, 1, 2, 1)?;
        Ok::<_, WriterError>(())
    });
    assert!(matches!(result, Err(WriterError::InvalidRange { .. })));

    let writer = open(&path);
    assert!(writer.is_empty().unwrap());
}

#[test]
fn test_session_releases_store_after_panic() {
    let (_dir, path) = temp_db();
    let outcome = std::panic::catch_unwind(|| {
        let _ = Writer::session(&path, WriterConfig::default(), |writer| {
            writer.record_symbol(&NameHierarchy::from_single_name("doomed"))?;
            if writer.is_open() {
                panic!("analyzer crashed");
            }
            Ok::<_, WriterError>(())
        });
    });
    assert!(outcome.is_err());

    // not locked, and nothing from the crashed run survived
    let writer = open(&path);
    assert!(writer.is_empty().unwrap());
}

#[test]
fn test_session_can_clear_previous_run() {
    let (_dir, path) = temp_db();
    Writer::session(&path, no_wrap(), |writer| {
        writer.record_symbol(&NameHierarchy::from_single_name("stale"))?;
        Ok::<_, WriterError>(())
    })
    .unwrap();

    let fresh = Writer::session(&path, WriterConfig::default().clearing(), |writer| {
        writer.record_symbol(&NameHierarchy::from_single_name("fresh"))
    })
    .unwrap();
    assert_eq!(fresh.get(), 1);

    let writer = open(&path);
    assert_eq!(writer.database().unwrap().stats().unwrap().num_symbols, 1);
}

#[test]
fn test_second_writer_cannot_open_while_first_holds_store() {
    let (_dir, path) = temp_db();
    let first = open(&path);

    let mut second = Writer::default();
    assert!(matches!(
        second.open(&path),
        Err(WriterError::Locked { .. })
    ));

    drop(first);
    second.open(&path).unwrap();
}

#[test]
fn test_unsolved_call_sites_survive_reopen() {
    let (_dir, path) = temp_db();
    let id = Writer::session(&path, WriterConfig::default(), |writer| {
        let file = writer.register_file("/main.c")?;
        let main = writer.record_symbol(&NameHierarchy::from_single_name("main"))?;
        let first = SourceRange::new(file, 3, 5, 3, 7)?;
        let second = SourceRange::new(file, 7, 5, 7, 7)?;
        writer.create_unsolved_reference(main, ReferenceKind::Call, &first)?;
        writer.create_unsolved_reference(main, ReferenceKind::Call, &second)
    })
    .unwrap();

    let writer = open(&path);
    let stored = writer.database().unwrap().reference(id).unwrap().unwrap();
    let lines: Vec<u32> = stored.occurrences.iter().map(|r| r.start_line).collect();
    assert_eq!(lines, vec![3, 7]);
}

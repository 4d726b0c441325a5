use super::{BookStorage, BookStore};
use crate::book::{Book, Container};
use crate::error::{BookError, OutlineError, SyncError};
use crate::movement::Movement;
use crate::section::{Level, Section, SectionUpdate};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn section(id: &str, level: Level, order: u32, parent: Option<&str>, path: &str) -> Section {
    Section {
        id: id.to_string(),
        level,
        order,
        parent_id: parent.map(str::to_string),
        file_path: path.to_string(),
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// One chapter on disk with a title page and two S2 sections.
fn fixture() -> (TempDir, Book) {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "01 Ch/01-title.md", "# 1 Chapter\n");
    write(dir.path(), "01 Ch/01-alpha.md", "## 1.1 Alpha\n\nA.\n");
    write(dir.path(), "01 Ch/02-beta.md", "## 1.2 Beta\n\nB.\n");
    let book = Book {
        introduction: None,
        chapters: vec![Container {
            id: "ch1".to_string(),
            sections: vec![
                section("s1", Level::S1, 1, None, "01 Ch/01-title.md"),
                section("alpha", Level::S2, 1, Some("s1"), "01 Ch/01-alpha.md"),
                section("beta", Level::S2, 2, Some("s1"), "01 Ch/02-beta.md"),
            ],
        }],
        appendices: Vec::new(),
    };
    (dir, book)
}

#[test]
fn test_storage_round_trip() {
    let (dir, book) = fixture();
    let storage = BookStorage::new(dir.path());

    assert!(!storage.exists());
    assert_eq!(storage.load().unwrap(), None);

    storage.create_new(book.clone()).unwrap();
    assert!(storage.exists());
    assert_eq!(storage.load().unwrap(), Some(book.clone()));

    let json = fs::read_to_string(dir.path().join("book-structure.json")).unwrap();
    assert!(json.contains("\"parentId\": \"s1\""));
    assert!(json.contains("\"filePath\": \"01 Ch/01-alpha.md\""));

    assert!(matches!(
        storage.create_new(book),
        Err(BookError::AlreadyExists(_))
    ));

    storage.delete().unwrap();
    assert!(!storage.exists());
    storage.delete().unwrap();
}

#[test]
fn test_storage_rejects_invalid_json() {
    let dir = TempDir::new().unwrap();
    let storage = BookStorage::with_file_name(dir.path(), "outline.json");
    fs::write(storage.path(), "{ not json").unwrap();

    assert!(matches!(storage.load(), Err(BookError::Json(_))));
}

#[test]
fn test_open_requires_structure_file() {
    let dir = TempDir::new().unwrap();

    let result = BookStore::open(BookStorage::new(dir.path()));

    assert!(matches!(result, Err(BookError::NotFound(_))));
}

#[test]
fn test_open_validates_outline() {
    let (dir, mut book) = fixture();
    book.chapters[0].sections[2].order = 5;
    let storage = BookStorage::new(dir.path());
    storage.save(&book).unwrap();

    let result = BookStore::open(storage);

    assert!(matches!(
        result,
        Err(BookError::Outline(OutlineError::InvalidStructure(_)))
    ));
}

#[test]
fn test_apply_updates_marks_dirty() {
    let (dir, book) = fixture();
    let mut store = BookStore::new(BookStorage::new(dir.path()), book);
    assert!(!store.is_dirty());

    let mut update = SectionUpdate::unchanged(&store.book().chapters[0].sections[2]);
    update.order = 1;
    store.apply_updates("ch1", &[update]).unwrap();

    assert!(store.is_dirty());
    assert_eq!(store.book().chapters[0].sections[2].order, 1);
    assert!(matches!(
        store.apply_updates("nope", &[]),
        Err(BookError::ContainerNotFound(id)) if id == "nope"
    ));
}

#[test]
fn test_move_section_end_to_end() {
    let (dir, book) = fixture();
    let storage = BookStorage::new(dir.path());
    storage.create_new(book).unwrap();
    let mut store = BookStore::open(storage.clone()).unwrap();

    let updates = store.move_section("beta", Movement::Up).unwrap();
    assert_eq!(updates.len(), 2);
    assert!(store.is_dirty());

    let sections = &store.book().chapters[0].sections;
    assert_eq!(sections[2].order, 1);
    assert_eq!(sections[2].file_path, "01 Ch/01-beta.md");
    assert_eq!(sections[1].file_path, "01 Ch/02-alpha.md");
    assert_eq!(
        fs::read_to_string(dir.path().join("01 Ch/01-beta.md")).unwrap(),
        "## 1.1 Beta\n\nB.\n"
    );

    store.save().unwrap();
    assert!(!store.is_dirty());
    let reloaded = storage.load().unwrap().unwrap();
    assert_eq!(&reloaded, store.book());
}

#[test]
fn test_failed_move_leaves_store_untouched() {
    let (dir, book) = fixture();
    let mut store = BookStore::new(BookStorage::new(dir.path()), book.clone());

    assert!(matches!(
        store.move_section("s1", Movement::Down),
        Err(BookError::Outline(OutlineError::InvalidOperation(_)))
    ));

    fs::remove_file(dir.path().join("01 Ch/01-alpha.md")).unwrap();
    assert!(matches!(
        store.move_section("beta", Movement::Up),
        Err(BookError::Sync(SyncError::FileNotFound(_)))
    ));

    assert!(matches!(
        store.move_section("ghost", Movement::Up),
        Err(BookError::Outline(OutlineError::SectionNotFound(_)))
    ));

    assert_eq!(store.book(), &book);
    assert!(!store.is_dirty());
    assert!(dir.path().join("01 Ch/02-beta.md").exists());
}

#[test]
fn test_plan_move_touches_nothing() {
    let (dir, book) = fixture();
    let store = BookStore::new(BookStorage::new(dir.path()), book.clone());

    let planned = store.plan_move("alpha", Movement::Down).unwrap();

    assert_eq!(planned.container_id, "ch1");
    assert_eq!(planned.updates.len(), 2);
    assert_eq!(planned.plan.edits.len(), 2);
    assert_eq!(store.book(), &book);
    assert!(dir.path().join("01 Ch/01-alpha.md").exists());
    assert!(!dir.path().join("01 Ch/02-alpha.md").exists());
}

//! The book store is the single owner of a manuscript's structure during a session.
//!
//! It bridges the persisted `book-structure.json`, the pure movement engine and the files on
//! disk. A move is computed against a snapshot of the container, written to the files, and
//! only then applied to the in-memory tree, so a failed move leaves the store exactly as it
//! was. Changes are kept in memory (and flagged dirty) until [`BookStore::save`].

use crate::book::Book;
use crate::edit_plan::EditPlan;
use crate::error::{BookError, OutlineError};
use crate::movement::Movement;
use crate::section::{validate_sections, SectionUpdate};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default name of the persisted structure file.
pub const STRUCTURE_FILE: &str = "book-structure.json";

#[derive(Clone, Debug)]
/// JSON persistence of a [`Book`] inside its root folder.
pub struct BookStorage {
    root: PathBuf,
    file_name: String,
}

impl BookStorage {
    #[must_use]
    /// Storage for the book at `root`, using the default structure file name.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_file_name(root, STRUCTURE_FILE)
    }

    #[must_use]
    /// Storage for the book at `root` with a custom structure file name.
    pub fn with_file_name(root: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            file_name: file_name.into(),
        }
    }

    #[must_use]
    /// Folder the book's file paths are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    /// Full path of the structure file.
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.file_name)
    }

    #[must_use]
    /// Whether a structure file exists.
    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Load the book structure, or `None` if no structure file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid book structure.
    pub fn load(&self) -> Result<Option<Book>, BookError> {
        let path = self.path();
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BookError::io(path, e)),
        }
    }

    /// Write the book structure as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the write fails.
    pub fn save(&self, book: &Book) -> Result<(), BookError> {
        let path = self.path();
        let json = serde_json::to_string_pretty(book)?;
        fs::write(&path, json).map_err(|e| BookError::io(&path, e))?;
        tracing::info!(path = %path.display(), "saved book structure");
        Ok(())
    }

    /// Persist `book` as a new structure file.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::AlreadyExists`] if a structure file is already present, or
    /// any error of [`BookStorage::save`].
    pub fn create_new(&self, book: Book) -> Result<Book, BookError> {
        if self.exists() {
            return Err(BookError::AlreadyExists(self.path()));
        }
        self.save(&book)?;
        Ok(book)
    }

    /// Remove the structure file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn delete(&self) -> Result<(), BookError> {
        let path = self.path();
        match fs::remove_file(&path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(BookError::io(path, e)),
            _ => Ok(()),
        }
    }
}

#[derive(Debug)]
/// A movement computed against the current structure but not yet carried out.
pub struct PlannedMove {
    /// Container holding the moved section.
    pub container_id: String,
    /// Outline changes for the container.
    pub updates: Vec<SectionUpdate>,
    /// File renames and heading rewrites.
    pub plan: EditPlan,
}

/// Owns the book structure and coordinates movements with the files on disk.
pub struct BookStore {
    storage: BookStorage,
    book: Book,
    dirty: bool,
}

impl BookStore {
    /// Wraps an already loaded or freshly parsed book.
    #[must_use]
    pub fn new(storage: BookStorage, book: Book) -> Self {
        Self {
            storage,
            book,
            dirty: false,
        }
    }

    /// Loads the book persisted at `storage` and validates every container's outline.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::NotFound`] if no structure file exists, or an error if it
    /// cannot be read, parsed, or holds an invalid outline.
    pub fn open(storage: BookStorage) -> Result<Self, BookError> {
        let book = storage
            .load()?
            .ok_or_else(|| BookError::NotFound(storage.root().to_path_buf()))?;
        for (_, container) in book.containers() {
            validate_sections(&container.sections)?;
        }
        tracing::info!(
            root = %storage.root().display(),
            sections = book.section_count(),
            "loaded book structure"
        );
        Ok(Self::new(storage, book))
    }

    #[must_use]
    /// Current in-memory structure.
    pub fn book(&self) -> &Book {
        &self.book
    }

    #[must_use]
    /// Persistence backing this store.
    pub fn storage(&self) -> &BookStorage {
        &self.storage
    }

    #[must_use]
    /// Whether there are changes not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag the structure as changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Applies section updates to the container with `container_id`.
    ///
    /// Updates for sections outside the container are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::ContainerNotFound`] if no container has this id.
    pub fn apply_updates(
        &mut self,
        container_id: &str,
        updates: &[SectionUpdate],
    ) -> Result<(), BookError> {
        let container = self
            .book
            .container_mut(container_id)
            .ok_or_else(|| BookError::ContainerNotFound(container_id.to_string()))?;

        for update in updates {
            if let Some(section) = container.sections.iter_mut().find(|s| s.id == update.id) {
                update.apply_to(section);
            }
        }

        self.mark_dirty();
        Ok(())
    }

    /// Computes the updates and edit plan for a movement without changing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is unknown, the movement is illegal, or the files
    /// it touches cannot be prepared.
    pub fn plan_move(
        &self,
        section_id: &str,
        movement: Movement,
    ) -> Result<PlannedMove, BookError> {
        let container = self
            .book
            .container_of(section_id)
            .ok_or_else(|| OutlineError::SectionNotFound(section_id.to_string()))?;

        let updates = movement.compute(section_id, &container.sections)?;
        let plan = EditPlan::prepare(self.storage.root(), &updates, &container.sections)?;
        Ok(PlannedMove {
            container_id: container.id.clone(),
            updates,
            plan,
        })
    }

    /// Moves a section, renaming and rewriting its files before updating the outline.
    ///
    /// The in-memory outline is only changed once every file has been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the movement is illegal or synchronising the files fails.
    pub fn move_section(
        &mut self,
        section_id: &str,
        movement: Movement,
    ) -> Result<Vec<SectionUpdate>, BookError> {
        let PlannedMove {
            container_id,
            updates,
            plan,
        } = self.plan_move(section_id, movement)?;
        plan.apply()?;
        self.apply_updates(&container_id, &updates)?;

        tracing::info!(
            section = section_id,
            %movement,
            updates = updates.len(),
            "moved section"
        );
        Ok(updates)
    }

    /// Persist the current structure and clear the dirty flag.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the structure file fails.
    pub fn save(&mut self) -> Result<(), BookError> {
        self.storage.save(&self.book)?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/book_store.rs"]
mod tests;

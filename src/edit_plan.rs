//! The edit plan turns section updates into renames and heading rewrites on disk.
//!
//! Synchronisation happens in two steps. [`EditPlan::prepare`] is read-only: it resolves
//! every old and new path, checks that all source files exist, reads them and computes
//! their rewritten headings, so a batch that cannot succeed fails before anything is
//! touched. [`EditPlan::apply`] then performs the renames and writes strictly in plan
//! order, restoring every touched file from the snapshot taken during preparation if any
//! step fails.

use crate::error::SyncError;
use crate::numbering::{calculate_heading_prefix, rewrite_heading};
use crate::section::{apply_updates, descendants, Level, Section, SectionUpdate};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Serialize, Clone, Debug)]
/// Ordered collection of file modifications for one movement.
pub struct EditPlan {
    /// File changes in the order they are applied.
    pub edits: Vec<Edit>,
}

#[derive(Serialize, Clone, Debug)]
/// Rename and heading rewrite for the file backing one section.
pub struct Edit {
    /// Section whose file is edited.
    pub section_id: String,
    /// Current location of the file.
    pub old_path: PathBuf,
    /// Location after the edit, equal to `old_path` when the order is unchanged.
    pub new_path: PathBuf,
    /// Heading level written to the file.
    pub level: Level,
    /// Dotted number written in front of the heading title.
    pub heading_prefix: String,
    /// File content before the edit, restored if the batch fails.
    #[serde(skip)]
    pub original: String,
    /// File content after the edit.
    #[serde(skip)]
    pub content: String,
}

impl Edit {
    #[must_use]
    /// Whether applying this edit moves the file.
    pub fn renames(&self) -> bool {
        self.old_path != self.new_path
    }

    fn staging_path(&self, index: usize) -> PathBuf {
        let file_name = self
            .old_path
            .file_name()
            .map_or_else(String::new, |name| name.to_string_lossy().into_owned());
        self.old_path
            .with_file_name(format!(".{file_name}.moving-{index}"))
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Progress {
    Untouched,
    Staged,
    Placed,
}

impl EditPlan {
    /// Computes every rename and heading rewrite for `updates` without touching the disk.
    ///
    /// `all_sections` is the snapshot taken before the movement: it supplies each section's
    /// current file path and, once projected through `updates`, the parent chain used for
    /// heading prefixes. Relative paths are resolved against `root`. Sections below a moved
    /// section get heading-only edits since their dotted prefix changes with it.
    ///
    /// # Errors
    ///
    /// - [`SyncError::SectionNotFound`] if an update's id is not in `all_sections`.
    /// - [`SyncError::FileNotFound`] if any source file is missing.
    /// - [`SyncError::NoHeadingFound`] if a source file has no heading line.
    /// - [`SyncError::PathConflict`] if a rename target is occupied by a file outside the
    ///   batch, two edits target the same path, or a staging file left by an earlier run
    ///   is still in place.
    /// - [`SyncError::Io`] if a source file cannot be read.
    pub fn prepare(
        root: &Path,
        updates: &[SectionUpdate],
        all_sections: &[Section],
    ) -> Result<Self, SyncError> {
        let projected = apply_updates(all_sections, updates);
        let targets = collect_targets(updates, all_sections, &projected)?;

        let mut sources = HashSet::new();
        let mut planned: Vec<(SectionUpdate, PathBuf)> = Vec::new();
        for (update, old_file_path) in targets {
            let old_path = root.join(old_file_path);
            if sources.insert(old_path.clone()) {
                planned.push((update, old_path));
            }
        }

        for (_, old_path) in &planned {
            if !old_path.exists() {
                return Err(SyncError::FileNotFound(old_path.clone()));
            }
        }

        let mut destinations = HashSet::new();
        let mut edits = Vec::with_capacity(planned.len());
        for (update, old_path) in planned {
            let new_path = root.join(&update.file_path);
            let taken = new_path != old_path && new_path.exists() && !sources.contains(&new_path);
            if taken || !destinations.insert(new_path.clone()) {
                return Err(SyncError::PathConflict(new_path));
            }

            let original = fs::read_to_string(&old_path)
                .map_err(|e| SyncError::io("read", &old_path, e))?;
            let heading_prefix = calculate_heading_prefix(&update, &projected);
            let content = rewrite_heading(&original, update.level, &heading_prefix)
                .ok_or_else(|| SyncError::NoHeadingFound(old_path.clone()))?;

            let edit = Edit {
                section_id: update.id,
                old_path,
                new_path,
                level: update.level,
                heading_prefix,
                original,
                content,
            };
            let staging = edit.staging_path(edits.len());
            if edit.renames() && staging.exists() {
                return Err(SyncError::PathConflict(staging));
            }
            edits.push(edit);
        }

        tracing::debug!(edits = edits.len(), "prepared edit plan");
        Ok(Self { edits })
    }

    /// Apply all edits in the plan.
    ///
    /// Moving files are first renamed to staging names next to their old location, then
    /// each edit moves its file into place and writes the rewritten heading. Staging keeps
    /// two siblings that swap orders from overwriting each other.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] naming the failing path. Files already touched by the
    /// batch are put back at their old paths with their original content first.
    pub fn apply(&self) -> Result<(), SyncError> {
        let mut progress = vec![Progress::Untouched; self.edits.len()];

        if let Err(error) = self.execute(&mut progress) {
            tracing::warn!(%error, "edit plan failed, restoring files");
            self.rollback(&progress);
            return Err(error);
        }

        tracing::info!(edits = self.edits.len(), "applied edit plan");
        Ok(())
    }

    fn execute(&self, progress: &mut [Progress]) -> Result<(), SyncError> {
        for (index, edit) in self.edits.iter().enumerate() {
            if edit.renames() {
                let staging = edit.staging_path(index);
                fs::rename(&edit.old_path, &staging)
                    .map_err(|e| SyncError::io("rename", &edit.old_path, e))?;
                progress[index] = Progress::Staged;
            }
        }

        for (index, edit) in self.edits.iter().enumerate() {
            if edit.renames() {
                fs::rename(edit.staging_path(index), &edit.new_path)
                    .map_err(|e| SyncError::io("rename", &edit.new_path, e))?;
            }
            progress[index] = Progress::Placed;
            fs::write(&edit.new_path, &edit.content)
                .map_err(|e| SyncError::io("write", &edit.new_path, e))?;
            tracing::debug!(
                section = %edit.section_id,
                path = %edit.new_path.display(),
                "rewrote heading"
            );
        }

        Ok(())
    }

    /// Best effort: failures are logged and the remaining files still restored.
    fn rollback(&self, progress: &[Progress]) {
        let touched: Vec<(usize, &Edit)> = self
            .edits
            .iter()
            .enumerate()
            .filter(|(index, _)| progress[*index] != Progress::Untouched)
            .collect();

        for &(index, edit) in &touched {
            let location = match progress[index] {
                Progress::Staged => edit.staging_path(index),
                _ => edit.new_path.clone(),
            };
            if location == edit.old_path {
                continue;
            }
            if let Err(error) = fs::remove_file(&location) {
                if error.kind() != io::ErrorKind::NotFound {
                    tracing::error!(path = %location.display(), %error, "failed to remove during rollback");
                }
            }
        }

        for (_, edit) in touched {
            if let Err(error) = fs::write(&edit.old_path, &edit.original) {
                tracing::error!(path = %edit.old_path.display(), %error, "failed to restore during rollback");
            }
        }
    }
}

/// Pairs every update with its section's current path, then appends heading-only
/// refreshes for sections sitting below a renumbered or re-parented one.
fn collect_targets(
    updates: &[SectionUpdate],
    all_sections: &[Section],
    projected: &[Section],
) -> Result<Vec<(SectionUpdate, String)>, SyncError> {
    let mut targets = Vec::with_capacity(updates.len());
    let mut covered: HashSet<String> = HashSet::new();
    let mut repositioned = Vec::new();

    for update in updates {
        let section = all_sections
            .iter()
            .find(|s| s.id == update.id)
            .ok_or_else(|| SyncError::SectionNotFound(update.id.clone()))?;
        targets.push((update.clone(), section.file_path.clone()));
        covered.insert(update.id.clone());
        if section.order != update.order || section.parent_id != update.parent_id {
            repositioned.push(update.id.as_str());
        }
    }

    for id in repositioned {
        for descendant_id in descendants(id, projected) {
            if !covered.insert(descendant_id.clone()) {
                continue;
            }
            if let Some(descendant) = projected.iter().find(|s| s.id == descendant_id) {
                targets.push((
                    SectionUpdate::unchanged(descendant),
                    descendant.file_path.clone(),
                ));
            }
        }
    }

    Ok(targets)
}

/// Applies `updates` to the files named in `all_sections`, with paths used as given.
///
/// # Errors
///
/// See [`EditPlan::prepare`] and [`EditPlan::apply`].
pub fn apply_file_system_changes(
    updates: &[SectionUpdate],
    all_sections: &[Section],
) -> Result<(), SyncError> {
    EditPlan::prepare(Path::new(""), updates, all_sections)?.apply()
}

#[must_use]
/// Dry-run check that every file touched by `updates` can currently be read.
pub fn validate_files_exist(updates: &[SectionUpdate], all_sections: &[Section]) -> bool {
    updates.iter().all(|update| {
        let Some(section) = all_sections.iter().find(|s| s.id == update.id) else {
            tracing::debug!(section = %update.id, "file validation failed: unknown section");
            return false;
        };
        match fs::read_to_string(&section.file_path) {
            Ok(_) => true,
            Err(error) => {
                tracing::debug!(path = %section.file_path, %error, "file validation failed");
                false
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/edit_plan.rs"]
mod tests;

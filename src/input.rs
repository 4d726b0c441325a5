//! Discovery of manuscript folders and extraction of their outlines.
//!
//! A book root holds one folder per container: `Introduction`, numbered chapter folders
//! (`01 Getting Started`) and appendix folders (`Appendix A`). Within a folder, files sorted
//! by name give the reading order and the first heading of each file gives its level. The
//! hierarchy is rebuilt from that sequence: every section hangs under the closest preceding
//! section one level up.

use crate::book::{Book, Container, ContainerKind};
use crate::error::{BookError, OutlineError};
use crate::formats::markdown::MarkdownFormat;
use crate::formats::{Format, Heading};
use crate::section::{Level, Section};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Parses every container folder under `root` into a [`Book`].
///
/// Folders are visited in name order. Part folders are recognised but not modelled and
/// are skipped, as are folders matching no container pattern and containers without any
/// headed file.
///
/// # Errors
///
/// Returns an error if a folder cannot be listed, a file cannot be read, or a container's
/// headings do not form a valid outline.
pub fn parse_book(root: &Path, extensions: &[String]) -> Result<Book, BookError> {
    let format = MarkdownFormat;
    let mut book = Book::default();

    for folder in sorted_entries(root, Path::is_dir)? {
        let Some(kind) = classify(&folder) else {
            tracing::debug!(folder = %folder, "skipping folder");
            continue;
        };

        let sections = parse_container(root, &folder, extensions, &format)?;
        if sections.is_empty() {
            tracing::warn!(folder = %folder, "no headed files found, skipping container");
            continue;
        }
        let container = Container {
            id: generate_id(),
            sections,
        };

        match kind {
            ContainerKind::Introduction if book.introduction.is_some() => {
                tracing::warn!(folder = %folder, "ignoring additional introduction folder");
            }
            ContainerKind::Introduction => book.introduction = Some(container),
            ContainerKind::Chapter => book.chapters.push(container),
            ContainerKind::Appendix => book.appendices.push(container),
        }
    }

    tracing::info!(
        chapters = book.chapters.len(),
        appendices = book.appendices.len(),
        sections = book.section_count(),
        "parsed book structure"
    );
    Ok(book)
}

#[must_use]
/// Container role of a top-level folder name, if it is one.
pub fn classify(folder: &str) -> Option<ContainerKind> {
    let lower = folder.to_ascii_lowercase();
    let numbered_after = |prefix: &str| {
        lower
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix(char::is_whitespace))
            .is_some_and(|rest| rest.trim_start().starts_with(|c: char| c.is_ascii_digit()))
    };

    if lower == "introduction" {
        Some(ContainerKind::Introduction)
    } else if numbered_after("part") || numbered_after("p") {
        tracing::info!(folder, "part folders are not supported yet");
        None
    } else if ["appendix", "a"].iter().any(|prefix| {
        lower
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
    }) {
        Some(ContainerKind::Appendix)
    } else if folder.starts_with(|c: char| c.is_ascii_digit()) {
        Some(ContainerKind::Chapter)
    } else {
        None
    }
}

/// Reads the outline of one container folder, relative to the book root.
///
/// File paths in the returned sections are `folder/file-name`, joined with `/`.
///
/// # Errors
///
/// Returns an error if the folder cannot be listed, a file cannot be read, or the headings
/// do not form a valid outline.
pub fn parse_container(
    root: &Path,
    folder: &str,
    extensions: &[String],
    format: &impl Format,
) -> Result<Vec<Section>, BookError> {
    let directory = root.join(folder);
    let files = sorted_entries(&directory, |path| {
        path.is_file()
            && path
                .extension()
                .and_then(std::ffi::OsStr::to_str)
                .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
    })?;

    let mut headed = Vec::with_capacity(files.len());
    for file in files {
        let path = directory.join(&file);
        let content = fs::read_to_string(&path).map_err(|e| BookError::io(&path, e))?;
        let Some(heading) = format.first_heading(&content)? else {
            tracing::warn!(path = %path.display(), "no heading found, skipping file");
            continue;
        };
        if heading.depth > usize::from(Level::S4.get()) {
            tracing::warn!(
                path = %path.display(),
                depth = heading.depth,
                "heading deeper than S4, treating as S4"
            );
        }
        headed.push((format!("{folder}/{file}"), heading));
    }

    build_outline(headed).map_err(BookError::from)
}

/// Turns headed files in reading order into a linked outline.
///
/// # Errors
///
/// Returns [`OutlineError::InvalidStructure`] if the first file is not an S1, another S1
/// follows, or a heading skips a level relative to the section it would nest under.
pub fn build_outline(headed: Vec<(String, Heading)>) -> Result<Vec<Section>, OutlineError> {
    let mut sections: Vec<Section> = Vec::with_capacity(headed.len());
    let mut open: Vec<(Level, String)> = Vec::new();
    let mut child_counts: HashMap<Option<String>, u32> = HashMap::new();

    for (file_path, heading) in headed {
        let level = heading.level;
        let parent_id = if sections.is_empty() {
            if level != Level::S1 {
                return Err(OutlineError::InvalidStructure(format!(
                    "{file_path}: outline must start with an S1 title page, found {level}"
                )));
            }
            None
        } else {
            if level == Level::S1 {
                return Err(OutlineError::InvalidStructure(format!(
                    "{file_path}: only one S1 title page is allowed per container"
                )));
            }
            while open.last().is_some_and(|(open_level, _)| *open_level >= level) {
                open.pop();
            }
            let Some((parent_level, parent_id)) = open.last() else {
                return Err(OutlineError::InvalidStructure(format!(
                    "{file_path}: {level} has no enclosing section"
                )));
            };
            if parent_level.deeper() != Some(level) {
                return Err(OutlineError::InvalidStructure(format!(
                    "{file_path}: {level} cannot nest directly under {parent_level}"
                )));
            }
            Some(parent_id.clone())
        };

        let order = child_counts.entry(parent_id.clone()).or_insert(0);
        *order += 1;

        let id = generate_id();
        open.push((level, id.clone()));
        sections.push(Section {
            id,
            level,
            order: *order,
            parent_id,
            file_path,
        });
    }

    Ok(sections)
}

#[must_use]
/// Random section id in the `xxxx-xxxx-xxxx-xxxx` hex form.
pub fn generate_id() -> String {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    bytes[..8]
        .chunks(2)
        .map(|pair| format!("{:02x}{:02x}", pair[0], pair[1]))
        .collect::<Vec<_>>()
        .join("-")
}

fn sorted_entries(
    directory: &Path,
    keep: impl Fn(&Path) -> bool,
) -> Result<Vec<String>, BookError> {
    let entries = fs::read_dir(directory).map_err(|e| BookError::io(directory, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BookError::io(directory, e))?;
        let path = entry.path();
        if keep(&path) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
#[path = "tests/input.rs"]
mod tests;

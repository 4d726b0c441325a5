//! Derives on-disk names and heading prefixes from outline positions.
//!
//! File names carry the section's order as a two-digit prefix (`03-methods.md`) and the
//! first heading of each file carries the dotted path of orders from the title page down
//! (`## 1.3 Methods`). Both are recomputed from scratch whenever a section moves.

use crate::section::{Level, Section, SectionUpdate};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static ORDER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-").expect("valid order prefix pattern"));

static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#{1,4}\s+(?:\d+(?:\.\d+)*\s+)?(.+)$").expect("valid heading pattern")
});

#[must_use]
/// Replaces the two-digit order prefix of the file name in `current_path`.
///
/// The directory part and the rest of the file name are kept. A name without a prefix
/// gains one.
///
/// ```
/// use manuscript::numbering::calculate_file_path;
///
/// assert_eq!(
///     calculate_file_path("/book/01-chapter/03-section-b.md", 1),
///     "/book/01-chapter/01-section-b.md"
/// );
/// ```
pub fn calculate_file_path(current_path: &str, new_order: u32) -> String {
    let (directory, file_name) = match current_path.rfind('/') {
        Some(slash) => current_path.split_at(slash + 1),
        None => ("", current_path),
    };
    let slug = ORDER_PREFIX.replace(file_name, "");
    format!("{directory}{new_order:02}-{slug}")
}

#[must_use]
/// Dotted order path from the root of the outline down to the updated section.
///
/// Parents are looked up in `sections` by id; the walk stops at the first missing parent
/// (or if the parent chain loops back on itself).
pub fn calculate_heading_prefix(update: &SectionUpdate, sections: &[Section]) -> String {
    let mut parts = vec![update.order];
    let mut seen: HashSet<&str> = HashSet::from([update.id.as_str()]);
    let mut parent_id = update.parent_id.as_deref();

    while let Some(id) = parent_id {
        if !seen.insert(id) {
            break;
        }
        let Some(parent) = sections.iter().find(|s| s.id == id) else {
            break;
        };
        parts.push(parent.order);
        parent_id = parent.parent_id.as_deref();
    }

    parts
        .iter()
        .rev()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

#[must_use]
/// Rewrites the first heading line of `content` to the given level and prefix.
///
/// Any stale numeric prefix on the heading is dropped and the title text kept. Every other
/// line is left byte-for-byte intact. Returns `None` when `content` has no heading.
pub fn rewrite_heading(content: &str, level: Level, prefix: &str) -> Option<String> {
    let mut lines: Vec<&str> = content.split('\n').collect();
    let (index, title) = lines.iter().copied().enumerate().find_map(|(i, line)| {
        HEADING_LINE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|title| (i, title.as_str()))
    })?;

    let heading = format!("{} {prefix} {title}", level.marker());
    lines[index] = &heading;
    Some(lines.join("\n"))
}

#[must_use]
/// Order encoded in the two-digit prefix of a path's file name, if any.
pub fn file_order(path: &str) -> Option<u32> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    ORDER_PREFIX
        .find(file_name)
        .and_then(|prefix| prefix.as_str().trim_end_matches('-').parse().ok())
}

#[cfg(test)]
#[path = "tests/numbering.rs"]
mod tests;

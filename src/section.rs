//! Section representation for book outlines.
//!
//! A section is one node of a container's outline (chapter, introduction or appendix).
//! Sections never hold references to each other: the hierarchy is expressed through
//! `parent_id` and the position among siblings through `order`, so a flat `Vec<Section>`
//! is a complete snapshot that can be handed to the movement engine and persisted as-is.

use crate::error::OutlineError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
/// Outline depth from S1 (title page) to S4.
pub struct Level(u8);

impl Level {
    /// The title page level, reserved for the root of a container.
    pub const S1: Level = Level(1);
    /// Top-level headings below the title page.
    pub const S2: Level = Level(2);
    /// Sub-sections.
    pub const S3: Level = Level(3);
    /// Sub-sub-sections, the deepest level allowed.
    pub const S4: Level = Level(4);

    #[must_use]
    /// Returns the level for `depth`, or `None` outside `1..=4`.
    pub fn new(depth: u8) -> Option<Self> {
        (1..=4).contains(&depth).then_some(Self(depth))
    }

    #[must_use]
    /// Numeric depth, also the number of `#` in the section's heading.
    pub fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    /// One level deeper, `None` past S4.
    pub fn deeper(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    #[must_use]
    /// One level shallower, `None` past S1.
    pub fn shallower(self) -> Option<Self> {
        Self::new(self.0.saturating_sub(1))
    }

    #[must_use]
    /// Markdown heading marker for this level, e.g. `###` for S3.
    pub fn marker(self) -> String {
        "#".repeat(usize::from(self.0))
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(depth: u8) -> Result<Self, Self::Error> {
        Self::new(depth).ok_or_else(|| format!("section level must be 1-4, got {depth}"))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One node of a container outline.
pub struct Section {
    /// Stable identifier, the correlation key for updates.
    pub id: String,
    /// Nesting depth in the outline.
    pub level: Level,
    /// 1-based position among the sections sharing `parent_id`.
    pub order: u32,
    /// Containing section, absent only for the S1 title page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Markdown file backing this section, prefixed with the zero-padded order.
    pub file_path: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// New attributes for one section touched by a movement.
pub struct SectionUpdate {
    /// Section being updated.
    pub id: String,
    /// Level after the movement.
    pub level: Level,
    /// Order among the new siblings after the movement.
    pub order: u32,
    /// Parent after the movement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// File path recalculated from the new order.
    pub file_path: String,
}

impl SectionUpdate {
    #[must_use]
    /// Update that keeps every attribute of `section`.
    pub fn unchanged(section: &Section) -> Self {
        Self {
            id: section.id.clone(),
            level: section.level,
            order: section.order,
            parent_id: section.parent_id.clone(),
            file_path: section.file_path.clone(),
        }
    }

    /// Overwrite the mutable attributes of `section` with this update.
    pub fn apply_to(&self, section: &mut Section) {
        section.level = self.level;
        section.order = self.order;
        section.parent_id.clone_from(&self.parent_id);
        section.file_path.clone_from(&self.file_path);
    }
}

#[must_use]
/// Projects a snapshot through a batch of updates, matching them by id.
///
/// Updates for unknown ids are ignored; later updates for the same id win.
pub fn apply_updates(sections: &[Section], updates: &[SectionUpdate]) -> Vec<Section> {
    let mut projected = sections.to_vec();
    for update in updates {
        if let Some(section) = projected.iter_mut().find(|s| s.id == update.id) {
            update.apply_to(section);
        }
    }
    projected
}

/// Checks the structural invariants of one container's outline.
///
/// Verifies unique ids, a single parentless S1 at order 1, that every parent exists and
/// sits exactly one level up, and that each sibling group is ordered `1..=n` without gaps.
/// The one allowed skip is an S3 directly under the S1, which the first-S2 demotion
/// produces.
///
/// # Errors
///
/// Returns [`OutlineError::InvalidStructure`] describing the first violation found.
pub fn validate_sections(sections: &[Section]) -> Result<(), OutlineError> {
    let invalid = |message: String| Err(OutlineError::InvalidStructure(message));

    let mut by_id: HashMap<&str, &Section> = HashMap::new();
    for section in sections {
        if by_id.insert(section.id.as_str(), section).is_some() {
            return invalid(format!("duplicate section id {}", section.id));
        }
    }

    let roots: Vec<&Section> = sections.iter().filter(|s| s.level == Level::S1).collect();
    match roots.as_slice() {
        [] if sections.is_empty() => return Ok(()),
        [] => return invalid("outline has no S1 title page".to_string()),
        [root] => {
            if root.parent_id.is_some() {
                return invalid(format!("S1 {} must not have a parent", root.id));
            }
            if root.order != 1 {
                return invalid(format!("S1 {} must have order 1, has {}", root.id, root.order));
            }
        }
        _ => return invalid("outline has more than one S1 title page".to_string()),
    }

    let mut groups: HashMap<Option<&str>, Vec<u32>> = HashMap::new();
    for section in sections {
        if section.level != Level::S1 {
            let Some(parent_id) = section.parent_id.as_deref() else {
                return invalid(format!("{} {} has no parent", section.level, section.id));
            };
            let Some(parent) = by_id.get(parent_id) else {
                return invalid(format!(
                    "{} references missing parent {parent_id}",
                    section.id
                ));
            };
            let nests = parent.level.deeper() == Some(section.level)
                || (parent.level == Level::S1 && section.level == Level::S3);
            if !nests {
                return invalid(format!(
                    "{} {} sits under {} {}",
                    section.level, section.id, parent.level, parent.id
                ));
            }
        }
        groups
            .entry(section.parent_id.as_deref())
            .or_default()
            .push(section.order);
    }

    for (parent, mut orders) in groups {
        orders.sort_unstable();
        let contiguous = orders.iter().zip(1u32..).all(|(order, expected)| *order == expected);
        if !contiguous {
            return invalid(format!(
                "children of {} have non-contiguous orders {orders:?}",
                parent.unwrap_or("<root>")
            ));
        }
    }

    Ok(())
}

#[must_use]
/// Ids of every section below `id`, in breadth-first order.
pub fn descendants(id: &str, sections: &[Section]) -> Vec<String> {
    let mut found = Vec::new();
    let mut seen: HashSet<&str> = HashSet::from([id]);
    let mut frontier = vec![id];

    while let Some(current) = frontier.pop() {
        for child in sections
            .iter()
            .filter(|s| s.parent_id.as_deref() == Some(current))
        {
            if seen.insert(child.id.as_str()) {
                found.push(child.id.clone());
                frontier.insert(0, child.id.as_str());
            }
        }
    }

    found
}

#[cfg(test)]
#[path = "tests/section.rs"]
mod tests;

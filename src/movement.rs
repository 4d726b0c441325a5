//! The movement engine: pure structural edits on a container outline.
//!
//! Every operation takes an immutable snapshot of the container's sections and returns the
//! [`SectionUpdate`]s needed to carry out the move, or an [`OutlineError`] if the move is
//! illegal. Nothing is mutated and nothing touches the disk; callers apply the updates to
//! the files (see [`crate::edit_plan`]) and then to their in-memory tree.
//!
//! Legality depends only on the target's level, its position among its siblings and whether
//! a previous sibling or parent exists:
//!
//! ```text
//!               has previous sibling        first among siblings
//! order_plus    swap with previous          promote (never to S1)
//! order_minus   swap with next (if any)     demote under previous sibling
//! level_plus    promote after parent        promote after parent
//! level_minus   demote under previous       S2 only: S3 under own parent
//! ```
//!
//! The S1 title page never moves.

use crate::error::OutlineError;
use crate::numbering::calculate_file_path;
use crate::section::{descendants, Level, Section, SectionUpdate};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A user-facing outline command.
pub enum Movement {
    /// Smart move up, see [`order_plus`].
    Up,
    /// Smart move down, see [`order_minus`].
    Down,
    /// Promote one level, see [`level_plus`].
    Promote,
    /// Demote one level, see [`level_minus`].
    Demote,
}

impl Movement {
    /// Computes the updates for this movement of `section_id`.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operation.
    pub fn compute(
        self,
        section_id: &str,
        sections: &[Section],
    ) -> Result<Vec<SectionUpdate>, OutlineError> {
        match self {
            Self::Up => order_plus(section_id, sections),
            Self::Down => order_minus(section_id, sections),
            Self::Promote => level_plus(section_id, sections),
            Self::Demote => level_minus(section_id, sections),
        }
    }
}

impl FromStr for Movement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "promote" => Ok(Self::Promote),
            "demote" => Ok(Self::Demote),
            other => Err(format!(
                "unknown movement {other:?}, expected up, down, promote or demote"
            )),
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Promote => "promote",
            Self::Demote => "demote",
        })
    }
}

/// Smart move up: swaps with the previous sibling, or promotes when already first.
///
/// # Errors
///
/// - [`OutlineError::SectionNotFound`] if `section_id` is not in `sections`.
/// - [`OutlineError::InvalidOperation`] for the S1 title page, when the previous sibling is
///   an S1, or when promotion is impossible (see [`level_plus`]).
pub fn order_plus(
    section_id: &str,
    sections: &[Section],
) -> Result<Vec<SectionUpdate>, OutlineError> {
    let section = find(section_id, sections)?;
    if section.level == Level::S1 {
        return Err(invalid("S1 (title page) cannot be moved"));
    }

    let siblings = siblings(section, sections);
    let index = position(section, &siblings)?;

    if index > 0 {
        let previous = siblings[index - 1];
        if previous.level == Level::S1 {
            return Err(invalid("cannot move above S1 (title page)"));
        }
        return Ok(swap(section, previous));
    }

    promote(section, sections)
}

/// Smart move down: swaps with the next sibling, or demotes when already last.
///
/// # Errors
///
/// - [`OutlineError::SectionNotFound`] if `section_id` is not in `sections`.
/// - [`OutlineError::InvalidOperation`] for the S1 title page or when demotion is
///   impossible (see [`level_minus`]).
pub fn order_minus(
    section_id: &str,
    sections: &[Section],
) -> Result<Vec<SectionUpdate>, OutlineError> {
    let section = find(section_id, sections)?;
    if section.level == Level::S1 {
        return Err(invalid("S1 (title page) cannot be moved"));
    }

    let siblings = siblings(section, sections);
    let index = position(section, &siblings)?;

    if let Some(next) = siblings.get(index + 1) {
        return Ok(swap(section, next));
    }

    demote(section, sections)
}

/// Promotes a section one level, placing it right after its former parent.
///
/// Later children of the grandparent shift down by one to make room, the former siblings
/// after the section close the gap it leaves, and its descendants move up a level with it.
///
/// # Errors
///
/// - [`OutlineError::SectionNotFound`] if `section_id` is not in `sections`.
/// - [`OutlineError::InvalidOperation`] for S1 and S2 (only the title page may be S1), or
///   when the section has no parent or grandparent to promote into.
pub fn level_plus(
    section_id: &str,
    sections: &[Section],
) -> Result<Vec<SectionUpdate>, OutlineError> {
    let section = find(section_id, sections)?;
    match section.level {
        Level::S1 => Err(invalid("S1 is already at top level")),
        Level::S2 => Err(invalid("cannot promote S2 to S1 - S1 must be title page")),
        _ => promote(section, sections),
    }
}

/// Demotes a section one level, appending it to the children of its previous sibling.
///
/// The first S2 of a container has no previous sibling and instead becomes the first S3
/// directly under the title page.
///
/// # Errors
///
/// - [`OutlineError::SectionNotFound`] if `section_id` is not in `sections`.
/// - [`OutlineError::InvalidOperation`] for S1 and S4, when there is no previous sibling to
///   adopt the section, or when a descendant would end up deeper than S4.
pub fn level_minus(
    section_id: &str,
    sections: &[Section],
) -> Result<Vec<SectionUpdate>, OutlineError> {
    let section = find(section_id, sections)?;
    if section.level == Level::S1 {
        return Err(invalid("S1 cannot be demoted"));
    }
    demote(section, sections)
}

fn invalid(message: &str) -> OutlineError {
    OutlineError::InvalidOperation(message.to_string())
}

fn find<'a>(section_id: &str, sections: &'a [Section]) -> Result<&'a Section, OutlineError> {
    sections
        .iter()
        .find(|s| s.id == section_id)
        .ok_or_else(|| OutlineError::SectionNotFound(section_id.to_string()))
}

fn parent<'a>(section: &Section, sections: &'a [Section]) -> Option<&'a Section> {
    let parent_id = section.parent_id.as_deref()?;
    sections.iter().find(|s| s.id == parent_id)
}

/// Sections sharing `section`'s parent (itself included), sorted by order.
fn siblings<'a>(section: &Section, sections: &'a [Section]) -> Vec<&'a Section> {
    let mut siblings: Vec<&Section> = sections
        .iter()
        .filter(|s| s.parent_id == section.parent_id)
        .collect();
    siblings.sort_by_key(|s| s.order);
    siblings
}

fn position(section: &Section, siblings: &[&Section]) -> Result<usize, OutlineError> {
    siblings
        .iter()
        .position(|s| s.id == section.id)
        .ok_or_else(|| OutlineError::SectionNotFound(section.id.clone()))
}

fn moved(section: &Section, level: Level, order: u32, parent_id: Option<String>) -> SectionUpdate {
    SectionUpdate {
        id: section.id.clone(),
        level,
        order,
        parent_id,
        file_path: calculate_file_path(&section.file_path, order),
    }
}

fn renumbered(section: &Section, order: u32) -> SectionUpdate {
    moved(section, section.level, order, section.parent_id.clone())
}

fn swap(section: &Section, other: &Section) -> Vec<SectionUpdate> {
    vec![
        renumbered(section, other.order),
        renumbered(other, section.order),
    ]
}

/// Former siblings after `section` move up one place to fill the hole it leaves.
fn close_gap(section: &Section, sections: &[Section]) -> Vec<SectionUpdate> {
    siblings(section, sections)
        .into_iter()
        .filter(|s| s.id != section.id && s.order > section.order)
        .map(|s| renumbered(s, s.order - 1))
        .collect()
}

/// Descendants keep their place under `section` but follow its level change.
fn shift_descendants(
    section: &Section,
    new_level: Level,
    sections: &[Section],
) -> Result<Vec<SectionUpdate>, OutlineError> {
    let delta = i16::from(new_level.get()) - i16::from(section.level.get());
    descendants(&section.id, sections)
        .iter()
        .filter_map(|id| sections.iter().find(|s| &s.id == id))
        .map(|descendant| -> Result<SectionUpdate, OutlineError> {
            let depth = i16::from(descendant.level.get()) + delta;
            let level = u8::try_from(depth)
                .ok()
                .and_then(Level::new)
                .ok_or_else(|| {
                    OutlineError::InvalidOperation(format!(
                        "moving {} would push {} past S4",
                        section.id, descendant.id
                    ))
                })?;
            let mut update = SectionUpdate::unchanged(descendant);
            update.level = level;
            Ok(update)
        })
        .collect()
}

fn promote(section: &Section, sections: &[Section]) -> Result<Vec<SectionUpdate>, OutlineError> {
    let former_parent =
        parent(section, sections).ok_or_else(|| invalid("cannot promote - no parent found"))?;

    let new_level = section
        .level
        .shallower()
        .filter(|level| *level != Level::S1)
        .ok_or_else(|| invalid("cannot promote to S1 - S1 must be title page"))?;

    let grandparent = parent(former_parent, sections)
        .ok_or_else(|| invalid("cannot promote - parent has no parent to promote into"))?;

    let new_order = former_parent.order + 1;
    let mut updates = vec![moved(
        section,
        new_level,
        new_order,
        Some(grandparent.id.clone()),
    )];

    updates.extend(
        siblings(former_parent, sections)
            .into_iter()
            .filter(|s| s.order >= new_order && s.id != section.id)
            .map(|s| renumbered(s, s.order + 1)),
    );
    updates.extend(close_gap(section, sections));
    updates.extend(shift_descendants(section, new_level, sections)?);

    tracing::debug!(
        section = %section.id,
        level = %new_level,
        order = new_order,
        updates = updates.len(),
        "promoted section"
    );
    Ok(updates)
}

fn demote(section: &Section, sections: &[Section]) -> Result<Vec<SectionUpdate>, OutlineError> {
    let new_level = section
        .level
        .deeper()
        .ok_or_else(|| invalid("S4 is already at maximum depth"))?;

    let siblings = siblings(section, sections);
    let index = position(section, &siblings)?;

    if index == 0 {
        if section.level != Level::S2 {
            return Err(invalid(
                "cannot demote - no previous sibling to become parent",
            ));
        }
        let parent =
            parent(section, sections).ok_or_else(|| invalid("cannot demote - no parent found"))?;

        let mut updates = vec![moved(section, new_level, 1, Some(parent.id.clone()))];
        updates.extend(shift_descendants(section, new_level, sections)?);
        return Ok(updates);
    }

    let new_parent = siblings[index - 1];
    if new_parent.level.deeper() != Some(new_level) {
        return Err(OutlineError::InvalidOperation(format!(
            "cannot demote under {} {}",
            new_parent.level, new_parent.id
        )));
    }

    let new_order = sections
        .iter()
        .filter(|s| s.parent_id.as_deref() == Some(new_parent.id.as_str()))
        .map(|s| s.order)
        .max()
        .map_or(1, |last| last + 1);

    let mut updates = vec![moved(
        section,
        new_level,
        new_order,
        Some(new_parent.id.clone()),
    )];
    updates.extend(close_gap(section, sections));
    updates.extend(shift_descendants(section, new_level, sections)?);

    tracing::debug!(
        section = %section.id,
        parent = %new_parent.id,
        level = %new_level,
        order = new_order,
        updates = updates.len(),
        "demoted section"
    );
    Ok(updates)
}

#[cfg(test)]
#[path = "tests/movement.rs"]
mod tests;

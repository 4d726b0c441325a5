//! Book structure: containers of section outlines.
//!
//! A book is an optional introduction, a list of chapters and a list of appendices. Each of
//! them is a [`Container`] holding one independent outline whose root is an S1 title page.
//! This is the shape persisted in `book-structure.json`.

use crate::section::Section;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// The full manuscript structure.
pub struct Book {
    /// Front matter before the first chapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduction: Option<Container>,
    /// Chapters in reading order.
    #[serde(default)]
    pub chapters: Vec<Container>,
    /// Back matter after the last chapter.
    #[serde(default)]
    pub appendices: Vec<Container>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One folder of the manuscript and the outline of its files.
pub struct Container {
    /// Stable identifier of the container.
    pub id: String,
    /// Flat outline; hierarchy is carried by each section's parent id.
    pub sections: Vec<Section>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Role of a container within the book.
pub enum ContainerKind {
    /// The introduction folder.
    Introduction,
    /// A numbered chapter folder.
    Chapter,
    /// An appendix folder.
    Appendix,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Introduction => "Introduction",
            Self::Chapter => "Chapter",
            Self::Appendix => "Appendix",
        })
    }
}

impl Book {
    /// Every container with its role, in reading order.
    pub fn containers(&self) -> impl Iterator<Item = (ContainerKind, &Container)> {
        self.introduction
            .iter()
            .map(|c| (ContainerKind::Introduction, c))
            .chain(self.chapters.iter().map(|c| (ContainerKind::Chapter, c)))
            .chain(self.appendices.iter().map(|c| (ContainerKind::Appendix, c)))
    }

    #[must_use]
    /// Looks up a container by id.
    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers()
            .map(|(_, container)| container)
            .find(|container| container.id == id)
    }

    /// Looks up a container by id for modification.
    pub fn container_mut(&mut self, id: &str) -> Option<&mut Container> {
        self.introduction
            .iter_mut()
            .chain(self.chapters.iter_mut())
            .chain(self.appendices.iter_mut())
            .find(|container| container.id == id)
    }

    #[must_use]
    /// The container whose outline holds `section_id`.
    pub fn container_of(&self, section_id: &str) -> Option<&Container> {
        self.containers()
            .map(|(_, container)| container)
            .find(|container| container.sections.iter().any(|s| s.id == section_id))
    }

    #[must_use]
    /// Total number of sections across all containers.
    pub fn section_count(&self) -> usize {
        self.containers().map(|(_, c)| c.sections.len()).sum()
    }
}

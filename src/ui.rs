//! Plain-text rendering of container outlines for the terminal.

use crate::book::{Book, Container};
use crate::section::Section;

fn get_tree_prefix(depth: usize, is_last: bool, parent_states: &[bool]) -> String {
    if depth == 0 {
        return String::new();
    }

    let mut prefix = String::new();

    // Vertical lines for ancestors that still have siblings below
    for i in 0..depth.saturating_sub(1) {
        if parent_states.get(i).copied().unwrap_or(false) {
            prefix.push_str("│   ");
        } else {
            prefix.push_str("    ");
        }
    }

    if is_last {
        prefix.push_str("└── ");
    } else {
        prefix.push_str("├── ");
    }

    prefix
}

/// Title shown for a section: its file name without the order prefix or extension.
fn display_title(section: &Section) -> &str {
    let file_name = section
        .file_path
        .rsplit('/')
        .next()
        .unwrap_or(&section.file_path);
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);
    match stem.split_once('-') {
        Some((order, rest)) if order.len() == 2 && order.bytes().all(|b| b.is_ascii_digit()) => {
            rest
        }
        _ => stem,
    }
}

fn children<'a>(parent_id: Option<&str>, sections: &'a [Section]) -> Vec<&'a Section> {
    let mut children: Vec<&Section> = sections
        .iter()
        .filter(|s| s.parent_id.as_deref() == parent_id)
        .collect();
    children.sort_by_key(|s| s.order);
    children
}

fn render_subtree(
    out: &mut String,
    section: &Section,
    sections: &[Section],
    depth: usize,
    is_last: bool,
    parent_states: &mut Vec<bool>,
) {
    let prefix = get_tree_prefix(depth, is_last, parent_states);
    out.push_str(&format!(
        "{prefix}{} {:02} {}  [{}]\n",
        section.level,
        section.order,
        display_title(section),
        section.id
    ));

    if depth > 0 {
        parent_states.push(!is_last);
    }
    let kids = children(Some(&section.id), sections);
    for (i, child) in kids.iter().enumerate() {
        render_subtree(
            out,
            child,
            sections,
            depth + 1,
            i + 1 == kids.len(),
            parent_states,
        );
    }
    if depth > 0 {
        parent_states.pop();
    }
}

#[must_use]
/// Renders one container's outline as a box-drawn tree, one section per line.
///
/// Each line shows the level, the order, the title taken from the file name and the
/// section id.
pub fn render_outline(container: &Container) -> String {
    let mut out = String::new();
    let mut parent_states = Vec::new();
    for root in children(None, &container.sections) {
        render_subtree(
            &mut out,
            root,
            &container.sections,
            0,
            true,
            &mut parent_states,
        );
    }
    out
}

#[must_use]
/// Renders every container of the book under a header naming its role.
pub fn render_book(book: &Book) -> String {
    let mut out = String::new();
    for (kind, container) in book.containers() {
        out.push_str(&format!("{kind} [{}]\n", container.id));
        out.push_str(&render_outline(container));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{get_tree_prefix, render_book, render_outline};
    use crate::book::{Book, Container};
    use crate::section::{Level, Section};

    fn section(id: &str, level: Level, order: u32, parent: Option<&str>, path: &str) -> Section {
        Section {
            id: id.to_string(),
            level,
            order,
            parent_id: parent.map(str::to_string),
            file_path: path.to_string(),
        }
    }

    #[test]
    fn test_tree_prefix() {
        assert_eq!(get_tree_prefix(0, true, &[]), "");
        assert_eq!(get_tree_prefix(1, false, &[]), "├── ");
        assert_eq!(get_tree_prefix(2, true, &[true]), "│   └── ");
        assert_eq!(get_tree_prefix(2, true, &[false]), "    └── ");
    }

    #[test]
    fn test_render_outline() {
        let container = Container {
            id: "c1".to_string(),
            sections: vec![
                section("s1", Level::S1, 1, None, "ch/01-title.md"),
                section("b", Level::S2, 2, Some("s1"), "ch/02-beta.md"),
                section("a", Level::S2, 1, Some("s1"), "ch/01-alpha.md"),
                section("a1", Level::S3, 1, Some("a"), "ch/01-alpha-detail.md"),
            ],
        };

        let rendered = render_outline(&container);

        assert_eq!(
            rendered,
            "S1 01 title  [s1]\n\
             ├── S2 01 alpha  [a]\n\
             │   └── S3 01 alpha-detail  [a1]\n\
             └── S2 02 beta  [b]\n"
        );
    }

    #[test]
    fn test_render_book_headers() {
        let book = Book {
            introduction: None,
            chapters: vec![Container {
                id: "c1".to_string(),
                sections: vec![section("s1", Level::S1, 1, None, "ch/01-title.md")],
            }],
            appendices: vec![Container {
                id: "x1".to_string(),
                sections: vec![section("t1", Level::S1, 1, None, "ax/01-extra.md")],
            }],
        };

        assert_eq!(
            render_book(&book),
            "Chapter [c1]\nS1 01 title  [s1]\n\nAppendix [x1]\nS1 01 extra  [t1]\n\n"
        );
    }
}

use super::{build_outline, classify, generate_id, parse_book};
use crate::book::ContainerKind;
use crate::error::{BookError, OutlineError};
use crate::formats::markdown::MarkdownFormat;
use crate::formats::{Format, Heading};
use crate::section::{validate_sections, Level};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn headed(path: &str, level: Level) -> (String, Heading) {
    (
        path.to_string(),
        Heading {
            level,
            text: path.to_string(),
            depth: usize::from(level.get()),
        },
    )
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn md() -> Vec<String> {
    vec!["md".to_string()]
}

#[test]
fn test_classify_folders() {
    assert_eq!(classify("Introduction"), Some(ContainerKind::Introduction));
    assert_eq!(classify("01 Getting Started"), Some(ContainerKind::Chapter));
    assert_eq!(classify("12-methods"), Some(ContainerKind::Chapter));
    assert_eq!(classify("Appendix A"), Some(ContainerKind::Appendix));
    assert_eq!(classify("A Glossary"), Some(ContainerKind::Appendix));
    assert_eq!(classify("Part 1"), None);
    assert_eq!(classify("P 2 Background"), None);
    assert_eq!(classify("assets"), None);
    assert_eq!(classify("Appendices"), None);
}

#[test]
fn test_build_outline_links_parents() {
    let sections = build_outline(vec![
        headed("ch/01-title.md", Level::S1),
        headed("ch/02-a.md", Level::S2),
        headed("ch/03-a1.md", Level::S3),
        headed("ch/04-a1x.md", Level::S4),
        headed("ch/05-a2.md", Level::S3),
        headed("ch/06-b.md", Level::S2),
    ])
    .unwrap();

    let parent_of = |i: usize| {
        sections[i]
            .parent_id
            .as_ref()
            .map(|id| sections.iter().position(|s| &s.id == id).unwrap())
    };
    assert_eq!(
        (0..sections.len()).map(parent_of).collect::<Vec<_>>(),
        vec![None, Some(0), Some(1), Some(2), Some(1), Some(0)]
    );
    assert_eq!(
        sections.iter().map(|s| s.order).collect::<Vec<_>>(),
        vec![1, 1, 1, 1, 2, 2]
    );
    assert_eq!(validate_sections(&sections), Ok(()));
}

#[test]
fn test_build_outline_rejects_bad_sequences() {
    let cases = [
        vec![headed("a.md", Level::S2)],
        vec![headed("a.md", Level::S1), headed("b.md", Level::S1)],
        vec![headed("a.md", Level::S1), headed("b.md", Level::S3)],
    ];
    for case in cases {
        assert!(matches!(
            build_outline(case),
            Err(OutlineError::InvalidStructure(_))
        ));
    }
}

#[test]
fn test_generated_ids_are_unique_and_shaped() {
    let first = generate_id();
    let second = generate_id();

    assert_ne!(first, second);
    assert_eq!(first.len(), 19);
    assert_eq!(first.split('-').count(), 4);
    assert!(first
        .chars()
        .all(|c| c == '-' || c.is_ascii_hexdigit()));
}

#[test]
fn test_first_heading_skips_code_blocks() {
    let source = "Intro text.\n\n```\n# not a heading\n```\n\n### 1.2.1 Real Title ###\n\n# Later\n";

    let heading = MarkdownFormat.first_heading(source).unwrap().unwrap();

    assert_eq!(heading.level, Level::S3);
    assert_eq!(heading.text, "1.2.1 Real Title");
}

#[test]
fn test_first_heading_clamps_depth() {
    let heading = MarkdownFormat.first_heading("###### Deep\n").unwrap().unwrap();

    assert_eq!(heading.level, Level::S4);
    assert_eq!(heading.depth, 6);
    assert_eq!(MarkdownFormat.first_heading("no heading\n").unwrap(), None);
}

#[test]
fn test_parse_book() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "Introduction/01-intro.md", "# Introduction\n");
    write(root, "01 First/01-title.md", "# 1 First\n");
    write(root, "01 First/02-setup.md", "## 1.1 Setup\n");
    write(root, "01 First/03-details.md", "### 1.1.1 Details\n");
    write(root, "01 First/04-next.md", "## 1.2 Next\n");
    write(root, "01 First/notes.txt", "# ignored, wrong extension\n");
    write(root, "01 First/05-draft.md", "no heading yet\n");
    write(root, "02 Second/01-title.md", "# 2 Second\n");
    write(root, "Appendix A/01-title.md", "# A Extra\n");
    write(root, "Part 1/01-title.md", "# Part One\n");
    write(root, "assets/01-title.md", "# Not a container\n");

    let book = parse_book(root, &md()).unwrap();

    assert!(book.introduction.is_some());
    assert_eq!(book.chapters.len(), 2);
    assert_eq!(book.appendices.len(), 1);
    assert_eq!(book.section_count(), 7);

    let first = &book.chapters[0].sections;
    assert_eq!(
        first.iter().map(|s| s.file_path.as_str()).collect::<Vec<_>>(),
        vec![
            "01 First/01-title.md",
            "01 First/02-setup.md",
            "01 First/03-details.md",
            "01 First/04-next.md",
        ]
    );
    assert_eq!(
        first.iter().map(|s| s.level).collect::<Vec<_>>(),
        vec![Level::S1, Level::S2, Level::S3, Level::S2]
    );
    for (_, container) in book.containers() {
        assert_eq!(validate_sections(&container.sections), Ok(()));
    }
}

#[test]
fn test_parse_book_invalid_container() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "01 Broken/01-a.md", "## Starts too deep\n");

    let result = parse_book(dir.path(), &md());

    assert!(matches!(
        result,
        Err(BookError::Outline(OutlineError::InvalidStructure(_)))
    ));
}

#[test]
fn test_parse_book_missing_root() {
    let dir = TempDir::new().unwrap();
    let result = parse_book(&dir.path().join("nowhere"), &md());

    assert!(matches!(result, Err(BookError::Io { .. })));
}

//! manuscript: outline movements for markdown book manuscripts.
//!
//! A book is a folder of containers (introduction, chapters, appendices), each a folder of
//! markdown files whose first heading places them in an S1..S4 outline. Moving a section
//! recomputes the orders, levels and parents of the sections it affects, renames their
//! files to match the new order and rewrites their numbered headings.
//!
//! The [`movement`] functions are pure and return [`section::SectionUpdate`]s, which
//! [`edit_plan::EditPlan`] writes to disk and [`book_store::BookStore`] applies to the
//! persisted structure.
#![allow(clippy::multiple_crate_versions)]

pub mod book;
pub mod book_store;
pub mod config;
pub mod edit_plan;
pub mod error;
pub mod formats;
pub mod input;
pub mod movement;
pub mod numbering;
pub mod section;
pub mod ui;

pub use edit_plan::{apply_file_system_changes, validate_files_exist};
pub use movement::{level_minus, level_plus, order_minus, order_plus};

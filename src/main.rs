//! manuscript: reorganise a markdown book from the command line.
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use manuscript::book_store::{BookStorage, BookStore};
use manuscript::config::Config;
use manuscript::error::BookError;
use manuscript::movement::Movement;
use manuscript::section::validate_sections;
use manuscript::{input, numbering, ui};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "manuscript")]
#[command(about = "Move sections around a markdown book outline", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// File extensions to match (overrides manuscript.toml)
    #[arg(long, short = 'e', value_name = "EXT", global = true)]
    ext: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Parse the book folders and write the structure file
    Scan {
        /// Book root folder
        root: PathBuf,
        /// Overwrite an existing structure file
        #[arg(long)]
        force: bool,
    },
    /// Print the outline of every container
    Show {
        /// Book root folder
        root: PathBuf,
    },
    /// Validate the outline and report numbering mismatches
    Check {
        /// Book root folder
        root: PathBuf,
    },
    /// Move a section and rewrite the affected files
    Move {
        /// Book root folder
        root: PathBuf,
        /// Id of the section to move
        section_id: String,
        /// One of up, down, promote, demote
        movement: Movement,
        /// Print the updates and edit plan without touching any file
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode, BookError> {
    match args.command {
        Command::Scan { root, force } => {
            let cfg = load_config(&root, args.ext);
            let storage = BookStorage::with_file_name(&root, &cfg.structure_file);
            let book = input::parse_book(&root, &cfg.file_extensions)?;
            if force {
                storage.delete()?;
            }
            let book = storage.create_new(book)?;
            println!(
                "Wrote {} ({} sections)",
                storage.path().display(),
                book.section_count()
            );
        }
        Command::Show { root } => {
            let store = open_store(&root, args.ext)?;
            print!("{}", ui::render_book(store.book()));
        }
        Command::Check { root } => {
            let cfg = load_config(&root, args.ext);
            let storage = BookStorage::with_file_name(&root, &cfg.structure_file);
            let book = storage
                .load()?
                .ok_or_else(|| BookError::NotFound(root.clone()))?;
            return Ok(check(&book));
        }
        Command::Move {
            root,
            section_id,
            movement,
            dry_run,
        } => {
            let mut store = open_store(&root, args.ext)?;
            if dry_run {
                let planned = store.plan_move(&section_id, movement)?;
                let report = serde_json::json!({ "updates": planned.updates, "plan": planned.plan });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let updates = store.move_section(&section_id, movement)?;
                store.save()?;
                println!("Moved {section_id} {movement} ({} sections updated)", updates.len());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn load_config(root: &Path, ext: Vec<String>) -> Config {
    let mut cfg = Config::load(root);
    // Override config with command line args
    if !ext.is_empty() {
        cfg.file_extensions = ext;
    }
    cfg
}

fn open_store(root: &Path, ext: Vec<String>) -> Result<BookStore, BookError> {
    let cfg = load_config(root, ext);
    BookStore::open(BookStorage::with_file_name(root, cfg.structure_file))
}

fn check(book: &manuscript::book::Book) -> ExitCode {
    let mut valid = true;
    for (kind, container) in book.containers() {
        if let Err(e) = validate_sections(&container.sections) {
            println!("{kind} {}: {e}", container.id);
            valid = false;
        }
        for section in &container.sections {
            match numbering::file_order(&section.file_path) {
                Some(order) if order == section.order => {}
                Some(order) => println!(
                    "warning: {} has order {} but file prefix {order:02}",
                    section.file_path, section.order
                ),
                None => println!("warning: {} has no order prefix", section.file_path),
            }
        }
    }
    if valid {
        println!("{} sections OK", book.section_count());
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

//! Configuration to acknowledge author preferences as well as set defaults.
//!
//! We look for a `manuscript.toml` in the book root, then in the working directory, and load
//! settings from the first one found. This provides the structure file name and the file
//! extensions that count as manuscript files.

use facet::Facet;
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up in the book root.
pub const CONFIG_FILE: &str = "manuscript.toml";

#[derive(Facet, Clone, Debug)]
/// User preferences loaded from manuscript.toml or falling back to defaults.
pub struct Config {
    #[facet(default = "book-structure.json".to_string())]
    /// File in the book root holding the persisted outline.
    pub structure_file: String,
    #[facet(default = vec!["md".to_string()])]
    /// File suffixes to treat as manuscript files when scanning folders.
    pub file_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            structure_file: "book-structure.json".to_string(),
            file_extensions: vec!["md".to_string()],
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration for the book at `root`.
    ///
    /// An unreadable or invalid file is reported and skipped.
    pub fn load(root: &Path) -> Self {
        for candidate in [root.join(CONFIG_FILE), Path::new(CONFIG_FILE).to_path_buf()] {
            let Ok(contents) = fs::read_to_string(&candidate) else {
                continue;
            };
            match Self::parse(&contents) {
                Some(config) => {
                    tracing::debug!(path = %candidate.display(), "loaded configuration");
                    return config;
                }
                None => {
                    tracing::warn!(path = %candidate.display(), "ignoring invalid configuration");
                }
            }
        }
        Self::default()
    }

    #[must_use]
    /// Parse configuration from TOML text, filling in defaults for missing keys.
    pub fn parse(contents: &str) -> Option<Self> {
        facet_toml::from_str::<Self>(contents).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path());

        assert_eq!(config.structure_file, "book-structure.json");
        assert_eq!(config.file_extensions, vec!["md".to_string()]);
    }

    #[test]
    fn test_book_root_file_is_used() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("manuscript.toml"),
            "structure_file = \"outline.json\"\nfile_extensions = [\"md\", \"markdown\"]\n",
        )
        .unwrap();

        let config = Config::load(dir.path());

        assert_eq!(config.structure_file, "outline.json");
        assert_eq!(config.file_extensions, vec!["md", "markdown"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("structure_file = \"outline.json\"\n").unwrap();

        assert_eq!(config.structure_file, "outline.json");
        assert_eq!(config.file_extensions, vec!["md".to_string()]);
    }
}

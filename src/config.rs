//! Optional `txn-delete.toml` configuration.
//!
//! ```toml
//! backup-dir = ".bkp"
//! exclude = ["^keep$", "\\.lock$"]
//! confirm = true
//! ```
//!
//! Command-line flags override file values.

use crate::error::{DeleteError, Result};
use crate::fs::DEFAULT_BACKUP_DIR;

use std::fs;
use std::path::Path;
use toml_edit::{DocumentMut, Item};

/// File looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "txn-delete.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name of the backup root created next to each target.
    pub backup_dir: String,
    /// File-name regexes of entries that are never deleted.
    pub exclude: Vec<String>,
    /// Ask before deleting.
    pub confirm: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_dir: DEFAULT_BACKUP_DIR.to_string(),
            exclude: Vec::new(),
            confirm: true,
        }
    }
}

impl Config {
    /// Loads `explicit` if given (it must exist), else `<cwd>/txn-delete.toml`
    /// if present, else defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = cwd.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, cwd.display());
                    return Ok(Self::default());
                }
                candidate
            }
        };

        log::debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(&path).map_err(|e| {
            DeleteError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {}: {}", path.display(), e),
            ))
        })?;

        Self::parse(&content)
    }

    /// Parses config file content.
    pub fn parse(content: &str) -> Result<Self> {
        let doc = content.parse::<DocumentMut>()?;
        let mut config = Self::default();

        for (key, item) in doc.as_table().iter() {
            match key {
                "backup-dir" => {
                    config.backup_dir = item
                        .as_str()
                        .ok_or_else(|| type_error(key, "a string"))?
                        .to_string();
                }
                "exclude" => {
                    config.exclude = string_array(key, item)?;
                }
                "confirm" => {
                    config.confirm = item
                        .as_bool()
                        .ok_or_else(|| type_error(key, "a boolean"))?;
                }
                other => log::warn!("Ignoring unknown config key '{}'", other),
            }
        }

        Ok(config)
    }
}

fn string_array(key: &str, item: &Item) -> Result<Vec<String>> {
    let array = item
        .as_array()
        .ok_or_else(|| type_error(key, "an array of strings"))?;

    array
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| type_error(key, "an array of strings"))
        })
        .collect()
}

fn type_error(key: &str, expected: &str) -> DeleteError {
    DeleteError::Config(format!("'{}' must be {}", key, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
backup-dir = ".trash"
exclude = ["^keep$", "\\.lock$"]
confirm = false
"#,
        )
        .unwrap();

        assert_eq!(config.backup_dir, ".trash");
        assert_eq!(config.exclude, vec!["^keep$", r"\.lock$"]);
        assert!(!config.confirm);
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = Config::parse("colour = \"always\"\nconfirm = false\n").unwrap();
        assert!(!config.confirm);
        assert_eq!(config.backup_dir, DEFAULT_BACKUP_DIR);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let result = Config::parse("backup-dir = 3\n");
        assert!(matches!(result, Err(DeleteError::Config(_))));

        let result = Config::parse("exclude = [\"a\", 1]\n");
        assert!(matches!(result, Err(DeleteError::Config(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::parse("exclude = [");
        assert!(matches!(result, Err(DeleteError::Toml(_))));
    }

    #[test]
    fn test_load_discovers_file_in_cwd() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "backup-dir = \".old\"\n").unwrap();

        let config = Config::load(None, temp.path()).unwrap();
        assert_eq!(config.backup_dir, ".old");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        assert_eq!(Config::load(None, temp.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("nope.toml")), temp.path());
        assert!(matches!(result, Err(DeleteError::Io(_))));
    }
}

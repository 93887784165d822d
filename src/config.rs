//! CLI configuration: flags override a config file, which overrides
//! built-in defaults.
//!
//! Grounded on the teacher's `FileConfig`/`load_file_config` pattern:
//! an optional `~/.config/echomine/config.toml`, read with `dirs` +
//! `toml`, merged with CLI flags via `Option::or`.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{eyre, Context, Result};
use serde::Deserialize;

use crate::model::SortBy;

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub default_limit: Option<u32>,
    pub default_sort_by: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Load the config file at `explicit_path`, or the platform config dir's
/// `echomine/config.toml` if present, or defaults if neither exists.
pub fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        dirs::config_dir()
            .map(|d| d.join("echomine/config.toml"))
            .filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

/// Parse a config-file `default_sort_by` string into [`SortBy`]. Unknown
/// values fall back to `None` (the CLI default then applies).
pub fn parse_sort_by(raw: &str) -> Option<SortBy> {
    match raw {
        "score" => Some(SortBy::Score),
        "date" => Some(SortBy::Date),
        "title" => Some(SortBy::Title),
        "messages" => Some(SortBy::Messages),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub default_limit: u32,
    pub default_sort_by: SortBy,
    pub tags: Vec<String>,
}

impl ResolvedConfig {
    pub fn merge(file: FileConfig) -> Self {
        Self {
            default_limit: file.default_limit.unwrap_or(crate::model::query::DEFAULT_LIMIT),
            default_sort_by: file
                .default_sort_by
                .as_deref()
                .and_then(parse_sort_by)
                .unwrap_or_default(),
            tags: file.tags.unwrap_or_default(),
        }
    }
}

pub fn default_export_path() -> Option<PathBuf> {
    dirs::data_dir()
}

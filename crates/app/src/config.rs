//! Runtime configuration: database location and topic catalog.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use study_core::model::{CatalogEntry, TopicCatalog};

pub const DEFAULT_DB_URL: &str = "sqlite://study.sqlite3";

/// On-disk catalog file.
///
/// ```toml
/// [[topics]]
/// id = "negation"
/// label = "La négation"
/// ```
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    topics: Vec<CatalogEntry>,
}

/// Parse a TOML catalog.
pub fn parse_catalog(raw: &str) -> Result<TopicCatalog> {
    let file: CatalogFile = toml::from_str(raw).context("invalid catalog TOML")?;
    if file.topics.is_empty() {
        bail!("catalog must list at least one topic");
    }
    Ok(TopicCatalog::new(file.topics)?)
}

/// Load the catalog from `path`, or the built-in one when no path is given.
pub fn load_catalog(path: Option<&Path>) -> Result<TopicCatalog> {
    let Some(path) = path else {
        return Ok(TopicCatalog::french_grammar());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    parse_catalog(&raw).with_context(|| format!("loading catalog {}", path.display()))
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its parent directory exist.
pub fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }

    Ok(())
}

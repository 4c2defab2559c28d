//! Run configuration.
//!
//! Built from CLI arguments, layered over an optional TOML file:
//!
//! ```toml
//! [integrity]
//! base_dir = "dist"      # relative to the config file
//! url = "/static"
//! algorithm = "sha384"
//! ```
//!
//! CLI values always win over file values.

mod error;

pub use error::ConfigError;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::integrity::{Algorithm, normalize_prefix};
use crate::log;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Suffix appended to the input path when neither `--inplace` nor `--output` is given.
const UPDATED_SUFFIX: &str = ".updated.html";

/// Validated configuration for one integrity run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityConfig {
    pub html_path: PathBuf,
    /// Directory local references are resolved against.
    pub base_dir: PathBuf,
    pub inplace: bool,
    /// Normalized URL prefix (no trailing `/`). `None` matches site-root references.
    pub url_prefix: Option<String>,
    pub output: Option<PathBuf>,
    pub algorithm: Algorithm,
    /// Verify instead of write.
    pub check: bool,
}

// ============================================================================
// Config file
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    integrity: IntegritySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IntegritySection {
    base_dir: Option<PathBuf>,
    url: Option<String>,
    algorithm: Option<Algorithm>,
}

impl ConfigFile {
    /// Load the config file, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {}, ignoring: {}", path.display(), ignored.join(", "));
        }

        // Paths in the file are relative to the file itself
        if let Some(base_dir) = config.integrity.base_dir.take() {
            let root = path.parent().unwrap_or(Path::new(""));
            config.integrity.base_dir = Some(root.join(base_dir));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }
}

// ============================================================================
// IntegrityConfig
// ============================================================================

impl IntegrityConfig {
    /// Defaults for an HTML file: base directory is the file's own directory.
    pub fn for_html(html_path: impl Into<PathBuf>) -> Result<Self> {
        let html_path = html_path.into();
        let base_dir = default_base_dir(&html_path)?;
        Ok(Self {
            html_path,
            base_dir,
            inplace: false,
            url_prefix: None,
            output: None,
            algorithm: Algorithm::default(),
            check: false,
        })
    }

    /// Build configuration from CLI arguments and the optional config file.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => ConfigFile::from_path(path)?,
            None => ConfigFile::default(),
        };
        let section = file.integrity;

        let mut config = Self::for_html(&cli.html)?;
        if let Some(base_dir) = cli.base_dir.clone().or(section.base_dir) {
            config.base_dir = base_dir;
        }
        config.url_prefix = cli
            .url
            .as_deref()
            .or(section.url.as_deref())
            .map(normalize_prefix);
        config.algorithm = cli.algorithm.or(section.algorithm).unwrap_or_default();
        config.inplace = cli.inplace;
        config.output = cli.output.clone();
        config.check = cli.check;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.inplace && self.output.is_some() {
            return Err(ConfigError::Validation(
                "--inplace and --output are mutually exclusive".to_string(),
            ));
        }
        if !self.base_dir.is_dir() {
            return Err(ConfigError::Validation(format!(
                "base directory `{}` does not exist",
                self.base_dir.display()
            )));
        }
        Ok(())
    }

    /// Where the updated document is written.
    pub fn output_path(&self) -> PathBuf {
        if self.inplace {
            return self.html_path.clone();
        }
        self.output.clone().unwrap_or_else(|| {
            let mut path = self.html_path.clone().into_os_string();
            path.push(UPDATED_SUFFIX);
            PathBuf::from(path)
        })
    }
}

/// Absolute directory containing the HTML file.
fn default_base_dir(html_path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(html_path).map_err(|err| {
        ConfigError::Validation(format!("invalid HTML path `{}`: {err}", html_path.display()))
    })?;
    Ok(absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(absolute))
}

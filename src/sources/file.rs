//! File-based configuration source.

use super::ConfigSource;
use crate::error::{ConfigError, Result};
use crate::value::{Map, Value};
use config::{FileFormat, Format as _};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// File-based configuration source.
///
/// Loads YAML, TOML, JSON or INI files, picking the format from the extension.
///
/// # Examples
///
/// ```rust,no_run
/// use tierconf::sources::FileSource;
///
/// let source = FileSource::new("config/default.yaml");
/// ```
pub struct FileSource {
    path: PathBuf,
    priority: i32,
}

impl FileSource {
    /// Create a new file source.
    ///
    /// The format is detected from the file extension:
    /// - `.yaml`, `.yml` -> YAML
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.ini` -> INI
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            priority: 100,
        }
    }

    /// Set the priority for this source.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn format(&self) -> Result<Format> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!(
                    "Unable to determine file format for: {}",
                    self.path.display()
                ))
            })?;

        match extension {
            "yaml" | "yml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            "json" => Ok(Format::Json),
            "ini" => Ok(Format::Ini),
            _ => Err(ConfigError::LoadError(format!(
                "Unsupported file extension: {}. Supported: .yaml, .yml, .toml, .json, .ini",
                extension
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
    Json,
    Ini,
}

impl Format {
    /// Decode `text` into a tree. Keys keep the case they were written in.
    fn parse(self, origin: &str, text: &str) -> Result<Map> {
        if text.trim().is_empty() {
            return Ok(Map::new());
        }

        let document = match self {
            Format::Yaml => serde_yaml::from_str::<Value>(text).map_err(deserialize_error)?,
            Format::Json => serde_json::from_str::<Value>(text).map_err(deserialize_error)?,
            Format::Toml => {
                let table = text.parse::<toml::Table>().map_err(deserialize_error)?;
                Value::from(toml::Value::Table(table))
            }
            Format::Ini => {
                let origin = origin.to_string();
                let parsed = FileFormat::Ini
                    .parse(Some(&origin), text)
                    .map_err(deserialize_error)?;
                Value::Mapping(
                    parsed
                        .into_iter()
                        .map(|(key, value)| (key, Value::from(value)))
                        .collect(),
                )
            }
        };

        match document {
            Value::Mapping(tree) => Ok(tree),
            Value::Null => Ok(Map::new()),
            other => Err(ConfigError::DeserializationError(format!(
                "Expected a mapping at the root of {}, found {}",
                origin,
                other.type_name()
            ))),
        }
    }
}

fn deserialize_error(err: impl std::fmt::Display) -> ConfigError {
    ConfigError::DeserializationError(format!("Failed to parse file: {}", err))
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<Map> {
        let format = self.format()?;

        if !self.path.exists() {
            return Err(ConfigError::LoadError(format!(
                "Configuration file not found: {}",
                self.path.display()
            )));
        }

        let text = fs::read_to_string(&self.path)?;
        let tree = format.parse(&self.path.display().to_string(), &text)?;

        debug!(path = %self.path.display(), ?format, keys = tree.len(), "loaded configuration file");
        Ok(tree)
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn watch_paths(&self) -> Vec<PathBuf> {
        vec![self.path.clone()]
    }
}

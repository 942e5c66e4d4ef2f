//! Optional on-disk configuration file
//!
//! The file is `config.toml` in a single search directory (the current
//! working directory unless told otherwise). Every failure to find, read,
//! or parse it is soft: [`FileSource::contribute`] logs a warning and the
//! resolver carries on without a file layer.
//!
//! Keys are case-insensitive: they are folded to lower case when the file is
//! parsed, and tables whose names differ only in case are merged.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat, Map, Source, Value, ValueKind};

use crate::config::error::ConfigError;
use crate::config::key::{ConfigKey, KEY_SEPARATOR};

/// Base name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config";

/// Extension (and format) of the configuration file
pub const CONFIG_FILE_EXTENSION: &str = "toml";

/// Default search directory
const DEFAULT_SEARCH_DIR: &str = ".";

/// Locates and parses the configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    /// Search the current working directory
    pub fn new() -> Self {
        Self::in_dir(DEFAULT_SEARCH_DIR)
    }

    /// Search the given directory instead of the working directory
    pub fn in_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory searched for the file
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the file, whether or not it exists
    pub fn path(&self) -> PathBuf {
        self.dir
            .join(format!("{}.{}", CONFIG_FILE_NAME, CONFIG_FILE_EXTENSION))
    }

    /// Load the file, reporting every failure
    ///
    /// # Errors
    ///
    /// - [`ConfigError::FileNotFound`] when the file does not exist
    /// - [`ConfigError::FileAccess`] when it cannot be inspected or read
    /// - [`ConfigError::FileParse`] when it is not valid TOML
    pub fn load(&self) -> Result<LoadedFile, ConfigError> {
        let path = self.path();
        let display = path.display().to_string();

        match std::fs::metadata(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ConfigError::file_not_found(display));
            }
            Err(e) => return Err(ConfigError::file_access(display, e)),
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::file_access(display.clone(), e))?;

        LoadedFile::parse(display, contents)
    }

    /// Load the file, absorbing every failure into a warning
    pub fn contribute(&self) -> FileOutcome {
        match self.load() {
            Ok(file) => {
                tracing::debug!(
                    path = %file.path(),
                    keys = file.keys().len(),
                    "Loaded configuration file"
                );
                FileOutcome::Loaded(file)
            }
            Err(err) => {
                let dir = self.dir.display();
                match &err {
                    ConfigError::FileNotFound { .. } => tracing::warn!(
                        "Config file '{}.{}' not found in directory '{}', using defaults",
                        CONFIG_FILE_NAME,
                        CONFIG_FILE_EXTENSION,
                        dir
                    ),
                    ConfigError::FileParse { .. } => tracing::warn!(
                        error = %err,
                        "Unable to read config file '{}.{}' in directory '{}', using defaults",
                        CONFIG_FILE_NAME,
                        CONFIG_FILE_EXTENSION,
                        dir
                    ),
                    _ => tracing::warn!(
                        error = %err,
                        "Error checking config file '{}.{}' in directory '{}', using defaults",
                        CONFIG_FILE_NAME,
                        CONFIG_FILE_EXTENSION,
                        dir
                    ),
                }
                FileOutcome::Skipped(err)
            }
        }
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new()
    }
}

/// What the file layer contributed to a resolution
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was read and parsed
    Loaded(LoadedFile),
    /// The file was not used; the error has already been logged
    Skipped(ConfigError),
}

impl FileOutcome {
    pub fn loaded(&self) -> Option<&LoadedFile> {
        match self {
            FileOutcome::Loaded(file) => Some(file),
            FileOutcome::Skipped(_) => None,
        }
    }

    pub fn skipped(&self) -> Option<&ConfigError> {
        match self {
            FileOutcome::Loaded(_) => None,
            FileOutcome::Skipped(err) => Some(err),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded().is_some()
    }
}

/// A parsed configuration file
///
/// Acts as the file layer's [`Source`] during the merge.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    path: String,
    table: Map<String, Value>,
    keys: Vec<ConfigKey>,
}

impl LoadedFile {
    /// Parse file contents, remembering the leaf keys it sets
    pub fn parse(path: String, contents: String) -> Result<Self, ConfigError> {
        let parsed = Config::builder()
            .add_source(File::from_str(&contents, FileFormat::Toml))
            .build()
            .and_then(|parsed| parsed.try_deserialize::<Map<String, Value>>())
            .map_err(|source| ConfigError::FileParse {
                path: path.clone(),
                source,
            })?;
        let table = lowercase_table(parsed);

        let mut keys = Vec::new();
        for (name, value) in &table {
            flatten_into(name.clone(), value, &mut keys);
        }
        keys.sort();

        Ok(Self { path, table, keys })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parsed values with lower-case keys
    pub fn table(&self) -> &Map<String, Value> {
        &self.table
    }

    /// Leaf keys set by the file, sorted
    pub fn keys(&self) -> &[ConfigKey] {
        &self.keys
    }

    /// Whether the file sets `key`
    pub fn contains(&self, key: &ConfigKey) -> bool {
        self.keys.binary_search(key).is_ok()
    }
}

impl Source for LoadedFile {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
        Ok(self.table.clone())
    }
}

/// Fold every key to lower case
///
/// Entries are visited in name order, so when two names fold together the
/// later one wins for leaves and tables are merged.
fn lowercase_table(table: Map<String, Value>) -> Map<String, Value> {
    let mut entries: Vec<_> = table.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut folded = Map::new();
    for (name, value) in entries {
        merge_into(&mut folded, name.to_lowercase(), lowercase_value(value));
    }
    folded
}

fn lowercase_value(mut value: Value) -> Value {
    if let ValueKind::Table(table) = &mut value.kind {
        *table = lowercase_table(std::mem::take(table));
    }
    value
}

fn merge_into(table: &mut Map<String, Value>, name: String, mut value: Value) {
    if let Some(existing) = table.get_mut(&name)
        && let (ValueKind::Table(into), ValueKind::Table(from)) =
            (&mut existing.kind, &mut value.kind)
    {
        for (child, child_value) in std::mem::take(from) {
            merge_into(into, child, child_value);
        }
        return;
    }
    table.insert(name, value);
}

fn flatten_into(path: String, value: &Value, out: &mut Vec<ConfigKey>) {
    match &value.kind {
        ValueKind::Table(table) => {
            for (name, child) in table {
                flatten_into(format!("{}{}{}", path, KEY_SEPARATOR, name), child, out);
            }
        }
        // Not a table: a leaf
        _ => out.push(ConfigKey::new(path)),
    }
}

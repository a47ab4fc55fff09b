//! Line-oriented `key=value` tables.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::path::Path;

use crate::GameDataError;

// ---------------------------------------------------------------------------
// LoadWarning
// ---------------------------------------------------------------------------

/// A non-fatal problem found while parsing a data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// The line has no `=` and was skipped.
    InvalidLine { line: usize, content: String },
    /// The key was already defined; the first occurrence was kept.
    DuplicateKey { line: usize, key: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLine { line, content } => {
                write!(f, "line {line}: invalid entry '{content}'")
            }
            Self::DuplicateKey { line, key } => {
                write!(f, "line {line}: duplicate key '{key}'")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// KeyValueMap
// ---------------------------------------------------------------------------

/// An immutable table parsed from `key=value` lines.
///
/// Parsing rules:
///
/// - each line is split on its **first** `=`, so values may contain `=`
/// - blank and whitespace-only lines are ignored
/// - a line without `=` is skipped and reported
/// - a duplicate key is skipped (first occurrence wins) and reported
///
/// Keys and values are kept verbatim; no trimming is applied.
#[derive(Debug, Clone, Default)]
pub struct KeyValueMap {
    entries: HashMap<String, String>,
    warnings: Vec<LoadWarning>,
}

impl KeyValueMap {
    /// Reads and parses a data file.
    ///
    /// `Err` only if the file itself cannot be read; malformed content is
    /// reported through [`warnings`](Self::warnings).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameDataError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            GameDataError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self::parse(&path.display().to_string(), &text))
    }

    /// Parses `key=value` lines from an in-memory string.
    ///
    /// `source` names the table in log output.
    pub fn parse(source: &str, text: &str) -> Self {
        let mut entries = HashMap::new();
        let mut warnings = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!(source, line = line_no, content = line, "invalid line in data file");
                warnings.push(LoadWarning::InvalidLine {
                    line: line_no,
                    content: line.to_owned(),
                });
                continue;
            };

            match entries.entry(key.to_owned()) {
                Entry::Vacant(slot) => {
                    slot.insert(value.to_owned());
                }
                Entry::Occupied(_) => {
                    tracing::warn!(source, line = line_no, key, "duplicate key in data file");
                    warnings.push(LoadWarning::DuplicateKey {
                        line: line_no,
                        key: key.to_owned(),
                    });
                }
            }
        }

        tracing::debug!(source, entries = entries.len(), warnings = warnings.len(), "data file loaded");

        Self { entries, warnings }
    }

    /// Looks up a value by exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries loaded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Lines that were skipped while parsing, in file order.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }
}

//! Error types for the game data layer.

use std::path::PathBuf;

/// Errors that can occur while loading a game data file.
///
/// Malformed lines and duplicate keys are not errors: they are skipped
/// with a warning so one bad line never discards a whole table.
#[derive(Debug, thiserror::Error)]
pub enum GameDataError {
    /// The file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

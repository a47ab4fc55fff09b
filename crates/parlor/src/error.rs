//! Unified error type for Parlor.

use parlor_gamedata::GameDataError;
use parlor_intercept::TaskError;
use parlor_protocol::ProtocolError;

/// Top-level error that wraps every crate-specific error.
///
/// `?` converts sub-crate errors through the generated `From` impls.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// Encoding, decoding or identifier resolution failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A data file could not be read.
    #[error(transparent)]
    GameData(#[from] GameDataError),

    /// A task ended without a result.
    #[error(transparent)]
    Task(#[from] TaskError),
}

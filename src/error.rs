use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the binding layer itself.
///
/// Only loading the shared library has a defined failure mode. Whatever the
/// native simulator does with the text it is handed (syntax errors, internal
/// faults, process termination) happens on the far side of the FFI boundary
/// and is not caught or translated here.
#[derive(Debug, Error)]
pub enum NgSpiceError {
    /// No explicit path was given and the ngspice library could not be
    /// discovered anywhere on the system.
    #[error("could not find the ngspice shared library on this system")]
    LibraryNotFound,

    /// A candidate library file existed but could not be loaded.
    #[error("failed to load ngspice library from {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    /// The library loaded but does not export a required entry point.
    #[error("loaded library is missing required symbol `{0}`")]
    MissingSymbol(&'static str),

    /// Command or circuit text contained an interior NUL byte and cannot
    /// be represented as a C string.
    #[error("text contains an interior NUL byte and cannot be forwarded")]
    InteriorNul,

    /// The native library returned a nonzero status for a circuit line.
    #[error("ngspice rejected circuit line: {0}")]
    CircuitRejected(String),

    /// A requested result vector does not exist in the queried plot.
    #[error("vector `{0}` is not available")]
    VectorNotFound(String),

    #[error("failed to export results: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write CSV output: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

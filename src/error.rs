use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for the cross-validation search.
///
/// Engine non-convergence is deliberately NOT represented here: the search
/// passes through whatever likelihood the fitting engine reports. A search
/// dimension signalling convergence, or the step bound firing, are normal
/// terminal conditions and surface in [`crate::types::TerminationStatus`].
#[derive(Debug, Error)]
pub enum SearchError {
    /// The result artifact path could not be opened or written. This is the
    /// only fatal configuration error in the search; callers abort on it.
    #[error("Unable to open result file {path}: {source}")]
    ResultFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

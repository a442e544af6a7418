//! Error types for probe supervision.

use std::io;

use thiserror::Error;

/// Errors raised while starting the probe process.
///
/// Stream closure, malformed lines and oversized lines are not errors: the
/// first shows up as a dead probe in the snapshot, the others are dropped by
/// the extractor.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe binary could not be launched.
    #[error("failed to start probe '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The probe's output pipe could not be made non-blocking.
    #[error("failed to configure probe output stream: {0}")]
    StreamSetup(#[from] nix::Error),

    /// The probe started but exposed no output pipe.
    #[error("probe '{0}' has no output stream")]
    NoOutput(String),

    /// `start` was called while a probe is already running.
    #[error("probe is already running")]
    AlreadyRunning,
}

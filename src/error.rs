use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that stop a whole purge before anything is overwritten.
#[derive(Error, Debug)]
pub enum PurgeError {
    #[error("target does not exist: {}", .0.display())]
    TargetMissing(PathBuf),

    #[error("failed to walk {}: {source}", .path.display())]
    WalkFailed { path: PathBuf, source: io::Error },

    #[error("secure entropy source unavailable: {0}")]
    EntropySourceUnavailable(#[source] rand::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Errors for a single file. These are recorded in the report and the run
/// moves on to the next file.
#[derive(Error, Debug)]
pub enum WipeError {
    #[error("cannot stat {}: {source}", .path.display())]
    StatFailed { path: PathBuf, source: io::Error },

    #[error("refusing to wipe {}: not a regular file", .path.display())]
    NotRegularFile { path: PathBuf },

    #[error("cannot open {} for writing: {source}", .path.display())]
    OpenFailed { path: PathBuf, source: io::Error },

    #[error("pass {pass} over {} did not complete: {source}", .path.display())]
    Incomplete {
        path: PathBuf,
        pass: usize,
        source: io::Error,
    },

    #[error("entropy source failed while wiping {}: {source}", .path.display())]
    EntropySourceUnavailable { path: PathBuf, source: rand::Error },

    #[error("{} was overwritten but could not be unlinked: {source}", .path.display())]
    UnlinkFailed { path: PathBuf, source: io::Error },

    #[error("{} was not attempted", .path.display())]
    NotAttempted { path: PathBuf },
}

impl WipeError {
    pub fn path(&self) -> &Path {
        match self {
            WipeError::StatFailed { path, .. }
            | WipeError::NotRegularFile { path }
            | WipeError::OpenFailed { path, .. }
            | WipeError::Incomplete { path, .. }
            | WipeError::EntropySourceUnavailable { path, .. }
            | WipeError::UnlinkFailed { path, .. }
            | WipeError::NotAttempted { path } => path,
        }
    }

    /// A failing entropy source will fail every following file too.
    pub fn is_fatal(&self) -> bool {
        matches!(self, WipeError::EntropySourceUnavailable { .. })
    }

    /// True when the file's content was destroyed even though the file survives.
    pub fn content_destroyed(&self) -> bool {
        matches!(self, WipeError::UnlinkFailed { .. })
    }
}

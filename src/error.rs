//! Error types for device access and selection.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rawev operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening, selecting or reading a device.
#[derive(Debug, Error)]
pub enum Error {
    /// The device directory could not be listed.
    #[error("cannot list input devices in {path}: {source}")]
    Enumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A device node could not be opened.
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from an open device failed (usually because it was unplugged).
    #[error("cannot read from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Exclusive access to the device could not be obtained.
    #[error("cannot grab {path}: {source}")]
    Grab {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The interactive choice was rejected.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// The read loop was stopped by the user.
    #[error("interrupted")]
    Interrupted,

    /// Console I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reasons an interactive device choice is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// Standard input was closed before a line was read.
    #[error("no choice entered")]
    NoInput,

    /// The line was not an integer.
    #[error("invalid choice '{input}': not a number")]
    NotANumber { input: String },

    /// The integer does not index the device list. `choice` keeps the
    /// decimal text so values beyond `i64` are reported as typed.
    #[error("Invalid choice: {choice}")]
    OutOfRange { choice: String, count: usize },
}

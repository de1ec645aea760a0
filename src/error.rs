//! Error types for iab-imf.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for iab-imf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A path could not be opened, read or written.
    Io,
    /// The track file is malformed, incomplete, or the request does not fit it.
    Codec,
    /// A caller-supplied value was rejected before any file was touched.
    Validation,
    /// The operation is not allowed in the current writer/reader state.
    State,
}

/// Error type for iab-imf operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input frame directory could not be enumerated.
    #[error("Cannot open IA Frame directory {}: {source}", path.display())]
    InputDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An input frame file could not be read.
    #[error("Cannot read frame {}: {source}", path.display())]
    FrameFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An extracted frame could not be written.
    #[error("Cannot write {}: {source}", path.display())]
    OutputFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid track file structure.
    #[error("Invalid track file: {0}")]
    InvalidTrackFile(String),

    /// The track file was never finalized.
    #[error("Incomplete track file: header partition is not closed and complete")]
    Incomplete,

    /// Frame index beyond the end of the container.
    #[error("Frame index {index} out of range (frame count: {count})")]
    FrameOutOfRange { index: u32, count: u32 },

    /// Frames must carry at least one byte.
    #[error("Cannot write an empty frame")]
    EmptyFrame,

    /// Frame larger than the index can describe.
    #[error("Frame of {len} bytes exceeds the maximum of {} bytes", u32::MAX)]
    FrameTooLarge { len: usize },

    /// The container already holds the maximum number of frames.
    #[error("Track file cannot hold more than {} frames", u32::MAX)]
    TooManyFrames,

    /// Malformed edit rate.
    #[error("Invalid edit rate: {0}")]
    InvalidEditRate(String),

    /// Malformed asset identifier.
    #[error("Invalid asset id: {0}")]
    InvalidAssetId(String),

    /// Malformed RFC 5646 language tag.
    #[error("Invalid language tag: {0}")]
    InvalidLanguageTag(String),

    /// Malformed file name pattern.
    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),

    /// Identity field that does not fit its slot in the header metadata.
    #[error("Invalid identity field {field}: {reason}")]
    InvalidIdentity { field: &'static str, reason: String },

    /// Write or finalize after the writer was finalized.
    #[error("Track file already finalized")]
    Finalized,

    /// Write or finalize after an earlier failure.
    #[error("Writer unusable after an earlier failure")]
    Poisoned,

    /// Operation on a reader that was closed.
    #[error("Track file reader is closed")]
    Closed,

    /// Another writer or reader in this process owns the path.
    #[error("Track file already open: {}", .0.display())]
    AlreadyOpen(PathBuf),
}

impl Error {
    /// Create an invalid track file error.
    pub fn invalid_track_file(msg: impl Into<String>) -> Self {
        Self::InvalidTrackFile(msg.into())
    }

    /// Create an invalid identity error.
    pub fn invalid_identity(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            field,
            reason: reason.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_)
            | Error::InputDirectory { .. }
            | Error::FrameFile { .. }
            | Error::OutputFile { .. } => ErrorKind::Io,
            Error::InvalidTrackFile(_)
            | Error::Incomplete
            | Error::FrameOutOfRange { .. }
            | Error::TooManyFrames => ErrorKind::Codec,
            Error::EmptyFrame
            | Error::FrameTooLarge { .. }
            | Error::InvalidEditRate(_)
            | Error::InvalidAssetId(_)
            | Error::InvalidLanguageTag(_)
            | Error::InvalidPattern(_)
            | Error::InvalidIdentity { .. } => ErrorKind::Validation,
            Error::Finalized | Error::Poisoned | Error::Closed | Error::AlreadyOpen(_) => {
                ErrorKind::State
            }
        }
    }
}

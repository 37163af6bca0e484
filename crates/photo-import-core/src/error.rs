use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which side of the import a directory belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirRole {
    Source,
    Destination,
}

impl fmt::Display for DirRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Destination => write!(f, "destination"),
        }
    }
}

/// Errors that abort a run before it starts. Per-file failures are reported
/// as events instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid {role} directory: {}", .path.display())]
    InvalidDirectory { role: DirRole, path: PathBuf },
}

pub type Result<T> = std::result::Result<T, ImportError>;

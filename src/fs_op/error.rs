use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors produced when inspecting a path (classification, size, stat).
#[derive(Error, Debug)]
pub enum InspectError {
    /// The path does not exist.
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// The path exists but cannot be read by the current user.
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// The path exists but is not something the operation can inspect
    /// (for example a directory passed to `classify`, a socket, or a
    /// symlink loop).
    #[error("not a regular file: {}", .0.display())]
    InvalidTarget(PathBuf),

    /// The file classified as binary or video where text was required.
    #[error("file is not text: {}", .0.display())]
    NotText(PathBuf),

    /// Any other I/O failure, e.g. a read error mid-stream.
    #[error("I/O error on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InspectError {
    /// Map an `io::Error` raised while touching `path` onto the taxonomy.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => return InspectError::NotFound(path),
            io::ErrorKind::PermissionDenied => return InspectError::PermissionDenied(path),
            _ => {}
        }
        match err.raw_os_error() {
            #[cfg(unix)]
            Some(code) if code == nix::errno::Errno::ENOTDIR as i32 => InspectError::NotFound(path),
            #[cfg(unix)]
            Some(code) if code == nix::errno::Errno::ELOOP as i32 => {
                InspectError::InvalidTarget(path)
            }
            _ => InspectError::Io { path, source: err },
        }
    }

    /// The path the failing operation was applied to.
    pub fn path(&self) -> &Path {
        match self {
            InspectError::NotFound(p)
            | InspectError::PermissionDenied(p)
            | InspectError::InvalidTarget(p)
            | InspectError::NotText(p) => p,
            InspectError::Io { path, .. } => path,
        }
    }
}

/// Errors that can occur when building a path from user input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("could not determine home directory")]
    HomeNotFound,
}

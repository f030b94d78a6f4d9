//! Filesystem inspection helpers.
//!
//! Everything here is synchronous and read-only. Each call opens what it
//! needs and releases it before returning; nothing is cached between calls.

#[cfg(unix)]
pub mod access;
pub mod classify;
pub mod error;
pub mod handle;
pub mod lines;
pub mod stat;

#[cfg(unix)]
pub use access::{
    is_executable, is_readable, is_writable, ownership, permissions, Ownership, Permissions,
};
pub use classify::{
    classify, content_info, guess_kind, is_compressed, looks_binary, Classification, Classifier,
    FileKind,
};
pub use error::{InspectError, PathError};
pub use handle::{compound_extension, PathHandle};
pub use lines::{ContentInfo, LineCounter};
pub use stat::{
    exists, human_size, is_empty, size, size_as, timestamps, EntryType, SizeUnit, Timestamps,
    UnknownUnit,
};

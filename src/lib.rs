//! Filesystem paths with extra read-only inspection helpers.
//!
//! The centre of the crate is [`classify`], which decides whether a file is
//! text, binary or video and counts the lines of text files:
//!
//! ```no_run
//! use pathext::{classify, FileKind, PathHandle};
//!
//! let c = classify("/etc/hostname").expect("classify failed");
//! if c.kind() == FileKind::Text {
//!     println!("{} lines", c.line_count().unwrap_or(0));
//! }
//!
//! let notes = PathHandle::parse("~/notes.md").expect("no home directory");
//! println!("{} is {} bytes", notes, notes.size().unwrap_or(0));
//! ```

pub mod fs_op;
pub mod settings;

pub use crate::fs_op::{
    classify, content_info, guess_kind, human_size, is_compressed, size, Classification,
    Classifier, ContentInfo, EntryType, FileKind, InspectError, PathError, PathHandle, SizeUnit,
};
pub use crate::settings::ClassifierSettings;

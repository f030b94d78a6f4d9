use std::fmt;
use std::fs::{self, Metadata};
use std::path::Path;
use std::str::FromStr;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use thiserror::Error;

use super::error::InspectError;

/// Kind of a filesystem entry, as reported without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum EntryType {
    File,
    Directory,
    Symlink,
    Socket,
    Fifo,
    CharDevice,
    BlockDevice,
    /// Anything the platform reports that fits none of the above.
    Other,
}

impl EntryType {
    /// Classify `path` and return its `EntryType`.
    pub fn of<P: AsRef<Path>>(path: P) -> Result<Self, InspectError> {
        let p = path.as_ref();
        let md = fs::symlink_metadata(p).map_err(|e| InspectError::from_io(p, e))?;
        Ok(Self::from_file_type(md.file_type()))
    }

    pub fn from_file_type(ft: fs::FileType) -> Self {
        if ft.is_symlink() {
            return EntryType::Symlink;
        }
        if ft.is_dir() {
            return EntryType::Directory;
        }
        if ft.is_file() {
            return EntryType::File;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if ft.is_socket() {
                return EntryType::Socket;
            }
            if ft.is_fifo() {
                return EntryType::Fifo;
            }
            if ft.is_char_device() {
                return EntryType::CharDevice;
            }
            if ft.is_block_device() {
                return EntryType::BlockDevice;
            }
        }
        EntryType::Other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::File => "file",
            EntryType::Directory => "dir",
            EntryType::Symlink => "symlink",
            EntryType::Socket => "socket",
            EntryType::Fifo => "fifo",
            EntryType::CharDevice => "char_device",
            EntryType::BlockDevice => "block_device",
            EntryType::Other => "other",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return `true` if the provided `path` exists (following symlinks).
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    fs::metadata(path).is_ok()
}

/// Metadata of `path` (following symlinks), required to be a regular file.
pub(crate) fn regular_file_metadata(path: &Path) -> Result<Metadata, InspectError> {
    let md = fs::metadata(path).map_err(|e| InspectError::from_io(path, e))?;
    if !md.is_file() {
        return Err(InspectError::InvalidTarget(path.to_path_buf()));
    }
    Ok(md)
}

/// Size in bytes of the regular file at `path`.
pub fn size<P: AsRef<Path>>(path: P) -> Result<u64, InspectError> {
    Ok(regular_file_metadata(path.as_ref())?.len())
}

/// `true` for a zero-length file or a directory without entries.
///
/// Only the first directory entry is looked at; nothing is walked.
pub fn is_empty<P: AsRef<Path>>(path: P) -> Result<bool, InspectError> {
    let p = path.as_ref();
    let md = fs::metadata(p).map_err(|e| InspectError::from_io(p, e))?;
    if md.is_file() {
        Ok(md.len() == 0)
    } else if md.is_dir() {
        let mut rd = fs::read_dir(p).map_err(|e| InspectError::from_io(p, e))?;
        Ok(rd.next().is_none())
    } else {
        Err(InspectError::InvalidTarget(p.to_path_buf()))
    }
}

/// Modification, access and (where supported) creation times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub modified: DateTime<Local>,
    pub accessed: DateTime<Local>,
    /// `None` on filesystems that do not record a birth time.
    pub created: Option<DateTime<Local>>,
}

pub fn timestamps<P: AsRef<Path>>(path: P) -> Result<Timestamps, InspectError> {
    let p = path.as_ref();
    let md = fs::metadata(p).map_err(|e| InspectError::from_io(p, e))?;
    let local = |t: SystemTime| DateTime::<Local>::from(t);
    Ok(Timestamps {
        modified: md.modified().map(local).map_err(|e| InspectError::from_io(p, e))?,
        accessed: md.accessed().map(local).map_err(|e| InspectError::from_io(p, e))?,
        created: md.created().ok().map(local),
    })
}

/// Binary (1024-based) size units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SizeUnit {
    B,
    KB,
    MB,
    GB,
    TB,
    PB,
}

/// Returned when a size unit string is not one of B, KB, MB, GB, TB, PB.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid size unit `{0}`, accepted values are: B, KB, MB, GB, TB, PB")]
pub struct UnknownUnit(pub String);

impl SizeUnit {
    pub const ALL: [SizeUnit; 6] = [
        SizeUnit::B,
        SizeUnit::KB,
        SizeUnit::MB,
        SizeUnit::GB,
        SizeUnit::TB,
        SizeUnit::PB,
    ];

    pub fn factor(self) -> u64 {
        1u64 << (10 * self as u32)
    }

    /// Express `bytes` in this unit.
    pub fn convert(self, bytes: u64) -> f64 {
        bytes as f64 / self.factor() as f64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeUnit::B => "B",
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
            SizeUnit::TB => "TB",
            SizeUnit::PB => "PB",
        }
    }
}

impl FromStr for SizeUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        SizeUnit::ALL
            .into_iter()
            .find(|u| u.as_str() == wanted)
            .ok_or_else(|| UnknownUnit(s.to_string()))
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format `bytes` with the largest unit that keeps the value below 1024,
/// e.g. `human_size(1536, 3) == "1.500 KB"`.
pub fn human_size(bytes: u64, precision: usize) -> String {
    let unit = SizeUnit::ALL
        .into_iter()
        .rev()
        .find(|u| bytes >= u.factor())
        .unwrap_or(SizeUnit::B);
    format!("{:.*} {}", precision, unit.convert(bytes), unit)
}

/// Size of the file at `path` expressed in `unit`.
pub fn size_as<P: AsRef<Path>>(path: P, unit: SizeUnit) -> Result<f64, InspectError> {
    Ok(unit.convert(size(path)?))
}

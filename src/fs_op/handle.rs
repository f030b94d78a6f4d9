use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use directories_next::BaseDirs;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::classify::{self, Classification};
use super::error::{InspectError, PathError};
use super::lines::ContentInfo;
use super::stat::{self, EntryType, SizeUnit, Timestamps};

static ENV_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("env var pattern is valid")
});

/// Extension of `path` without the leading dot. `.tar.*` archives keep
/// both suffixes (`tar.gz`); hidden files such as `.bashrc` have none.
pub fn compound_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?.trim_start_matches('.');
    let parts: Vec<&str> = name.split('.').collect();
    let n = parts.len();
    if n < 2 || parts[n - 1].is_empty() {
        return None;
    }
    if n >= 3 && parts[n - 2].eq_ignore_ascii_case("tar") {
        return Some(format!("{}.{}", parts[n - 2], parts[n - 1]));
    }
    Some(parts[n - 1].to_string())
}

/// Immutable owned filesystem location.
///
/// Construction helpers (`join`, `home`, `expand_user`) are thin wrappers
/// over `std::path`; the inspection methods delegate to the free functions
/// in [`crate::fs_op`] so cost and failure modes stay explicit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathHandle(PathBuf);

impl PathHandle {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        PathHandle(path.into())
    }

    /// Build a handle from user input.
    ///
    /// - Empty (or all-whitespace) `input` is an error.
    /// - A leading `~` is expanded to the user's home directory.
    /// - Nothing is checked against the filesystem.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PathError::Empty);
        }
        PathHandle::new(input).expand_user()
    }

    /// The current user's home directory.
    pub fn home() -> Result<Self, PathError> {
        BaseDirs::new()
            .map(|d| PathHandle::new(d.home_dir()))
            .ok_or(PathError::HomeNotFound)
    }

    /// Replace a leading `~` component with the home directory. `~user`
    /// forms are left untouched.
    pub fn expand_user(&self) -> Result<Self, PathError> {
        let mut comps = self.0.components();
        match comps.next() {
            Some(c) if c.as_os_str() == OsStr::new("~") => {
                let home = Self::home()?;
                let rest = comps.as_path();
                if rest.as_os_str().is_empty() {
                    Ok(home)
                } else {
                    Ok(home.join(rest))
                }
            }
            _ => Ok(self.clone()),
        }
    }

    /// Substitute `$NAME` and `${NAME}` with environment values. Unset
    /// variables and non UTF-8 paths are left as they are.
    pub fn expand_vars(&self) -> Self {
        let Some(s) = self.0.to_str() else {
            return self.clone();
        };
        let out = ENV_VAR.replace_all(s, |caps: &Captures| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
        });
        PathHandle::new(out.into_owned())
    }

    pub fn join<P: AsRef<Path>>(&self, segment: P) -> Self {
        PathHandle(self.0.join(segment))
    }

    pub fn parent(&self) -> Option<Self> {
        self.0.parent().map(PathHandle::new)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|n| n.to_str())
    }

    /// Extension without the leading dot. `.tar.*` archives keep both
    /// suffixes (`tar.gz`); hidden files such as `.bashrc` have none.
    pub fn extension(&self) -> Option<String> {
        compound_extension(&self.0)
    }

    /// File name with the [`extension`](Self::extension) removed.
    pub fn stem(&self) -> Option<String> {
        let name = self.file_name()?;
        let stem = match self.extension() {
            Some(ext) => name.strip_suffix(&format!(".{ext}")).unwrap_or(name),
            None => name,
        };
        Some(stem.to_string())
    }

    /// Canonical absolute form, following symlinks.
    pub fn resolve(&self) -> Result<Self, InspectError> {
        fs::canonicalize(&self.0)
            .map(PathHandle)
            .map_err(|e| InspectError::from_io(&self.0, e))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    pub fn exists(&self) -> bool {
        stat::exists(&self.0)
    }

    pub fn classify(&self) -> Result<Classification, InspectError> {
        classify::classify(&self.0)
    }

    pub fn content_info(&self) -> Result<ContentInfo, InspectError> {
        classify::content_info(&self.0)
    }

    pub fn is_compressed(&self) -> Result<bool, InspectError> {
        classify::is_compressed(&self.0)
    }

    pub fn size(&self) -> Result<u64, InspectError> {
        stat::size(&self.0)
    }

    pub fn size_as(&self, unit: SizeUnit) -> Result<f64, InspectError> {
        stat::size_as(&self.0, unit)
    }

    pub fn entry_type(&self) -> Result<EntryType, InspectError> {
        EntryType::of(&self.0)
    }

    pub fn is_empty(&self) -> Result<bool, InspectError> {
        stat::is_empty(&self.0)
    }

    pub fn timestamps(&self) -> Result<Timestamps, InspectError> {
        stat::timestamps(&self.0)
    }

    #[cfg(unix)]
    pub fn permissions(&self) -> Result<super::access::Permissions, InspectError> {
        super::access::permissions(&self.0)
    }

    #[cfg(unix)]
    pub fn ownership(&self) -> Result<super::access::Ownership, InspectError> {
        super::access::ownership(&self.0)
    }

    #[cfg(unix)]
    pub fn is_readable(&self) -> bool {
        super::access::is_readable(&self.0)
    }

    #[cfg(unix)]
    pub fn is_writable(&self) -> bool {
        super::access::is_writable(&self.0)
    }

    #[cfg(unix)]
    pub fn is_executable(&self) -> bool {
        super::access::is_executable(&self.0)
    }
}

impl AsRef<Path> for PathHandle {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for PathHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for PathHandle {
    fn from(p: PathBuf) -> Self {
        PathHandle(p)
    }
}

impl From<&Path> for PathHandle {
    fn from(p: &Path) -> Self {
        PathHandle(p.to_path_buf())
    }
}

impl From<&str> for PathHandle {
    fn from(s: &str) -> Self {
        PathHandle::new(s)
    }
}

impl From<String> for PathHandle {
    fn from(s: String) -> Self {
        PathHandle::new(s)
    }
}

impl From<PathHandle> for PathBuf {
    fn from(h: PathHandle) -> Self {
        h.0
    }
}

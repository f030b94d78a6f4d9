use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config_dirs::user_settings_path;

/// Bytes sampled from the start of a file for binary/text detection.
pub const DEFAULT_SAMPLE_SIZE: usize = 8 * 1024;

/// Extensions treated as video when the content is not flagged binary.
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mkv", "avi", "mov", "webm", "flv", "wmv", "mpg", "mpeg", "3gp", "ogv", "ts",
];

/// Extensions of compressed/archive formats. `tar.*` entries match the
/// compound extension of a path.
pub const DEFAULT_ARCHIVE_EXTENSIONS: &[&str] = &[
    "7z", "ace", "ar", "arj", "arz", "bz", "bz2", "bzip2", "gz", "gzip", "lrz", "lz", "lz4",
    "lzh", "lzip", "lzma", "lzo", "pea", "rar", "tar", "tar.bz", "tar.bz2", "tar.bzip",
    "tar.bzip2", "tar.gz", "tar.lrz", "tar.lz", "tar.lz4", "tar.lzip", "tar.lzma", "tar.lzo",
    "tar.xz", "tar.z", "tar.zst", "tar.zstd", "tarbz2", "taz", "tbz", "tbz2", "tgz", "tlrz",
    "tlz", "txz", "tz", "tzst", "wmz", "xz", "z", "zip", "zipx", "zz",
];

/// Errors produced while loading classifier settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables of the file classifier.
///
/// ```toml
/// sample_size = 4096
/// video_extensions = ["mp4", ".MKV"]
/// archive_extensions = ["zip", "tar.gz"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub sample_size: usize,
    pub video_extensions: Vec<String>,
    pub archive_extensions: Vec<String>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            video_extensions: DEFAULT_VIDEO_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            archive_extensions: DEFAULT_ARCHIVE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ClassifierSettings {
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        let settings: ClassifierSettings = toml::from_str(s)?;
        Ok(settings.normalized())
    }

    /// Normalize both extension sets with [`normalize_extensions`]. A zero
    /// sample size falls back to the default.
    pub fn normalized(mut self) -> Self {
        if self.sample_size == 0 {
            self.sample_size = DEFAULT_SAMPLE_SIZE;
        }
        self.video_extensions = normalize_extensions(&self.video_extensions);
        self.archive_extensions = normalize_extensions(&self.archive_extensions);
        self
    }
}

/// Lower-case, strip leading dots, drop empties, sort and dedup.
pub fn normalize_extensions<I, S>(exts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = exts
        .into_iter()
        .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Read classifier settings from a TOML file.
pub fn load_settings(path: impl AsRef<Path>) -> Result<ClassifierSettings, SettingsError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = ClassifierSettings::from_toml_str(&raw)?;
    tracing::debug!("loaded classifier settings from {}", path.display());
    Ok(settings)
}

/// Load the per-user settings file, or defaults when it does not exist.
pub fn load_user_settings() -> Result<ClassifierSettings, SettingsError> {
    match user_settings_path() {
        Some(p) if p.is_file() => load_settings(p),
        _ => Ok(ClassifierSettings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_toml_keeps_defaults() {
        let s = ClassifierSettings::from_toml_str("sample_size = 512").unwrap();
        assert_eq!(s.sample_size, 512);
        assert!(s.video_extensions.iter().any(|e| e == "mp4"));
        assert!(s.archive_extensions.iter().any(|e| e == "tar.gz"));
    }

    #[test]
    fn archive_extensions_are_configurable() {
        let s = ClassifierSettings::from_toml_str(r#"archive_extensions = ["TAR.GZ", ".cab"]"#)
            .unwrap();
        assert_eq!(s.archive_extensions, vec!["cab".to_string(), "tar.gz".to_string()]);
        assert!(s.video_extensions.iter().any(|e| e == "mkv"));
    }

    #[test]
    fn extensions_are_normalized() {
        let s = ClassifierSettings::from_toml_str(
            r#"video_extensions = [".MKV", "mkv", " Mp4 ", ""]
sample_size = 0"#,
        )
        .unwrap();
        assert_eq!(s.video_extensions, vec!["mkv".to_string(), "mp4".to_string()]);
        assert_eq!(s.sample_size, DEFAULT_SAMPLE_SIZE);
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = ClassifierSettings::from_toml_str("sample_size = \"lots\"").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn load_settings_from_file_and_missing_file() {
        let td = tempdir().unwrap();
        let p = td.path().join("classifier.toml");
        std::fs::write(&p, "video_extensions = [\"vob\"]\n").unwrap();
        let s = load_settings(&p).unwrap();
        assert_eq!(s.video_extensions, vec!["vob".to_string()]);

        let err = load_settings(td.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}

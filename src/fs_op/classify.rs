//! Content classification of regular files.
//!
//! A bounded prefix of the file decides between binary, video and text.
//! Text files additionally get a line count, computed by streaming the rest
//! of the file through the same handle so memory use does not depend on
//! file size.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use once_cell::sync::Lazy;

use super::error::InspectError;
use super::handle::compound_extension;
use super::lines::{stream_chunks, ContentCounter, ContentInfo, LineCounter};
use super::stat::regular_file_metadata;
use crate::settings::{load_user_settings, normalize_extensions, ClassifierSettings, SettingsError};

static DEFAULT_CLASSIFIER: Lazy<Classifier> = Lazy::new(Classifier::default);

/// Inferred content category of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Text,
    Binary,
    Video,
    /// Not enough information to decide (extension-only guesses).
    Unknown,
}

/// Result of [`Classifier::classify`]. `line_count` is present exactly when
/// the kind is [`FileKind::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Classification {
    kind: FileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    line_count: Option<u64>,
}

impl Classification {
    pub fn text(line_count: u64) -> Self {
        Self {
            kind: FileKind::Text,
            line_count: Some(line_count),
        }
    }

    pub fn binary() -> Self {
        Self {
            kind: FileKind::Binary,
            line_count: None,
        }
    }

    pub fn video() -> Self {
        Self {
            kind: FileKind::Video,
            line_count: None,
        }
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn line_count(&self) -> Option<u64> {
        self.line_count
    }

    pub fn is_text(&self) -> bool {
        self.kind == FileKind::Text
    }

    pub fn is_binary(&self) -> bool {
        self.kind == FileKind::Binary
    }

    pub fn is_video(&self) -> bool {
        self.kind == FileKind::Video
    }
}

/// `true` when `sample` contains a NUL byte or is not valid UTF-8.
///
/// Set `truncated` when `sample` is a prefix of a longer stream: a UTF-8
/// sequence cut off at the very end is then not treated as invalid.
pub fn looks_binary(sample: &[u8], truncated: bool) -> bool {
    if sample.contains(&0) {
        return true;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => false,
        Err(e) => !(truncated && e.error_len().is_none()),
    }
}

/// File classifier configured with a sample size and sets of video and
/// archive extensions. Immutable once built; share it freely between
/// threads.
#[derive(Debug, Clone)]
pub struct Classifier {
    sample_size: usize,
    video_extensions: BTreeSet<String>,
    archive_extensions: BTreeSet<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierSettings::default())
    }
}

impl Classifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        let settings = settings.normalized();
        Self {
            sample_size: settings.sample_size,
            video_extensions: settings.video_extensions.into_iter().collect(),
            archive_extensions: settings.archive_extensions.into_iter().collect(),
        }
    }

    /// Build from the per-user settings file, or defaults when absent.
    pub fn from_user_settings() -> Result<Self, SettingsError> {
        Ok(Self::new(load_user_settings()?))
    }

    /// Replace the video extension set. Leading dots and case are ignored.
    pub fn with_video_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.video_extensions = normalize_extensions(exts).into_iter().collect();
        self
    }

    /// Replace the archive extension set used by [`is_compressed`](Self::is_compressed).
    /// Entries may be compound (`tar.gz`).
    pub fn with_archive_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.archive_extensions = normalize_extensions(exts).into_iter().collect();
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        if sample_size > 0 {
            self.sample_size = sample_size;
        }
        self
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn video_extensions(&self) -> impl Iterator<Item = &str> {
        self.video_extensions.iter().map(String::as_str)
    }

    pub fn archive_extensions(&self) -> impl Iterator<Item = &str> {
        self.archive_extensions.iter().map(String::as_str)
    }

    /// Case-insensitive match of the compound extension (`tar.gz`, `zip`)
    /// of `path` against the configured archive set. No I/O.
    pub fn is_archive_extension<P: AsRef<Path>>(&self, path: P) -> bool {
        compound_extension(path.as_ref())
            .is_some_and(|e| self.archive_extensions.contains(&e.to_ascii_lowercase()))
    }

    /// Case-insensitive match of the last extension of `path` against the
    /// configured video set. No I/O.
    pub fn is_video_extension<P: AsRef<Path>>(&self, path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.video_extensions.contains(&e.to_ascii_lowercase()))
    }

    /// Extension-only guess: `Video` or `Unknown`. Never touches the disk.
    pub fn guess_kind<P: AsRef<Path>>(&self, path: P) -> FileKind {
        if self.is_video_extension(path) {
            FileKind::Video
        } else {
            FileKind::Unknown
        }
    }

    /// Classify the regular file at `path`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `PermissionDenied`, `InvalidTarget` for anything that is
    /// not a regular file, and `Io` when reading fails part way.
    pub fn classify<P: AsRef<Path>>(&self, path: P) -> Result<Classification, InspectError> {
        let p = path.as_ref();
        let (mut file, prefix, truncated) = self.open_sample(p)?;
        let kind = self.sniff(p, &prefix, truncated);
        let result = match kind {
            FileKind::Text => {
                let mut counter = LineCounter::new();
                counter.feed(&prefix);
                stream_chunks(&mut file, |c| counter.feed(c))
                    .map_err(|e| InspectError::from_io(p, e))?;
                Classification::text(counter.finish())
            }
            FileKind::Video => Classification::video(),
            FileKind::Binary | FileKind::Unknown => Classification::binary(),
        };
        tracing::trace!(path = %p.display(), ?result, "classified file");
        Ok(result)
    }

    /// Line, word and character counts of a text file.
    ///
    /// Fails with `NotText` when the file classifies as binary or video.
    pub fn content_info<P: AsRef<Path>>(&self, path: P) -> Result<ContentInfo, InspectError> {
        let p = path.as_ref();
        let (mut file, prefix, truncated) = self.open_sample(p)?;
        if self.sniff(p, &prefix, truncated) != FileKind::Text {
            return Err(InspectError::NotText(p.to_path_buf()));
        }
        let mut counter = ContentCounter::new();
        counter.feed(&prefix);
        stream_chunks(&mut file, |c| counter.feed(c))
            .map_err(|e| InspectError::from_io(p, e))?;
        Ok(counter.finish())
    }

    pub fn is_binary<P: AsRef<Path>>(&self, path: P) -> Result<bool, InspectError> {
        Ok(self.classify(path)?.is_binary())
    }

    pub fn is_text<P: AsRef<Path>>(&self, path: P) -> Result<bool, InspectError> {
        Ok(self.classify(path)?.is_text())
    }

    pub fn is_video<P: AsRef<Path>>(&self, path: P) -> Result<bool, InspectError> {
        Ok(self.classify(path)?.is_video())
    }

    /// `true` for a binary file whose extension is a known archive format.
    /// A text file named `notes.zip` is not compressed.
    pub fn is_compressed<P: AsRef<Path>>(&self, path: P) -> Result<bool, InspectError> {
        let p = path.as_ref();
        let ext_matches = self.is_archive_extension(p);
        // classify anyway so missing paths and directories still fail
        let binary = self.classify(p)?.is_binary();
        Ok(ext_matches && binary)
    }

    /// Line count of a text file, `None` for binary or video files.
    pub fn line_count<P: AsRef<Path>>(&self, path: P) -> Result<Option<u64>, InspectError> {
        Ok(self.classify(path)?.line_count())
    }

    // Open `path` as a regular file and read up to `sample_size` bytes.
    // The returned handle is positioned right after the sample.
    fn open_sample(&self, p: &Path) -> Result<(File, Vec<u8>, bool), InspectError> {
        let md = regular_file_metadata(p)?;
        let mut file = File::open(p).map_err(|e| InspectError::from_io(p, e))?;
        let prefix =
            read_prefix(&mut file, self.sample_size).map_err(|e| InspectError::from_io(p, e))?;
        let truncated = md.len() > prefix.len() as u64;
        Ok((file, prefix, truncated))
    }

    fn sniff(&self, p: &Path, prefix: &[u8], truncated: bool) -> FileKind {
        if prefix.is_empty() {
            return FileKind::Text;
        }
        if prefix.contains(&0) {
            return FileKind::Binary;
        }
        if self.is_video_extension(p) {
            return FileKind::Video;
        }
        if looks_binary(prefix, truncated) {
            FileKind::Binary
        } else {
            FileKind::Text
        }
    }
}

fn read_prefix(file: &mut File, limit: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(limit.min(64 * 1024));
    file.by_ref().take(limit as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Classify `path` with the default classifier.
pub fn classify<P: AsRef<Path>>(path: P) -> Result<Classification, InspectError> {
    DEFAULT_CLASSIFIER.classify(path)
}

/// Line/word/character counts of `path` with the default classifier.
pub fn content_info<P: AsRef<Path>>(path: P) -> Result<ContentInfo, InspectError> {
    DEFAULT_CLASSIFIER.content_info(path)
}

/// Archive check with the default archive set.
pub fn is_compressed<P: AsRef<Path>>(path: P) -> Result<bool, InspectError> {
    DEFAULT_CLASSIFIER.is_compressed(path)
}

/// Extension-only guess with the default video set.
pub fn guess_kind<P: AsRef<Path>>(path: P) -> FileKind {
    DEFAULT_CLASSIFIER.guess_kind(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn looks_binary_detects_nul_and_non_utf8() {
        assert!(!looks_binary(b"hello world", false));
        assert!(!looks_binary(b"", false));
        assert!(looks_binary(b"hello\0world", false));
        // continuation bytes without a leader
        assert!(looks_binary(&[0x80, 0x80, 0x80], false));
    }

    #[test]
    fn looks_binary_tolerates_cut_sequence_only_when_truncated() {
        let cut = &"aé".as_bytes()[..2];
        assert!(!looks_binary(cut, true));
        assert!(looks_binary(cut, false));
    }

    #[test]
    fn multibyte_char_split_at_sample_boundary_is_text() {
        let td = tempdir().unwrap();
        let p = td.path().join("utf8.txt");
        // 'é' is two bytes; with a 4-byte sample the cut lands inside it
        fs::write(&p, "abcé\nxyz\n").unwrap();
        let c = Classifier::default().with_sample_size(4).classify(&p).unwrap();
        assert_eq!(c, Classification::text(2));
    }

    #[test]
    fn line_count_streams_past_the_sample() {
        let td = tempdir().unwrap();
        let p = td.path().join("big.txt");
        let body = "line\n".repeat(10_000);
        fs::write(&p, &body).unwrap();
        let c = Classifier::default().with_sample_size(16).classify(&p).unwrap();
        assert_eq!(c.line_count(), Some(10_000));
    }

    #[test]
    fn nul_beyond_sample_does_not_make_binary() {
        let td = tempdir().unwrap();
        let p = td.path().join("late_nul.txt");
        let mut body = b"a\nb\n".to_vec();
        body.push(0);
        fs::write(&p, &body).unwrap();
        let c = Classifier::default().with_sample_size(4).classify(&p).unwrap();
        assert!(c.is_text());

        let c = Classifier::default().classify(&p).unwrap();
        assert!(c.is_binary());
        assert_eq!(c.line_count(), None);
    }

    #[test]
    fn invalid_utf8_is_binary_unless_video() {
        let td = tempdir().unwrap();
        let raw = [0xffu8, 0xfe, 0x41, 0x42];
        let bin = td.path().join("blob.dat");
        fs::write(&bin, raw).unwrap();
        assert_eq!(classify(&bin).unwrap().kind(), FileKind::Binary);

        let vid = td.path().join("blob.webm");
        fs::write(&vid, raw).unwrap();
        assert_eq!(classify(&vid).unwrap().kind(), FileKind::Video);
    }

    #[test]
    fn custom_video_set_replaces_default() {
        let td = tempdir().unwrap();
        let p = td.path().join("movie.vob");
        fs::write(&p, b"not really").unwrap();
        assert!(classify(&p).unwrap().is_text());

        let c = Classifier::default().with_video_extensions([".VOB"]);
        assert!(c.is_video(&p).unwrap());
        assert!(!c.is_video_extension("x.mp4"));
        assert_eq!(c.video_extensions().collect::<Vec<_>>(), vec!["vob"]);
    }

    #[test]
    fn empty_file_with_video_extension_is_text() {
        let td = tempdir().unwrap();
        let p = td.path().join("empty.mp4");
        fs::write(&p, b"").unwrap();
        assert_eq!(classify(&p).unwrap(), Classification::text(0));
        assert_eq!(guess_kind(&p), FileKind::Video);
    }

    #[test]
    fn compressed_needs_binary_content_and_archive_extension() {
        let td = tempdir().unwrap();
        let gz = td.path().join("logs.tar.gz");
        fs::write(&gz, [0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00]).unwrap();
        assert!(is_compressed(&gz).unwrap());

        let fake = td.path().join("notes.zip");
        fs::write(&fake, "just text\n").unwrap();
        assert!(!is_compressed(&fake).unwrap());

        let blob = td.path().join("blob.dat");
        fs::write(&blob, [0u8, 1, 2]).unwrap();
        assert!(!is_compressed(&blob).unwrap());

        let upper = td.path().join("BACKUP.7Z");
        fs::write(&upper, [0x37, 0x7a, 0xbc, 0xaf, 0x27, 0x1c, 0x00]).unwrap();
        assert!(is_compressed(&upper).unwrap());

        assert!(matches!(
            is_compressed(td.path()),
            Err(InspectError::InvalidTarget(_))
        ));
    }

    #[test]
    fn custom_archive_set_replaces_default() {
        let td = tempdir().unwrap();
        let p = td.path().join("bundle.pak");
        fs::write(&p, [0u8, 0xff]).unwrap();
        assert!(!is_compressed(&p).unwrap());

        let c = Classifier::default().with_archive_extensions([".PAK", "tar.gz"]);
        assert!(c.is_compressed(&p).unwrap());
        assert!(c.is_archive_extension("x.TAR.GZ"));
        assert!(!c.is_archive_extension("x.zip"));
        assert_eq!(c.archive_extensions().collect::<Vec<_>>(), vec!["pak", "tar.gz"]);
        // video set untouched by the archive override
        assert!(c.is_video_extension("a.mkv"));
    }

    #[test]
    fn guess_kind_is_extension_only() {
        assert_eq!(guess_kind("/nonexistent/film.MKV"), FileKind::Video);
        assert_eq!(guess_kind("/nonexistent/notes.txt"), FileKind::Unknown);
        assert_eq!(guess_kind("/nonexistent/no_ext"), FileKind::Unknown);
    }

    #[test]
    fn content_info_counts_and_rejects_binary() {
        let td = tempdir().unwrap();
        let p = td.path().join("wc.txt");
        fs::write(&p, "one two\nthree\n").unwrap();
        let info = content_info(&p).unwrap();
        assert_eq!(
            info,
            ContentInfo {
                lines: 2,
                words: 3,
                chars: 11
            }
        );

        let b = td.path().join("wc.bin");
        fs::write(&b, b"\0\0").unwrap();
        assert!(matches!(content_info(&b), Err(InspectError::NotText(_))));
    }
}

//! Bounded-memory line, word and character counting.
//!
//! Counters are fed byte chunks in order and keep just enough state to
//! handle terminators and UTF-8 sequences split across chunk boundaries.

use std::io::{self, Read};

/// Size of the buffer used when streaming the remainder of a file.
pub const STREAM_CHUNK: usize = 64 * 1024;

/// Counts line terminators across a stream of byte chunks.
///
/// `\n`, `\r\n` and a lone `\r` each terminate one line. A non-empty
/// trailing segment without a terminator counts as one more line.
#[derive(Debug, Default, Clone)]
pub struct LineCounter {
    terminators: u64,
    prev_cr: bool,
    last: Option<u8>,
}

impl LineCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) {
        for &b in chunk {
            match b {
                b'\n' if self.prev_cr => {}
                b'\n' | b'\r' => self.terminators += 1,
                _ => {}
            }
            self.prev_cr = b == b'\r';
        }
        if let Some(&b) = chunk.last() {
            self.last = Some(b);
        }
    }

    pub fn finish(&self) -> u64 {
        match self.last {
            None => 0,
            Some(b'\n') | Some(b'\r') => self.terminators,
            Some(_) => self.terminators + 1,
        }
    }
}

/// Line, word and character totals for a text file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ContentInfo {
    pub lines: u64,
    /// Runs of non-whitespace separated by whitespace.
    pub words: u64,
    /// Non-whitespace characters (UTF-8 scalar values).
    pub chars: u64,
}

/// Streaming counterpart of `ContentInfo`.
///
/// Words are split on Unicode whitespace (`char::is_whitespace`), so vertical
/// tabs and no-break spaces separate words too. A UTF-8 sequence split across
/// chunks is held back (at most 3 bytes) until the next chunk completes it.
/// Invalid sequences count as one non-whitespace character each.
#[derive(Debug, Default, Clone)]
pub struct ContentCounter {
    lines: LineCounter,
    words: u64,
    chars: u64,
    in_word: bool,
    carry: Vec<u8>,
}

impl ContentCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) {
        self.lines.feed(chunk);
        if self.carry.is_empty() {
            self.scan(chunk);
        } else {
            let mut joined = std::mem::take(&mut self.carry);
            joined.extend_from_slice(chunk);
            self.scan(&joined);
        }
    }

    pub fn finish(&self) -> ContentInfo {
        let mut info = ContentInfo {
            lines: self.lines.finish(),
            words: self.words,
            chars: self.chars,
        };
        // truncated sequence at end of input
        if !self.carry.is_empty() {
            info.chars += 1;
            if !self.in_word {
                info.words += 1;
            }
        }
        info
    }

    fn scan(&mut self, mut bytes: &[u8]) {
        loop {
            match std::str::from_utf8(bytes) {
                Ok(s) => {
                    s.chars().for_each(|c| self.count(c));
                    return;
                }
                Err(e) => {
                    let (valid, rest) = bytes.split_at(e.valid_up_to());
                    std::str::from_utf8(valid)
                        .unwrap_or_default()
                        .chars()
                        .for_each(|c| self.count(c));
                    match e.error_len() {
                        None => {
                            self.carry.extend_from_slice(rest);
                            return;
                        }
                        Some(n) => {
                            self.count(char::REPLACEMENT_CHARACTER);
                            bytes = &rest[n..];
                        }
                    }
                }
            }
        }
    }

    fn count(&mut self, c: char) {
        if c.is_whitespace() {
            self.in_word = false;
        } else {
            self.chars += 1;
            if !self.in_word {
                self.words += 1;
                self.in_word = true;
            }
        }
    }
}

/// Drain `reader` in fixed-size chunks, handing each chunk to `sink`.
pub fn stream_chunks<R: Read>(mut reader: R, mut sink: impl FnMut(&[u8])) -> io::Result<()> {
    let mut buf = vec![0u8; STREAM_CHUNK];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        sink(&buf[..n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(s: &[u8]) -> u64 {
        let mut c = LineCounter::new();
        c.feed(s);
        c.finish()
    }

    #[test]
    fn counts_terminated_and_unterminated() {
        assert_eq!(count(b""), 0);
        assert_eq!(count(b"a"), 1);
        assert_eq!(count(b"a\nb\nc"), 3);
        assert_eq!(count(b"a\nb\nc\n"), 3);
        assert_eq!(count(b"\n\n"), 2);
    }

    #[test]
    fn crlf_is_one_terminator_even_across_chunks() {
        assert_eq!(count(b"a\r\nb\r\n"), 2);
        assert_eq!(count(b"a\rb\r"), 2);

        let mut c = LineCounter::new();
        c.feed(b"a\r");
        c.feed(b"\nb");
        assert_eq!(c.finish(), 2);
    }

    #[test]
    fn content_counter_words_and_chars() {
        let mut c = ContentCounter::new();
        c.feed("héllo  wor".as_bytes());
        c.feed("ld\n  foo\n".as_bytes());
        assert_eq!(
            c.finish(),
            ContentInfo {
                lines: 2,
                words: 3,
                chars: 13
            }
        );
    }

    #[test]
    fn unicode_whitespace_separates_words() {
        let mut c = ContentCounter::new();
        c.feed("a\x0bb c\u{a0}d\n".as_bytes());
        let info = c.finish();
        assert_eq!((info.lines, info.words, info.chars), (1, 4, 4));
    }

    #[test]
    fn multibyte_chars_split_across_chunks() {
        let mut c = ContentCounter::new();
        for b in "x\u{3000}y é".as_bytes() {
            c.feed(std::slice::from_ref(b));
        }
        let info = c.finish();
        assert_eq!((info.words, info.chars), (3, 3));
    }

    #[test]
    fn invalid_and_truncated_sequences_count_as_chars() {
        let mut c = ContentCounter::new();
        c.feed(&[b'a', 0xff, b' ', 0xe3, 0x80]);
        let info = c.finish();
        assert_eq!((info.words, info.chars), (2, 3));
    }

    #[test]
    fn only_newline_and_carriage_return_end_lines() {
        // vertical tab and form feed are word separators, not terminators
        assert_eq!(count(b"a\x0bb\x0cc"), 1);
        assert_eq!(count("a\u{2028}b".as_bytes()), 1);
    }

    #[test]
    fn stream_chunks_visits_everything() {
        let data = vec![b'x'; STREAM_CHUNK * 2 + 17];
        let mut total = 0;
        stream_chunks(&data[..], |c| total += c.len()).unwrap();
        assert_eq!(total, data.len());
    }
}

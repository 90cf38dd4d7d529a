//! `WordLoader`: a lazy iterator over Han code points across an ordered list
//! of UTF-8 files (spec.md §4.2).

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::vec::IntoIter as VecIntoIter;

use regex::Regex;

fn han_pattern() -> &'static Regex {
    static HAN: OnceLock<Regex> = OnceLock::new();
    HAN.get_or_init(|| Regex::new(r"\p{Han}").expect("static Han pattern is valid"))
}

/// True if `c`'s Unicode script property is Han (the reference
/// implementation's notion of a "word"; punctuation, whitespace, digits and
/// Latin letters are all excluded).
fn is_han(c: char) -> bool {
    let mut buf = [0u8; 4];
    han_pattern().is_match(c.encode_utf8(&mut buf))
}

/// Yields Han code points in file order, then line order within a file, then
/// code-point order within a line. Non-Han code points are skipped silently.
/// Per-file I/O errors are logged and that file is skipped; they do not
/// terminate the whole corpus read (corpus ingestion should tolerate one bad
/// file in an otherwise large directory tree).
pub struct WordLoader {
    pending_files: VecDeque<PathBuf>,
    current_lines: Option<Lines<BufReader<File>>>,
    current_line_chars: VecIntoIter<char>,
}

impl WordLoader {
    /// Creates a loader over the given ordered file paths. Nothing is read
    /// until the first call to `next`.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        WordLoader {
            pending_files: paths.into_iter().map(Into::into).collect(),
            current_lines: None,
            current_line_chars: Vec::new().into_iter(),
        }
    }

    fn advance_to_next_file(&mut self) -> bool {
        while let Some(path) = self.pending_files.pop_front() {
            match File::open(&path) {
                Ok(file) => {
                    self.current_lines = Some(BufReader::new(file).lines());
                    return true;
                }
                Err(e) => {
                    log::warn!("skipping corpus file {}: {}", path.display(), e);
                    continue;
                }
            }
        }
        self.current_lines = None;
        false
    }

    fn advance_to_next_line(&mut self) -> bool {
        loop {
            let Some(lines) = self.current_lines.as_mut() else {
                if !self.advance_to_next_file() {
                    return false;
                }
                continue;
            };

            match lines.next() {
                Some(Ok(line)) => {
                    self.current_line_chars = line.chars().collect::<Vec<_>>().into_iter();
                    return true;
                }
                Some(Err(e)) => {
                    log::warn!("skipping unreadable line: {e}");
                    continue;
                }
                None => {
                    if !self.advance_to_next_file() {
                        return false;
                    }
                }
            }
        }
    }
}

impl Iterator for WordLoader {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        loop {
            if let Some(c) = self.current_line_chars.next() {
                if is_han(c) {
                    return Some(c);
                }
                continue;
            }
            if !self.advance_to_next_line() {
                return None;
            }
        }
    }
}

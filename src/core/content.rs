//! Chunked, cancellable substring search inside regular files.

use super::cancel::CancelToken;
use super::error::Result;
use regex::bytes::{Regex, RegexBuilder};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Size of a single read when scanning file contents.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// A compiled, case-insensitive literal needle.
///
/// Compiled once per search and shared by every file the walk visits.
#[derive(Debug, Clone)]
pub struct ContentNeedle {
    text: String,
    regex: Regex,
    overlap: usize,
}

impl ContentNeedle {
    /// Compiles `text` into a case-insensitive literal matcher.
    ///
    /// Returns `Ok(None)` for an empty needle: the caller then searches by name only.
    pub fn new(text: &str) -> Result<Option<Self>> {
        if text.is_empty() {
            return Ok(None);
        }
        let regex = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .unicode(true)
            .build()?;

        // Case folding can change the UTF-8 length of a character, so keep a
        // generous tail of the previous chunk around for boundary matches.
        let overlap = text.len().saturating_mul(3);

        Ok(Some(Self {
            text: text.to_string(),
            regex,
            overlap,
        }))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    fn is_match(&self, haystack: &[u8]) -> bool {
        self.regex.is_match(haystack)
    }
}

/// Scans the file at `path` for `needle`.
///
/// Files that cannot be opened or read are treated as non-matching.
pub fn scan_file(path: &Path, needle: &ContentNeedle, cancel: &CancelToken, chunk_size: usize) -> bool {
    match File::open(path) {
        Ok(file) => scan_reader(file, needle, cancel, chunk_size),
        Err(e) => {
            tracing::debug!("Skipping content scan of {}: {}", path.display(), e);
            false
        }
    }
}

/// Reads `reader` in chunks of `chunk_size` bytes and stops at the first chunk
/// containing `needle`.
///
/// The cancel token is consulted before every read; a cancelled scan reports
/// no match.
pub fn scan_reader<R: Read>(
    mut reader: R,
    needle: &ContentNeedle,
    cancel: &CancelToken,
    chunk_size: usize,
) -> bool {
    let chunk_size = chunk_size.max(1);
    let mut chunk = vec![0u8; chunk_size];
    // Tail of the previous chunk followed by the current chunk.
    let mut window: Vec<u8> = Vec::with_capacity(needle.overlap + chunk_size);

    loop {
        if cancel.is_cancelled() {
            return false;
        }

        let read = match reader.read(&mut chunk) {
            Ok(0) => return false,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!("Content scan aborted by read error: {}", e);
                return false;
            }
        };

        window.extend_from_slice(&chunk[..read]);
        if needle.is_match(&window) {
            return true;
        }

        let keep = needle.overlap.min(window.len());
        window.drain(..window.len() - keep);
    }
}

//! Depth-first traversal producing a lazy stream of [`WalkEvent`]s.

use super::cancel::CancelToken;
use super::content::{scan_file, ContentNeedle, DEFAULT_CHUNK_SIZE};
use super::matcher::PathMatcher;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Traversal options taken from the settings at worker construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirFilterConfig {
    /// Descend into directories whose name starts with `.`.
    pub include_hidden: bool,
    /// Descend into symlinked directories.
    pub follow_symlinks: bool,
}

/// A single step of the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    EnteredDirectory(PathBuf),
    Matched(PathBuf),
    /// Terminal event of a walk that was not cancelled.
    Done,
}

/// Walks everything below a root directory and reports matches.
///
/// Entries are visited in depth-first pre-order with siblings sorted by file
/// name. The root itself is never reported. The walker is consumed by
/// iteration and yields `Done` exactly once, unless it is cancelled, in which
/// case it simply stops.
pub struct TreeWalker {
    entries: Option<walkdir::IntoIter>,
    matcher: PathMatcher,
    needle: Option<ContentNeedle>,
    filter: DirFilterConfig,
    cancel: CancelToken,
    chunk_size: usize,
    queued_match: Option<PathBuf>,
    finished: bool,
}

impl TreeWalker {
    pub fn new(
        root: &Path,
        matcher: PathMatcher,
        needle: Option<ContentNeedle>,
        filter: DirFilterConfig,
        cancel: CancelToken,
    ) -> Self {
        let entries = if root.is_dir() {
            Some(
                WalkDir::new(root)
                    .min_depth(1)
                    .follow_links(filter.follow_symlinks)
                    .sort_by_file_name()
                    .into_iter(),
            )
        } else {
            tracing::debug!("Search root {} is not a directory", root.display());
            None
        };

        Self {
            entries,
            matcher,
            needle,
            filter,
            cancel,
            chunk_size: DEFAULT_CHUNK_SIZE,
            queued_match: None,
            finished: false,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    fn finish(&mut self) -> Option<WalkEvent> {
        self.finished = true;
        self.entries = None;
        Some(WalkEvent::Done)
    }
}

impl Iterator for TreeWalker {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        if self.finished {
            return None;
        }

        loop {
            if self.cancel.is_cancelled() {
                self.finished = true;
                self.entries = None;
                self.queued_match = None;
                return None;
            }
            if let Some(path) = self.queued_match.take() {
                return Some(WalkEvent::Matched(path));
            }

            let Some(entries) = self.entries.as_mut() else {
                return self.finish();
            };

            let entry = match entries.next() {
                None => return self.finish(),
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy();
            let file_type = entry.file_type();

            if file_type.is_dir() {
                if !self.filter.include_hidden && name.starts_with('.') {
                    tracing::debug!("Excluding hidden directory {}", entry.path().display());
                    entries.skip_current_dir();
                    continue;
                }
                if self.matcher.matches(&name) {
                    self.queued_match = Some(entry.path().to_path_buf());
                }
                return Some(WalkEvent::EnteredDirectory(entry.path().to_path_buf()));
            }

            if !self.matcher.matches(&name) {
                continue;
            }

            match &self.needle {
                Some(needle) if file_type.is_file() => {
                    if scan_file(entry.path(), needle, &self.cancel, self.chunk_size) {
                        return Some(WalkEvent::Matched(entry.path().to_path_buf()));
                    }
                }
                _ => return Some(WalkEvent::Matched(entry.path().to_path_buf())),
            }
        }
    }
}

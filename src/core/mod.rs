pub mod cancel;
pub mod content;
pub mod error;
pub mod matcher;
pub mod results;
pub mod walker;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to search for and where. Immutable once a search has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub root_path: PathBuf,
    /// Wildcard pattern for entry names; `*` matches any run of characters.
    pub name_pattern: String,
    /// Case-insensitive text that matching regular files must contain.
    pub content_substring: Option<String>,
}

impl SearchRequest {
    pub fn new(root_path: impl Into<PathBuf>, name_pattern: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            name_pattern: name_pattern.into(),
            content_substring: None,
        }
    }

    /// Requires matching files to contain `text`. An empty string means no content filter.
    pub fn with_content(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.content_substring = (!text.is_empty()).then_some(text);
        self
    }
}

pub use cancel::CancelToken;
pub use content::{scan_file, scan_reader, ContentNeedle, DEFAULT_CHUNK_SIZE};
pub use error::SearchError;
pub use matcher::PathMatcher;
pub use results::{ResultBuffer, DEFAULT_THROTTLE_INTERVAL};
pub use walker::{DirFilterConfig, TreeWalker, WalkEvent};

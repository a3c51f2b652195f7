//! Defines the events sent from a running search to its consumer.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Notifications delivered through an [`EventProxy`](super::proxy::EventProxy).
///
/// Events of one search arrive in the order the worker observed them. Matches
/// are not sent as events; they are published through the `ResultBuffer`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SearchEvent {
    /// The worker accepted the request and is about to start walking.
    Started { search_id: u64, root: PathBuf },
    /// The walk entered `folder`.
    Progress { search_id: u64, folder: PathBuf },
    /// The walk finished and all results have been committed.
    Complete {
        search_id: u64,
        summary: SearchSummary,
    },
    /// The search was cancelled. Sent by `cancel()` after the worker thread has stopped.
    Cancelled { search_id: u64 },
}

impl SearchEvent {
    pub fn search_id(&self) -> u64 {
        match self {
            SearchEvent::Started { search_id, .. }
            | SearchEvent::Progress { search_id, .. }
            | SearchEvent::Complete { search_id, .. }
            | SearchEvent::Cancelled { search_id } => *search_id,
        }
    }

    /// `true` for `Complete` and `Cancelled`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SearchEvent::Complete { .. } | SearchEvent::Cancelled { .. }
        )
    }
}

/// Totals reported with [`SearchEvent::Complete`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSummary {
    pub match_count: usize,
    pub directories_visited: usize,
    pub elapsed: Duration,
}

impl fmt::Display for SearchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Search complete, {} items found", self.match_count)
    }
}

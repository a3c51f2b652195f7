//! Runs a single search on a dedicated background thread.

use super::events::{SearchEvent, SearchSummary};
use super::proxy::EventProxy;
use crate::core::{
    CancelToken, ContentNeedle, DirFilterConfig, PathMatcher, ResultBuffer, SearchError,
    SearchRequest, TreeWalker, WalkEvent, DEFAULT_CHUNK_SIZE,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Instant;

static SEARCH_ID: AtomicU64 = AtomicU64::new(1);

fn next_search_id() -> u64 {
    SEARCH_ID.fetch_add(1, Ordering::Relaxed)
}

/// Lifecycle of a [`SearchWorker`]. A worker never leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Owns one walk: its thread, its cancel token and its state.
///
/// Matches go into the shared `ResultBuffer`; progress and completion go to
/// the proxy. A worker runs at most one search.
pub struct SearchWorker<P: EventProxy> {
    id: u64,
    filter: DirFilterConfig,
    chunk_size: usize,
    results: Arc<ResultBuffer>,
    proxy: P,
    cancel: CancelToken,
    state: Arc<Mutex<WorkerState>>,
    handle: Option<JoinHandle<()>>,
}

fn lock_state(state: &Mutex<WorkerState>) -> MutexGuard<'_, WorkerState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<P: EventProxy> SearchWorker<P> {
    pub fn new(filter: DirFilterConfig, results: Arc<ResultBuffer>, proxy: P) -> Self {
        Self {
            id: next_search_id(),
            filter,
            chunk_size: DEFAULT_CHUNK_SIZE,
            results,
            proxy,
            cancel: CancelToken::new(),
            state: Arc::new(Mutex::new(WorkerState::Idle)),
            handle: None,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn search_id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        *lock_state(&self.state)
    }

    /// Starts walking `request.root_path` in the background.
    ///
    /// Only valid on an idle worker. Returns the search id tagged on every event.
    pub fn start(&mut self, request: SearchRequest) -> Result<u64, SearchError> {
        match self.state() {
            WorkerState::Idle => {}
            WorkerState::Running => return Err(SearchError::AlreadyInProgress),
            WorkerState::Completed | WorkerState::Cancelled => {
                return Err(SearchError::WorkerFinished)
            }
        }

        let needle = ContentNeedle::new(request.content_substring.as_deref().unwrap_or(""))?;
        let walker = TreeWalker::new(
            &request.root_path,
            PathMatcher::compile(&request.name_pattern),
            needle,
            self.filter,
            self.cancel.clone(),
        )
        .with_chunk_size(self.chunk_size);

        tracing::info!(
            search_id = self.id,
            "Search started; where: {}, name: {:?}, content: {:?}",
            request.root_path.display(),
            request.name_pattern,
            request.content_substring
        );

        *lock_state(&self.state) = WorkerState::Running;

        let context = WalkContext {
            id: self.id,
            root: request.root_path,
            results: self.results.clone(),
            proxy: self.proxy.clone(),
            state: self.state.clone(),
        };
        let spawned = std::thread::Builder::new()
            .name(format!("search-{}", self.id))
            .spawn(move || context.run(walker));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(self.id)
            }
            Err(e) => {
                *lock_state(&self.state) = WorkerState::Idle;
                Err(SearchError::Spawn(e))
            }
        }
    }

    /// Stops a running search and waits for its thread to exit.
    ///
    /// When this returns, the worker no longer touches the result buffer or
    /// sends progress. Does nothing unless the worker is running.
    pub fn cancel(&mut self) {
        let running = self.state() == WorkerState::Running;
        if running {
            self.cancel.cancel();
        }

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(search_id = self.id, "Search thread panicked");
            }
        }

        if !running {
            return;
        }

        let mut state = lock_state(&self.state);
        if *state == WorkerState::Running {
            *state = WorkerState::Cancelled;
            drop(state);
            tracing::info!(search_id = self.id, "Search canceled");
            self.proxy
                .send_event(SearchEvent::Cancelled { search_id: self.id });
        }
    }

    /// Blocks until the search has finished on its own.
    pub fn wait(&mut self) -> WorkerState {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(search_id = self.id, "Search thread panicked");
            }
        }
        self.state()
    }
}

impl<P: EventProxy> Drop for SearchWorker<P> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Everything the background thread needs.
struct WalkContext<P: EventProxy> {
    id: u64,
    root: PathBuf,
    results: Arc<ResultBuffer>,
    proxy: P,
    state: Arc<Mutex<WorkerState>>,
}

impl<P: EventProxy> WalkContext<P> {
    fn run(self, walker: TreeWalker) {
        let started = Instant::now();
        let mut match_count = 0usize;
        let mut directories_visited = 0usize;
        self.proxy.send_event(SearchEvent::Started {
            search_id: self.id,
            root: self.root.clone(),
        });

        for event in walker {
            match event {
                WalkEvent::EnteredDirectory(folder) => {
                    directories_visited += 1;
                    self.proxy.send_event(SearchEvent::Progress {
                        search_id: self.id,
                        folder,
                    });
                }
                WalkEvent::Matched(path) => {
                    match_count += 1;
                    self.results.push(path);
                }
                WalkEvent::Done => {
                    self.results.flush_pending();
                    let summary = SearchSummary {
                        match_count,
                        directories_visited,
                        elapsed: started.elapsed(),
                    };
                    *lock_state(&self.state) = WorkerState::Completed;
                    tracing::info!(
                        search_id = self.id,
                        "search complete, found {} items in {:?}",
                        match_count,
                        summary.elapsed
                    );
                    self.proxy.send_event(SearchEvent::Complete {
                        search_id: self.id,
                        summary,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::sync::{mpsc, Barrier};
    use std::time::Duration;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn request(root: &Path, pattern: &str, content: Option<&str>) -> SearchRequest {
        SearchRequest {
            root_path: root.to_path_buf(),
            name_pattern: pattern.to_string(),
            content_substring: content.map(str::to_string),
        }
    }

    fn collect_until_terminal(rx: &mpsc::Receiver<SearchEvent>) -> Vec<SearchEvent> {
        let mut events = Vec::new();
        loop {
            let event = rx
                .recv_timeout(Duration::from_secs(10))
                .expect("search did not finish in time");
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                return events;
            }
        }
    }

    #[test]
    fn test_completed_search_reports_progress_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "a/report.txt", "");
        write(root, "b/report.csv", "");

        let results = Arc::new(ResultBuffer::new(Duration::from_secs(3600)));
        let (tx, rx) = mpsc::channel::<SearchEvent>();
        let mut worker = SearchWorker::new(DirFilterConfig::default(), results.clone(), tx);
        let id = worker.start(request(root, "report.*", None)).unwrap();

        let events = collect_until_terminal(&rx);
        assert_eq!(worker.wait(), WorkerState::Completed);

        assert_eq!(
            events[0],
            SearchEvent::Started {
                search_id: id,
                root: root.to_path_buf()
            }
        );
        assert_eq!(
            events[1],
            SearchEvent::Progress {
                search_id: id,
                folder: root.join("a")
            }
        );
        assert_eq!(
            events[2],
            SearchEvent::Progress {
                search_id: id,
                folder: root.join("b")
            }
        );
        match &events[3] {
            SearchEvent::Complete { search_id, summary } => {
                assert_eq!(*search_id, id);
                assert_eq!(summary.match_count, 2);
                assert_eq!(summary.directories_visited, 2);
            }
            other => panic!("unexpected event {other:?}"),
        }
        // Everything is committed by the time completion is reported.
        assert_eq!(
            results.snapshot(),
            vec![root.join("a/report.txt"), root.join("b/report.csv")]
        );
        assert_eq!(results.pending_len(), 0);
    }

    #[test]
    fn test_empty_tree_still_completes() {
        let dir = tempfile::tempdir().unwrap();
        let results = Arc::new(ResultBuffer::default());
        let (tx, rx) = mpsc::channel::<SearchEvent>();
        let mut worker = SearchWorker::new(DirFilterConfig::default(), results.clone(), tx);
        worker.start(request(dir.path(), "*.nothing", None)).unwrap();

        let events = collect_until_terminal(&rx);
        match events.last() {
            Some(SearchEvent::Complete { summary, .. }) => {
                assert_eq!(summary.match_count, 0);
                assert_eq!(summary.to_string(), "Search complete, 0 items found");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(results.is_empty());
    }

    #[test]
    fn test_start_is_rejected_after_finish() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..50 {
            write(dir.path(), &format!("d{i}/f.txt"), "");
        }
        let (tx, rx) = mpsc::channel::<SearchEvent>();
        let mut worker =
            SearchWorker::new(DirFilterConfig::default(), Arc::new(ResultBuffer::default()), tx);
        worker.start(request(dir.path(), "*", None)).unwrap();

        match worker.start(request(dir.path(), "*", None)) {
            Err(SearchError::AlreadyInProgress) | Err(SearchError::WorkerFinished) => {}
            other => panic!("unexpected result {other:?}"),
        }

        collect_until_terminal(&rx);
        worker.wait();
        assert!(matches!(
            worker.start(request(dir.path(), "*", None)),
            Err(SearchError::WorkerFinished)
        ));
    }

    #[test]
    fn test_start_while_running_is_already_in_progress() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/f.txt", "");

        // Holds the search thread inside `Started` until the test releases it.
        let gate = Arc::new(Barrier::new(2));
        let (tx, rx) = mpsc::channel::<SearchEvent>();
        let proxy = {
            let gate = gate.clone();
            move |event: SearchEvent| {
                if matches!(event, SearchEvent::Started { .. }) {
                    gate.wait();
                }
                let _ = tx.send(event);
            }
        };
        let mut worker =
            SearchWorker::new(DirFilterConfig::default(), Arc::new(ResultBuffer::default()), proxy);
        worker.start(request(dir.path(), "*", None)).unwrap();

        assert_eq!(worker.state(), WorkerState::Running);
        assert!(matches!(
            worker.start(request(dir.path(), "*", None)),
            Err(SearchError::AlreadyInProgress)
        ));
        assert_eq!(worker.state(), WorkerState::Running);

        gate.wait();
        collect_until_terminal(&rx);
        assert_eq!(worker.wait(), WorkerState::Completed);
    }

    #[test]
    fn test_cancel_before_start_is_noop() {
        let (tx, rx) = mpsc::channel::<SearchEvent>();
        let mut worker =
            SearchWorker::new(DirFilterConfig::default(), Arc::new(ResultBuffer::default()), tx);
        worker.cancel();
        assert_eq!(worker.state(), WorkerState::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_cancel_mid_walk_stops_all_output() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..200 {
            write(dir.path(), &format!("dir{i:03}/sub/file{i}.txt"), "x");
        }
        let results = Arc::new(ResultBuffer::new(Duration::ZERO));
        let (tx, rx) = mpsc::channel::<SearchEvent>();
        let mut worker = SearchWorker::new(DirFilterConfig::default(), results.clone(), tx);
        let id = worker.start(request(dir.path(), "*.txt", None)).unwrap();

        // Wait until the walk is visibly under way.
        loop {
            let event = rx.recv_timeout(Duration::from_secs(10)).unwrap();
            if matches!(event, SearchEvent::Progress { .. }) {
                break;
            }
        }
        worker.cancel();
        let state_after_cancel = worker.state();
        let committed = results.len();
        let pending = results.pending_len();

        let drained: Vec<_> = rx.try_iter().collect();
        std::thread::sleep(Duration::from_millis(100));
        assert!(rx.try_recv().is_err(), "no events may follow cancel()");
        assert_eq!(results.len(), committed);
        assert_eq!(results.pending_len(), pending);

        if state_after_cancel == WorkerState::Cancelled {
            assert_eq!(drained.last(), Some(&SearchEvent::Cancelled { search_id: id }));
        } else {
            // The walk won the race and finished before the flag was observed.
            assert_eq!(state_after_cancel, WorkerState::Completed);
        }
    }

    #[test]
    fn test_dropping_a_running_worker_cancels_it() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..100 {
            write(dir.path(), &format!("d{i}/f.txt"), "");
        }
        let results = Arc::new(ResultBuffer::new(Duration::ZERO));
        let (tx, rx) = mpsc::channel::<SearchEvent>();
        {
            let mut worker = SearchWorker::new(DirFilterConfig::default(), results.clone(), tx);
            worker.start(request(dir.path(), "*", None)).unwrap();
        }
        let events: Vec<_> = rx.try_iter().collect();
        assert!(events.last().is_some_and(SearchEvent::is_terminal));
    }
}

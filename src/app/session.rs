//! Defines the consumer-facing owner of a search and its results.

use super::proxy::EventProxy;
use super::worker::{SearchWorker, WorkerState};
use crate::config::SearchConfig;
use crate::core::{ResultBuffer, SearchError, SearchRequest};
use std::sync::Arc;

/// One logical search session, e.g. one open "find in files" dialog.
///
/// The session owns the result buffer the consumer reads from. Starting a new
/// search cancels and joins the previous worker and clears the buffer first,
/// so two walks never write into the same buffer.
pub struct SearchSession<P: EventProxy> {
    config: SearchConfig,
    results: Arc<ResultBuffer>,
    proxy: P,
    worker: Option<SearchWorker<P>>,
}

impl<P: EventProxy> SearchSession<P> {
    /// Creates a session. `config` is read here and used for every search of
    /// the session.
    pub fn new(config: SearchConfig, proxy: P) -> Self {
        let results = Arc::new(ResultBuffer::new(config.throttle_interval()));
        Self {
            config,
            results,
            proxy,
            worker: None,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The buffer matches are committed to. Stays the same for the whole session.
    pub fn results(&self) -> &Arc<ResultBuffer> {
        &self.results
    }

    /// State of the current worker, `Idle` before the first search.
    pub fn state(&self) -> WorkerState {
        self.worker
            .as_ref()
            .map_or(WorkerState::Idle, SearchWorker::state)
    }

    /// Id of the most recently started search.
    pub fn current_search_id(&self) -> Option<u64> {
        self.worker.as_ref().map(SearchWorker::search_id)
    }

    /// Starts a new search, replacing any previous one.
    pub fn start_search(&mut self, request: SearchRequest) -> Result<u64, SearchError> {
        self.cancel_current_search();
        self.results.clear();

        let mut worker = SearchWorker::new(
            self.config.dir_filter(),
            self.results.clone(),
            self.proxy.clone(),
        )
        .with_chunk_size(self.config.content_chunk_size);
        let search_id = worker.start(request)?;
        self.worker = Some(worker);
        Ok(search_id)
    }

    /// Cancels the running search, if any, and waits for it to stop.
    pub fn cancel_current_search(&mut self) {
        if let Some(worker) = self.worker.as_mut() {
            tracing::debug!(search_id = worker.search_id(), "Cancelling current search");
            worker.cancel();
        }
    }

    /// Blocks until the current search finishes on its own.
    pub fn wait(&mut self) -> WorkerState {
        self.worker
            .as_mut()
            .map_or(WorkerState::Idle, SearchWorker::wait)
    }
}

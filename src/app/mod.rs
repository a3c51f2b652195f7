//! Search lifecycle: background workers, sessions and the events they emit.

pub mod events;
pub mod proxy;
pub mod session;
pub mod worker;

pub use events::{SearchEvent, SearchSummary};
pub use proxy::EventProxy;
pub use session::SearchSession;
pub use worker::{SearchWorker, WorkerState};

//! Defines an abstraction over the event sending mechanism.

use super::events::SearchEvent;

/// A trait that abstracts the sending of search events.
/// This is "fire-and-forget" and doesn't return a result, simplifying its use.
///
/// `send_event` is called from the search thread for `Started`, `Progress`
/// and `Complete`, and from the cancelling thread for `Cancelled`.
pub trait EventProxy: Send + Sync + Clone + 'static {
    fn send_event(&self, event: SearchEvent);
}

/// Async consumers receive events through a tokio channel.
impl EventProxy for tokio::sync::mpsc::UnboundedSender<SearchEvent> {
    fn send_event(&self, event: SearchEvent) {
        // A dropped receiver means nobody is listening anymore; the search
        // itself keeps going until it is cancelled.
        if let Err(e) = self.send(event) {
            tracing::warn!("Failed to deliver search event: {}", e);
        }
    }
}

/// Blocking consumers can use a plain std channel.
impl EventProxy for std::sync::mpsc::Sender<SearchEvent> {
    fn send_event(&self, event: SearchEvent) {
        if let Err(e) = self.send(event) {
            tracing::warn!("Failed to deliver search event: {}", e);
        }
    }
}

/// Any shareable closure works as a proxy, e.g. one that forwards into a UI queue.
impl<F> EventProxy for F
where
    F: Fn(SearchEvent) + Send + Sync + Clone + 'static,
{
    fn send_event(&self, event: SearchEvent) {
        self(event)
    }
}

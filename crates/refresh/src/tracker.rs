use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::request::PendingRequest;
use crate::transport::{Transport, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response belonged to the latest request and its callback ran.
    Applied,
    /// A newer request was issued meanwhile; the response was dropped.
    Superseded,
    /// Transport failure. Swallowed: the page stays in its last good state.
    Failed(TransportError),
}

/// Last-write-wins gate for partial refreshes.
///
/// Ordering contract:
/// - `issue` makes its URL the current one immediately.
/// - A response is applied only if its URL is still the current one when it
///   arrives; anything else is discarded without callback, error or retry.
/// - No request is ever aborted; cancellation is only result-discarding.
///
/// Clones share state, so every submission path can hold its own handle.
#[derive(Debug, Clone, Default)]
pub struct PendingRequestTracker {
    current: Rc<RefCell<Option<PendingRequest>>>,
}

impl PendingRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<PendingRequest> {
        self.current.borrow().clone()
    }

    pub fn is_current(&self, url: &str) -> bool {
        self.current.borrow().as_ref().is_some_and(|r| r.is(url))
    }

    /// Records `url` as current, starts the fetch, and returns a future that
    /// resolves once the response has been applied or discarded.
    pub fn issue<T, F>(
        &self,
        transport: &T,
        url: impl Into<String>,
        on_success: F,
    ) -> LocalBoxFuture<'static, RefreshOutcome>
    where
        T: Transport + ?Sized,
        F: FnOnce(String) + 'static,
    {
        let url = url.into();
        tracing::info!(%url, "partial refresh issued");
        *self.current.borrow_mut() = Some(PendingRequest::new(url.clone()));

        let fetch = transport.get(&url);
        let tracker = self.clone();
        Box::pin(async move {
            match fetch.await {
                Ok(body) => {
                    // Borrow released before the callback: it may issue again.
                    if !tracker.is_current(&url) {
                        tracing::debug!(%url, "superseded response dropped");
                        return RefreshOutcome::Superseded;
                    }
                    on_success(body);
                    RefreshOutcome::Applied
                }
                Err(err) => {
                    tracing::warn!(%url, "partial refresh failed: {err}");
                    RefreshOutcome::Failed(err)
                }
            }
        })
    }
}

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Network(String),
    Status { code: u16 },
    /// The transport went away before answering.
    Dropped,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "network error: {msg}"),
            TransportError::Status { code } => write!(f, "unexpected HTTP status {code}"),
            TransportError::Dropped => write!(f, "request dropped before completion"),
        }
    }
}

impl std::error::Error for TransportError {}

pub type FetchFuture = LocalBoxFuture<'static, Result<String, TransportError>>;

/// Fetches a partial-refresh fragment.
///
/// The request must be started when `get` is called, not when the returned
/// future is first polled; the tracker relies on call order.
pub trait Transport {
    fn get(&self, url: &str) -> FetchFuture;
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn get(&self, url: &str) -> FetchFuture {
        (**self).get(url)
    }
}

struct PendingFetch {
    url: String,
    reply: oneshot::Sender<Result<String, TransportError>>,
}

#[derive(Default)]
struct ManualState {
    requested: Vec<String>,
    pending: Vec<PendingFetch>,
}

/// In-memory transport whose responses are released by hand, in any order.
///
/// Cloning shares the same pending set, so a test can keep one handle while
/// the code under test owns another.
#[derive(Clone, Default)]
pub struct ManualTransport {
    state: Rc<RefCell<ManualState>>,
}

impl ManualTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every URL requested so far, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.state.borrow().requested.clone()
    }

    pub fn pending_len(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Answers the oldest outstanding request for `url`.
    ///
    /// Returns `false` if no such request is outstanding.
    pub fn respond(&self, url: &str, body: impl Into<String>) -> bool {
        self.complete(url, Ok(body.into()))
    }

    pub fn fail(&self, url: &str, err: TransportError) -> bool {
        self.complete(url, Err(err))
    }

    fn complete(&self, url: &str, result: Result<String, TransportError>) -> bool {
        let fetch = {
            let mut s = self.state.borrow_mut();
            let Some(i) = s.pending.iter().position(|p| p.url == url) else {
                return false;
            };
            s.pending.remove(i)
        };
        // The receiver may already be gone; that is the caller's business.
        let _ = fetch.reply.send(result);
        true
    }
}

impl Transport for ManualTransport {
    fn get(&self, url: &str) -> FetchFuture {
        let (tx, rx) = oneshot::channel();
        {
            let mut s = self.state.borrow_mut();
            s.requested.push(url.to_string());
            s.pending.push(PendingFetch {
                url: url.to_string(),
                reply: tx,
            });
        }
        Box::pin(async move {
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Dropped),
            }
        })
    }
}

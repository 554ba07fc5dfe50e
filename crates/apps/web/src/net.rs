use futures::FutureExt;
use futures::channel::oneshot;
use gloo_net::http::Request;
use refresh::{FetchFuture, Transport, TransportError};
use results::{Analytics, AnalyticsEvent};
use wasm_bindgen_futures::spawn_local;

use crate::markup::analytics_url;

/// `fetch`-backed transport for partial refreshes. The request starts as
/// soon as `get` is called.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooTransport;

impl Transport for GlooTransport {
    fn get(&self, url: &str) -> FetchFuture {
        let url = url.to_string();
        let (tx, rx) = oneshot::channel();
        spawn_local(async move {
            let _ = tx.send(fetch_text(&url).await);
        });
        rx.map(|reply| reply.unwrap_or(Err(TransportError::Dropped)))
            .boxed_local()
    }
}

async fn fetch_text(url: &str) -> Result<String, TransportError> {
    let resp = Request::get(url)
        .header("X-Requested-With", "XMLHttpRequest")
        .send()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;
    if !resp.ok() {
        return Err(TransportError::Status {
            code: resp.status(),
        });
    }
    resp.text()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))
}

/// Posts analytics events to the site's own event endpoint.
///
/// Fire-and-forget: failures are logged at debug level and otherwise
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct BeaconAnalytics {
    csrf_token: String,
    query: String,
}

impl BeaconAnalytics {
    pub fn new(csrf_token: impl Into<String>) -> Self {
        Self {
            csrf_token: csrf_token.into(),
            query: String::new(),
        }
    }

    /// The serialized search the next events are attributed to.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }
}

impl Analytics for BeaconAnalytics {
    fn record(&mut self, event: AnalyticsEvent) {
        let url = analytics_url(&event, &self.query, &self.csrf_token);
        spawn_local(async move {
            match Request::post(&url).send().await {
                Ok(resp) if resp.ok() => {}
                Ok(resp) => tracing::debug!(%url, status = resp.status(), "analytics rejected"),
                Err(err) => tracing::debug!(%url, "analytics not sent: {err}"),
            }
        });
    }
}

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use refresh::{PendingRequestTracker, RefreshOutcome, Transport};
use runtime::{PageEvent, SharedBus, SharedPage};

use crate::form::Submission;

/// Carries a [`Submission`] out to the page.
///
/// Synchronous submissions navigate. Asynchronous ones go through the
/// tracker; the latest response replaces the content region, updates the
/// address bar to the equivalent synchronous URL and re-emits
/// [`PageEvent::Ready`] so page behaviors bind against the new markup.
pub struct PartialRefresh<T: Transport + ?Sized> {
    tracker: PendingRequestTracker,
    transport: Rc<T>,
    page: SharedPage,
    bus: SharedBus,
}

impl<T: Transport + ?Sized> PartialRefresh<T> {
    pub fn new(
        tracker: PendingRequestTracker,
        transport: Rc<T>,
        page: SharedPage,
        bus: SharedBus,
    ) -> Self {
        Self {
            tracker,
            transport,
            page,
            bus,
        }
    }

    pub fn tracker(&self) -> &PendingRequestTracker {
        &self.tracker
    }

    /// Returns the refresh future for asynchronous submissions; the caller
    /// spawns it. Navigation happens immediately and returns `None`.
    pub fn dispatch(
        &self,
        submission: Submission,
    ) -> Option<LocalBoxFuture<'static, RefreshOutcome>> {
        match submission {
            Submission::Navigate { url } => {
                tracing::info!(%url, "navigating");
                self.page.borrow_mut().navigate(&url);
                None
            }
            Submission::Refresh { url } => {
                let page = self.page.clone();
                let bus = self.bus.clone();
                let applied_url = url.clone();
                Some(self.tracker.issue(&*self.transport, url, move |html| {
                    {
                        let mut page = page.borrow_mut();
                        page.replace_content(&html);
                        page.push_history(&applied_url);
                    }
                    let mut bus = bus.borrow_mut();
                    bus.emit(PageEvent::ContentReplaced { url: applied_url });
                    bus.emit(PageEvent::Ready);
                }))
            }
        }
    }
}

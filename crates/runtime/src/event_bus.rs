use std::cell::RefCell;
use std::rc::Rc;

/// Page lifecycle events.
///
/// `Ready` is re-emitted after every partial refresh so page behaviors bind
/// against the freshly spliced markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Ready,
    ContentReplaced { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub seq: u64,
    pub kind: PageEvent,
}

#[derive(Debug, Default)]
pub struct EventBus {
    next_seq: u64,
    events: Vec<Event>,
}

pub type SharedBus = Rc<RefCell<EventBus>>;

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedBus {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn emit(&mut self, kind: PageEvent) {
        tracing::debug!(seq = self.next_seq, ?kind, "page event");
        self.events.push(Event {
            seq: self.next_seq,
            kind,
        });
        self.next_seq = self.next_seq.wrapping_add(1);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Drains pending events and reports whether a `Ready` was among them.
    pub fn take_ready(&mut self) -> bool {
        self.drain().iter().any(|e| e.kind == PageEvent::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, PageEvent};

    #[test]
    fn records_events_in_sequence() {
        let mut bus = EventBus::new();
        bus.emit(PageEvent::ContentReplaced {
            url: "/entreprises?j=a".to_string(),
        });
        bus.emit(PageEvent::Ready);
        assert_eq!(bus.events().len(), 2);
        assert_eq!(bus.events()[0].seq, 0);
        assert_eq!(bus.events()[1].seq, 1);
        assert_eq!(bus.events()[1].kind, PageEvent::Ready);
    }

    #[test]
    fn drain_clears_events() {
        let mut bus = EventBus::new();
        bus.emit(PageEvent::Ready);
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.events().is_empty());
    }

    #[test]
    fn take_ready_consumes_the_queue() {
        let mut bus = EventBus::new();
        bus.emit(PageEvent::Ready);
        assert!(bus.take_ready());
        assert!(!bus.take_ready());
    }
}

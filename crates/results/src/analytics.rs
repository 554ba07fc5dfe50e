/// A fire-and-forget analytics event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsEvent {
    pub category: String,
    pub action: String,
    pub label: String,
}

impl AnalyticsEvent {
    pub fn new(
        category: impl Into<String>,
        action: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
            label: label.into(),
        }
    }

    /// A result row was opened.
    pub fn detail_viewed(siret: &foundation::Siret) -> Self {
        Self::new("results", "toggle-details", siret.as_str())
    }
}

/// Analytics sink. Implementations must not fail loudly: delivery is best
/// effort and never affects the page.
pub trait Analytics {
    fn record(&mut self, event: AnalyticsEvent);
}

/// Keeps every event in memory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingAnalytics {
    pub events: Vec<AnalyticsEvent>,
}

impl Analytics for RecordingAnalytics {
    fn record(&mut self, event: AnalyticsEvent) {
        self.events.push(event);
    }
}


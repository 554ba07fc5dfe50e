use std::collections::{BTreeMap, BTreeSet};

use foundation::Siret;
use runtime::PageHost;

use crate::analytics::{Analytics, AnalyticsEvent};
use crate::company::Company;
use crate::map::{MapEngine, MapHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Expanded {
        /// The row that was open before, if any.
        collapsed: Option<Siret>,
        map_created: bool,
    },
    Collapsed(Siret),
    /// `activate` on the row that is already open.
    AlreadyExpanded,
}

/// Expands and collapses result rows, each with its own small map.
///
/// The row is opened on the page before its map is built: the map engine
/// measures its container, which has no size while the row is closed.
/// A row's map is built the first time it is expanded and then kept for the
/// rest of the page session. The construction is attempted once: a failed
/// attempt still marks the row as initialized.
pub struct ResultDetailToggle {
    zoom: f64,
    expanded: Option<Siret>,
    initialized: BTreeSet<Siret>,
    maps: BTreeMap<Siret, Box<dyn MapHandle>>,
}

impl ResultDetailToggle {
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            expanded: None,
            initialized: BTreeSet::new(),
            maps: BTreeMap::new(),
        }
    }

    pub fn container_id(siret: &Siret) -> String {
        format!("company-map-{siret}")
    }

    pub fn expanded(&self) -> Option<&Siret> {
        self.expanded.as_ref()
    }

    pub fn is_expanded(&self, siret: &Siret) -> bool {
        self.expanded.as_ref() == Some(siret)
    }

    pub fn is_initialized(&self, siret: &Siret) -> bool {
        self.initialized.contains(siret)
    }

    pub fn has_map(&self, siret: &Siret) -> bool {
        self.maps.contains_key(siret)
    }

    /// Click on a result row header.
    pub fn click(
        &mut self,
        company: &Company,
        engine: &mut dyn MapEngine,
        page: &mut dyn PageHost,
        analytics: &mut dyn Analytics,
    ) -> ToggleOutcome {
        if self.is_expanded(&company.siret) {
            self.expanded = None;
            page.set_result_expanded(company.siret.as_str(), false);
            tracing::debug!(siret = %company.siret, "detail collapsed");
            return ToggleOutcome::Collapsed(company.siret.clone());
        }
        self.expand(company, engine, page, analytics)
    }

    /// Opens the row without ever closing it (marker popup link).
    pub fn activate(
        &mut self,
        company: &Company,
        engine: &mut dyn MapEngine,
        page: &mut dyn PageHost,
        analytics: &mut dyn Analytics,
    ) -> ToggleOutcome {
        if self.is_expanded(&company.siret) {
            return ToggleOutcome::AlreadyExpanded;
        }
        self.expand(company, engine, page, analytics)
    }

    /// Forgets everything. Called when the result markup is replaced, so
    /// there is no row left on the page to close.
    pub fn reset(&mut self) {
        self.expanded = None;
        self.initialized.clear();
        self.maps.clear();
    }

    fn expand(
        &mut self,
        company: &Company,
        engine: &mut dyn MapEngine,
        page: &mut dyn PageHost,
        analytics: &mut dyn Analytics,
    ) -> ToggleOutcome {
        let collapsed = self.expanded.replace(company.siret.clone());
        if let Some(previous) = &collapsed {
            page.set_result_expanded(previous.as_str(), false);
        }
        page.set_result_expanded(company.siret.as_str(), true);
        let map_created = self.ensure_map(company, engine);
        analytics.record(AnalyticsEvent::detail_viewed(&company.siret));
        tracing::debug!(siret = %company.siret, map_created, "detail expanded");
        ToggleOutcome::Expanded {
            collapsed,
            map_created,
        }
    }

    fn ensure_map(&mut self, company: &Company, engine: &mut dyn MapEngine) -> bool {
        if !self.initialized.insert(company.siret.clone()) {
            return false;
        }
        let container = Self::container_id(&company.siret);
        match engine.create(&container, company.position, self.zoom) {
            Ok(mut map) => {
                map.add_marker(company.marker());
                self.maps.insert(company.siret.clone(), map);
                true
            }
            Err(err) => {
                tracing::warn!(siret = %company.siret, "detail map not created: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{ResultDetailToggle, ToggleOutcome};
    use crate::analytics::{AnalyticsEvent, RecordingAnalytics};
    use crate::company::Company;
    use crate::map::fake::FakeEngine;
    use crate::map::{MapEngine, MapError, MapHandle};
    use foundation::{LatLng, Siret};
    use pretty_assertions::assert_eq;
    use runtime::{ContainerState, PageHost, RecordingPage};

    fn company(siret: &str) -> Company {
        Company {
            siret: Siret::new(siret),
            name: format!("Company {siret}"),
            position: LatLng::new(48.85, 2.35),
            short_description: String::new(),
        }
    }

    fn open_rows(page: &RecordingPage) -> Vec<&str> {
        page.expanded_rows.iter().map(String::as_str).collect()
    }

    type Log = Rc<RefCell<Vec<String>>>;

    /// Page and engine writing to one log, to observe call order.
    struct LoggedPage(Log);

    impl PageHost for LoggedPage {
        fn map_container(&self) -> ContainerState {
            ContainerState::Absent
        }
        fn hide_map_container(&mut self) {}
        fn set_search_here_visible(&mut self, _visible: bool) {}
        fn set_result_expanded(&mut self, siret: &str, expanded: bool) {
            let verb = if expanded { "open" } else { "close" };
            self.0.borrow_mut().push(format!("{verb} {siret}"));
        }
        fn replace_content(&mut self, _html: &str) {}
        fn push_history(&mut self, _url: &str) {}
        fn navigate(&mut self, _url: &str) {}
    }

    struct LoggedEngine(Log, FakeEngine);

    impl MapEngine for LoggedEngine {
        fn create(
            &mut self,
            container_id: &str,
            center: LatLng,
            zoom: f64,
        ) -> Result<Box<dyn MapHandle>, MapError> {
            self.0.borrow_mut().push(format!("create {container_id}"));
            self.1.create(container_id, center, zoom)
        }
    }

    #[test]
    fn map_is_built_once_across_toggles() {
        let mut toggle = ResultDetailToggle::new(13.0);
        let mut engine = FakeEngine::new();
        let mut page = RecordingPage::default();
        let mut analytics = RecordingAnalytics::default();
        let c = company("111");

        assert_eq!(
            toggle.click(&c, &mut engine, &mut page, &mut analytics),
            ToggleOutcome::Expanded {
                collapsed: None,
                map_created: true
            }
        );
        assert_eq!(open_rows(&page), vec!["111"]);
        assert_eq!(
            toggle.click(&c, &mut engine, &mut page, &mut analytics),
            ToggleOutcome::Collapsed(Siret::new("111"))
        );
        assert!(page.expanded_rows.is_empty());
        assert_eq!(
            toggle.click(&c, &mut engine, &mut page, &mut analytics),
            ToggleOutcome::Expanded {
                collapsed: None,
                map_created: false
            }
        );

        assert_eq!(engine.maps.len(), 1);
        assert!(toggle.has_map(&c.siret));
        let map = engine.last();
        let m = map.borrow();
        assert_eq!(m.container_id, "company-map-111");
        assert_eq!(m.zoom, 13.0);
        assert_eq!(m.markers.len(), 1);

        // One event per expansion, none for the collapse.
        assert_eq!(
            analytics.events,
            vec![
                AnalyticsEvent::new("results", "toggle-details", "111"),
                AnalyticsEvent::new("results", "toggle-details", "111"),
            ]
        );
    }

    #[test]
    fn row_is_opened_before_its_map_is_built() {
        let log: Log = Rc::default();
        let mut page = LoggedPage(log.clone());
        let mut engine = LoggedEngine(log.clone(), FakeEngine::new());
        let mut toggle = ResultDetailToggle::new(13.0);
        let mut analytics = RecordingAnalytics::default();

        toggle.click(&company("1"), &mut engine, &mut page, &mut analytics);
        toggle.click(&company("2"), &mut engine, &mut page, &mut analytics);

        assert_eq!(
            *log.borrow(),
            vec![
                "open 1".to_string(),
                "create company-map-1".to_string(),
                "close 1".to_string(),
                "open 2".to_string(),
                "create company-map-2".to_string(),
            ]
        );
    }

    #[test]
    fn opening_a_row_closes_the_previous_one() {
        let mut toggle = ResultDetailToggle::new(13.0);
        let mut engine = FakeEngine::new();
        let mut page = RecordingPage::default();
        let mut analytics = RecordingAnalytics::default();

        toggle.click(&company("1"), &mut engine, &mut page, &mut analytics);
        assert_eq!(
            toggle.click(&company("2"), &mut engine, &mut page, &mut analytics),
            ToggleOutcome::Expanded {
                collapsed: Some(Siret::new("1")),
                map_created: true
            }
        );
        assert!(toggle.is_expanded(&Siret::new("2")));
        assert_eq!(open_rows(&page), vec!["2"]);
        // Collapsing never destroys a map.
        assert!(toggle.has_map(&Siret::new("1")));
    }

    #[test]
    fn activate_never_collapses() {
        let mut toggle = ResultDetailToggle::new(13.0);
        let mut engine = FakeEngine::new();
        let mut page = RecordingPage::default();
        let mut analytics = RecordingAnalytics::default();
        let c = company("1");

        toggle.activate(&c, &mut engine, &mut page, &mut analytics);
        assert_eq!(
            toggle.activate(&c, &mut engine, &mut page, &mut analytics),
            ToggleOutcome::AlreadyExpanded
        );
        assert_eq!(toggle.expanded(), Some(&Siret::new("1")));
        assert_eq!(open_rows(&page), vec!["1"]);
        assert_eq!(analytics.events.len(), 1);
    }

    #[test]
    fn failed_map_is_not_retried() {
        let mut toggle = ResultDetailToggle::new(13.0);
        let mut engine = FakeEngine::failing();
        let mut page = RecordingPage::default();
        let mut analytics = RecordingAnalytics::default();
        let c = company("1");

        toggle.click(&c, &mut engine, &mut page, &mut analytics);
        toggle.click(&c, &mut engine, &mut page, &mut analytics);
        engine.fail = false;
        assert_eq!(
            toggle.click(&c, &mut engine, &mut page, &mut analytics),
            ToggleOutcome::Expanded {
                collapsed: None,
                map_created: false
            }
        );
        // The row still opens without its map.
        assert_eq!(open_rows(&page), vec!["1"]);
        assert!(toggle.is_initialized(&c.siret));
        assert!(!toggle.has_map(&c.siret));
        assert!(engine.maps.is_empty());
    }

    #[test]
    fn reset_forgets_rows() {
        let mut toggle = ResultDetailToggle::new(13.0);
        let mut engine = FakeEngine::new();
        let mut page = RecordingPage::default();
        let mut analytics = RecordingAnalytics::default();
        toggle.click(&company("1"), &mut engine, &mut page, &mut analytics);

        toggle.reset();
        assert_eq!(toggle.expanded(), None);
        assert!(!toggle.has_map(&Siret::new("1")));
        assert!(matches!(
            toggle.click(&company("1"), &mut engine, &mut page, &mut analytics),
            ToggleOutcome::Expanded { map_created: true, .. }
        ));
    }
}

use foundation::Siret;
use runtime::{EventBus, PageHost, TickQueue};
use search::{SearchCriteriaForm, Submission};

use crate::analytics::Analytics;
use crate::company::{Company, ResultSet};
use crate::config::MapSyncConfig;
use crate::controller::{MapSyncAction, MapSyncController, MapSyncState};
use crate::details::{ResultDetailToggle, ToggleOutcome};
use crate::map::{MapEngine, MapEvent};

/// One session of the results page, without the browser.
///
/// Owns the canonical form, the result rows of the current markup, the
/// results map and the detail toggle. The browser binding reads rows from the
/// DOM, forwards map events, and sends out the submissions returned here.
pub struct ResultsPage {
    controller: MapSyncController,
    details: ResultDetailToggle,
    form: SearchCriteriaForm,
    results: ResultSet,
    ticks: TickQueue<dyn PageHost>,
}

impl ResultsPage {
    pub fn new(config: MapSyncConfig, form: SearchCriteriaForm) -> Self {
        Self {
            details: ResultDetailToggle::new(config.default_zoom),
            controller: MapSyncController::new(config),
            form,
            results: ResultSet::default(),
            ticks: TickQueue::new(),
        }
    }

    pub fn controller(&self) -> &MapSyncController {
        &self.controller
    }

    pub fn details(&self) -> &ResultDetailToggle {
        &self.details
    }

    pub fn form(&self) -> &SearchCriteriaForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SearchCriteriaForm {
        &mut self.form
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Binds to the result rows of freshly loaded markup.
    ///
    /// Detail maps belonged to the previous rows and are forgotten; the
    /// results map is rebuilt around the search's own coordinates.
    pub fn bind(
        &mut self,
        companies: Vec<Company>,
        engine: &mut dyn MapEngine,
        page: &mut dyn PageHost,
    ) -> MapSyncState {
        self.details.reset();
        let criteria = self.form.criteria(self.controller.distance_table());
        self.results = ResultSet::new(companies, criteria.coordinates());
        let state = self
            .controller
            .initialize(engine, page, &mut self.ticks, &self.results);
        tracing::debug!(
            ?state,
            companies = self.results.len(),
            radius = ?criteria.radius_km,
            "page bound"
        );
        state
    }

    /// Re-binds if a page-ready was emitted since the last call, which is
    /// how a partial refresh announces new markup. Rows are read from `page`
    /// only in that case.
    pub fn rebind_if_ready<P: PageHost>(
        &mut self,
        bus: &mut EventBus,
        engine: &mut dyn MapEngine,
        page: &mut P,
        companies: impl FnOnce(&P) -> Vec<Company>,
    ) -> Option<MapSyncState> {
        if !bus.take_ready() {
            return None;
        }
        let rows = companies(page);
        Some(self.bind(rows, engine, page))
    }

    /// Whether tasks are waiting for the next tick.
    pub fn has_deferred(&self) -> bool {
        !self.ticks.is_empty()
    }

    pub fn run_tick(&mut self, page: &mut (dyn PageHost + 'static)) -> usize {
        self.ticks.run_tick(page)
    }

    /// Routes a results map event. Moves may yield a refresh to send; a
    /// marker popup link opens the matching result row.
    pub fn handle_map_event(
        &mut self,
        event: MapEvent,
        engine: &mut dyn MapEngine,
        page: &mut dyn PageHost,
        analytics: &mut dyn Analytics,
    ) -> Option<Submission> {
        match self.controller.handle_map_event(event, &mut self.form, page) {
            MapSyncAction::Refresh(submission) => Some(submission),
            MapSyncAction::ActivateDetail(siret) => {
                self.toggle_details(&siret, true, engine, page, analytics);
                None
            }
            MapSyncAction::ShowSearchHere | MapSyncAction::None => None,
        }
    }

    /// The manual "search here" control.
    pub fn search_here(&mut self, page: &mut dyn PageHost) -> Option<Submission> {
        match self.controller.search_here(&mut self.form, page) {
            MapSyncAction::Refresh(submission) => Some(submission),
            _ => None,
        }
    }

    pub fn set_auto_refresh(&mut self, on: bool, page: &mut dyn PageHost) {
        self.controller.set_auto_refresh(on, page);
    }

    /// Opens or closes a result row. `activate` never closes an open row.
    pub fn toggle_details(
        &mut self,
        siret: &Siret,
        activate: bool,
        engine: &mut dyn MapEngine,
        page: &mut dyn PageHost,
        analytics: &mut dyn Analytics,
    ) -> Option<ToggleOutcome> {
        let Some(company) = self.results.find(siret) else {
            tracing::debug!(%siret, "no result row for siret");
            return None;
        };
        let outcome = if activate {
            self.details.activate(company, engine, page, analytics)
        } else {
            self.details.click(company, engine, page, analytics)
        };
        Some(outcome)
    }
}

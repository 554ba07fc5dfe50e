use foundation::{DistanceTable, LatLng, LatLngBounds, Siret};
use runtime::{ContainerState, PageHost, Task, TickQueue, hide_map_container};
use search::{SearchCriteriaForm, SubmitMode, Submission, field};

use crate::company::ResultSet;
use crate::config::MapSyncConfig;
use crate::map::{MapEngine, MapEvent, MapEventKind, MapHandle};
use crate::viewport::ViewportStateStore;

/// Lifecycle of the results map.
///
/// ```text
/// Uninitialized --(container visible, engine ok)--> Centered
/// Uninitialized --(engine error)------------------> Failed
/// Centered --(drag/zoom end)--> Dirty --(refresh)--> Centered
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MapSyncState {
    Uninitialized,
    Centered,
    Dirty,
    Failed,
}

/// Initial position of a freshly created results map.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Framing {
    View { center: LatLng, zoom: f64 },
    Bounds(LatLngBounds),
}

/// What the page should do after a map event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapSyncAction {
    None,
    /// Auto-refresh is off: the "search here" control is now visible.
    ShowSearchHere,
    Refresh(Submission),
    /// A marker popup link was clicked: open that result row.
    ActivateDetail(Siret),
}

const SUBSCRIBED_EVENTS: [MapEventKind; 3] = [
    MapEventKind::DragEnd,
    MapEventKind::ZoomEnd,
    MapEventKind::MarkerClick,
];

/// Keeps the results map and the canonical search form in step.
///
/// One instance per page session. It owns the viewport store and the
/// auto-refresh flag; the map handle is replaced on every page-ready since
/// partial refreshes bring a new container.
pub struct MapSyncController {
    config: MapSyncConfig,
    table: DistanceTable,
    viewport: ViewportStateStore,
    auto_refresh: bool,
    state: MapSyncState,
    map: Option<Box<dyn MapHandle>>,
}

impl MapSyncController {
    pub fn new(config: MapSyncConfig) -> Self {
        Self {
            auto_refresh: config.auto_refresh,
            config,
            table: DistanceTable::default(),
            viewport: ViewportStateStore::new(),
            state: MapSyncState::Uninitialized,
            map: None,
        }
    }

    pub fn state(&self) -> MapSyncState {
        self.state
    }

    pub fn config(&self) -> &MapSyncConfig {
        &self.config
    }

    pub fn distance_table(&self) -> &DistanceTable {
        &self.table
    }

    pub fn viewport(&self) -> &ViewportStateStore {
        &self.viewport
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn map(&self) -> Option<&dyn MapHandle> {
        self.map.as_deref()
    }

    /// Where a new map should look, by priority: the viewport the user last
    /// searched from, all companies, the single company, the search point.
    pub fn framing(&self, results: &ResultSet) -> Framing {
        let zoom = self.config.default_zoom;
        if let Some(v) = self.viewport.get() {
            return Framing::View {
                center: v.center,
                zoom: v.zoom,
            };
        }
        match results.companies.as_slice() {
            [only] => Framing::View {
                center: only.position,
                zoom,
            },
            [_, _, ..] => match results.bounds() {
                Some(bounds) => Framing::Bounds(bounds),
                None => self.search_point_framing(results),
            },
            [] => self.search_point_framing(results),
        }
    }

    fn search_point_framing(&self, results: &ResultSet) -> Framing {
        match results.search_center.filter(LatLng::is_finite) {
            Some(center) => Framing::View {
                center,
                zoom: self.config.default_zoom,
            },
            None => Framing::View {
                center: self.config.fallback_center,
                zoom: self.config.fallback_zoom,
            },
        }
    }

    /// (Re)builds the results map for freshly loaded markup.
    pub fn initialize(
        &mut self,
        engine: &mut dyn MapEngine,
        page: &mut dyn PageHost,
        ticks: &mut TickQueue<dyn PageHost>,
        results: &ResultSet,
    ) -> MapSyncState {
        self.map = None;
        self.state = MapSyncState::Uninitialized;
        page.set_search_here_visible(false);

        match page.map_container() {
            ContainerState::Visible => {}
            other => {
                tracing::debug!(?other, "results map not initialized");
                return self.state;
            }
        }

        let framing = self.framing(results);
        let (center, zoom) = match framing {
            Framing::View { center, zoom } => (center, zoom),
            Framing::Bounds(b) => (b.center(), self.config.default_zoom),
        };

        let mut map = match engine.create(&self.config.results_map_container, center, zoom) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!("results map disabled: {err}");
                page.hide_map_container();
                // Other scripts may show the container again late.
                ticks.defer(Task::new("hide-map-container", hide_map_container));
                self.state = MapSyncState::Failed;
                return self.state;
            }
        };

        if let Framing::Bounds(bounds) = framing {
            map.fit_bounds(bounds);
        }
        for company in &results.companies {
            map.add_marker(company.marker());
        }
        map.subscribe(&SUBSCRIBED_EVENTS);

        tracing::debug!(companies = results.len(), ?framing, "results map centered");
        self.map = Some(map);
        self.state = MapSyncState::Centered;
        self.state
    }

    pub fn handle_map_event(
        &mut self,
        event: MapEvent,
        form: &mut SearchCriteriaForm,
        page: &mut dyn PageHost,
    ) -> MapSyncAction {
        match event {
            MapEvent::MarkerClick(siret) => MapSyncAction::ActivateDetail(siret),
            MapEvent::DragEnd | MapEvent::ZoomEnd => {
                if !matches!(self.state, MapSyncState::Centered | MapSyncState::Dirty) {
                    return MapSyncAction::None;
                }
                self.state = MapSyncState::Dirty;
                if self.auto_refresh {
                    page.set_search_here_visible(false);
                    return self.refresh(form).map_or(MapSyncAction::None, MapSyncAction::Refresh);
                }
                page.set_search_here_visible(true);
                MapSyncAction::ShowSearchHere
            }
        }
    }

    /// The manual "search here" control.
    pub fn search_here(
        &mut self,
        form: &mut SearchCriteriaForm,
        page: &mut dyn PageHost,
    ) -> MapSyncAction {
        if self.state != MapSyncState::Dirty {
            return MapSyncAction::None;
        }
        page.set_search_here_visible(false);
        self.refresh(form).map_or(MapSyncAction::None, MapSyncAction::Refresh)
    }

    pub fn set_auto_refresh(&mut self, on: bool, page: &mut dyn PageHost) {
        self.auto_refresh = on;
        if on {
            page.set_search_here_visible(false);
        } else if self.state == MapSyncState::Dirty {
            page.set_search_here_visible(true);
        }
    }

    /// Dirty -> Centered: writes the map geometry into the form.
    ///
    /// Explicit coordinates supersede the typed location and any department
    /// filter.
    fn refresh(&mut self, form: &mut SearchCriteriaForm) -> Option<Submission> {
        let map = self.map.as_ref()?;
        let center = map.center();
        let zoom = map.zoom();
        let radius = self.table.resolve(center.lat, zoom, map.height_px());

        form.set_radius(radius);
        form.set_coordinates(center);
        form.replace_location_with_placeholder();
        form.clear_field(field::DEPARTMENTS);

        self.viewport.set(center, zoom);
        self.state = MapSyncState::Centered;
        tracing::debug!(lat = center.lat, lng = center.lng, zoom, %radius, "map refresh");
        Some(form.submit(SubmitMode::Async))
    }
}

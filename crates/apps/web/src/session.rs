use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::OnceLock;

use foundation::Siret;
use futures::future::LocalBoxFuture;
use refresh::{PendingRequestTracker, RefreshOutcome};
use results::{MapEvent, MapSyncConfig, MapSyncState, ResultsPage, ToggleOutcome};
use runtime::{EventBus, SharedBus, SharedPage};
use search::{PartialRefresh, RelatedSearch, Submission};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

use crate::console::init_tracing;
use crate::dom::DomPage;
use crate::leaflet::LeafletEngine;
use crate::net::{BeaconAnalytics, GlooTransport};

static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();

/// Everything one page load owns: the page core plus its browser adapters.
struct Session {
    core: ResultsPage,
    engine: LeafletEngine,
    page: Rc<RefCell<DomPage>>,
    analytics: BeaconAnalytics,
    refresh: PartialRefresh<GlooTransport>,
    bus: SharedBus,
}

type Pending = Vec<LocalBoxFuture<'static, RefreshOutcome>>;

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
    // Filled by Leaflet callbacks, drained on the next tick. Kept apart from
    // SESSION so a callback fired from inside a session call never re-borrows.
    static MAP_EVENTS: RefCell<VecDeque<MapEvent>> = const { RefCell::new(VecDeque::new()) };
}

/// Yields to the browser event loop (`setTimeout(0)`).
async fn next_tick() {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0);
        }
    });
    let _ = JsFuture::from(promise).await;
}

fn queue_map_event(event: MapEvent) {
    let first = MAP_EVENTS.with(|q| {
        let mut q = q.borrow_mut();
        q.push_back(event);
        q.len() == 1
    });
    if first {
        spawn_local(async {
            next_tick().await;
            drain_map_events();
        });
    }
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(|| {
        console_error_panic_hook::set_once();
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    init_panic_hook();
    init_tracing();
    Ok(())
}

impl Session {
    fn new() -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let defaults = MapSyncConfig::default();
        let raw = DomPage::map_sync_config(&document, &defaults.results_map_container);
        let config = MapSyncConfig::load(raw.as_deref());

        let page = Rc::new(RefCell::new(DomPage::new(document, &config)));
        let form = page.borrow().search_form(&config.refresh_endpoint);
        let analytics = BeaconAnalytics::new(page.borrow().csrf_token());
        let shared: SharedPage = page.clone();
        let bus = EventBus::shared();
        let refresh = PartialRefresh::new(
            PendingRequestTracker::new(),
            Rc::new(GlooTransport),
            shared,
            bus.clone(),
        );

        Ok(Self {
            core: ResultsPage::new(config, form),
            engine: LeafletEngine::new(Rc::new(queue_map_event)),
            page,
            analytics,
            refresh,
            bus,
        })
    }

    /// Binds to the markup currently in the document.
    fn bind(&mut self) {
        MAP_EVENTS.with(|q| q.borrow_mut().clear());
        let companies = self.page.borrow().companies();
        self.core
            .bind(companies, &mut self.engine, &mut *self.page.borrow_mut());
        self.schedule_tick();
    }

    /// Binds again if a partial refresh brought new markup.
    fn rebind_if_ready(&mut self) {
        let rebound = self.core.rebind_if_ready(
            &mut self.bus.borrow_mut(),
            &mut self.engine,
            &mut *self.page.borrow_mut(),
            DomPage::companies,
        );
        if rebound.is_some() {
            MAP_EVENTS.with(|q| q.borrow_mut().clear());
            self.schedule_tick();
        }
    }

    fn schedule_tick(&self) {
        if !self.core.has_deferred() {
            return;
        }
        spawn_local(async {
            next_tick().await;
            with_session(|s| {
                s.core.run_tick(&mut *s.page.borrow_mut());
                Vec::new()
            });
        });
    }

    /// Sends a submission out; refresh futures are returned to be spawned
    /// once the session borrow is released.
    fn submit(&mut self, submission: Submission) -> Pending {
        self.page.borrow().write_form(self.core.form());
        self.analytics.set_query(self.core.form().serialize());
        self.refresh.dispatch(submission).into_iter().collect()
    }

    fn toggle(&mut self, siret: &Siret, activate: bool) -> Option<ToggleOutcome> {
        self.analytics.set_query(self.core.form().serialize());
        self.core.toggle_details(
            siret,
            activate,
            &mut self.engine,
            &mut *self.page.borrow_mut(),
            &mut self.analytics,
        )
    }

    fn map_event(&mut self, event: MapEvent) -> Pending {
        self.analytics.set_query(self.core.form().serialize());
        let submission = self.core.handle_map_event(
            event,
            &mut self.engine,
            &mut *self.page.borrow_mut(),
            &mut self.analytics,
        );
        submission.map(|s| self.submit(s)).unwrap_or_default()
    }
}

/// Runs `f` against the live session and spawns whatever refreshes it
/// started. Does nothing before the first `page_ready`.
fn with_session(f: impl FnOnce(&mut Session) -> Pending) {
    let pending = SESSION.with(|cell| cell.borrow_mut().as_mut().map(f).unwrap_or_default());
    for fut in pending {
        spawn_local(await_refresh(fut));
    }
}

async fn await_refresh(fut: LocalBoxFuture<'static, RefreshOutcome>) {
    let outcome = fut.await;
    tracing::debug!(?outcome, "refresh settled");
    with_session(|s| {
        s.rebind_if_ready();
        Vec::new()
    });
}

fn drain_map_events() {
    let events: Vec<MapEvent> = MAP_EVENTS.with(|q| q.borrow_mut().drain(..).collect());
    with_session(|s| events.into_iter().flat_map(|e| s.map_event(e)).collect());
}

/// Page-ready hook: call on load, and after any markup the page swaps in by
/// itself. Partial refreshes re-bind automatically.
#[wasm_bindgen]
pub fn page_ready() -> Result<(), JsValue> {
    let created = SESSION.with(|cell| -> Result<bool, JsValue> {
        let mut slot = cell.borrow_mut();
        if slot.is_some() {
            return Ok(false);
        }
        *slot = Some(Session::new()?);
        Ok(true)
    })?;
    if created {
        tracing::info!("results page session started");
    }
    with_session(|s| {
        s.bind();
        Vec::new()
    });
    Ok(())
}

/// The "search here" control over the results map.
#[wasm_bindgen]
pub fn search_here() {
    with_session(|s| {
        let submission = s.core.search_here(&mut *s.page.borrow_mut());
        submission.map(|sub| s.submit(sub)).unwrap_or_default()
    });
}

#[wasm_bindgen]
pub fn set_auto_refresh(on: bool) {
    with_session(|s| {
        s.core.set_auto_refresh(on, &mut *s.page.borrow_mut());
        Vec::new()
    });
}

/// Click on a result row header. Returns whether the row is now open.
#[wasm_bindgen]
pub fn toggle_details(siret: &str) -> bool {
    let siret = Siret::new(siret);
    let mut open = false;
    with_session(|s| {
        open = matches!(s.toggle(&siret, false), Some(ToggleOutcome::Expanded { .. }));
        Vec::new()
    });
    open
}

/// Submit button of the shown form.
#[wasm_bindgen]
pub fn submit_search() {
    with_session(|s| {
        let shown = s.page.borrow().shown_form();
        let submission = s.core.form_mut().submit_shown(&shown);
        s.submit(submission)
    });
}

/// Sidebar filters (`h`, `sort`, `naf`, ...).
#[wasm_bindgen]
pub fn set_filter(name: &str, value: &str) {
    with_session(|s| {
        let submission = s.core.form_mut().set_filter(name, value);
        s.submit(submission)
    });
}

/// "Search further away". Values outside the distance table are ignored.
#[wasm_bindgen]
pub fn extend_distance(km: u32) {
    with_session(|s| {
        let Some(radius) = s.core.controller().distance_table().snap(km) else {
            tracing::warn!(km, "not a search distance");
            return Vec::new();
        };
        let submission = s.core.form_mut().extend_distance(radius);
        s.submit(submission)
    });
}

#[wasm_bindgen]
pub fn extend_occupation(slug: &str) {
    with_session(|s| {
        let submission = s.core.form_mut().extend_occupation(slug);
        s.submit(submission)
    });
}

/// Related-occupation link. `initial` marks the link back to the occupation
/// the visitor first searched for.
#[wasm_bindgen]
pub fn related_occupation(label: &str, slug: &str, initial: bool) {
    with_session(|s| {
        let kind = if initial {
            RelatedSearch::Initial
        } else {
            RelatedSearch::Suggested
        };
        let mut shown = s.page.borrow().shown_form();
        let submission = s
            .core
            .form_mut()
            .apply_related_occupation(&mut shown, label, slug, kind);
        s.submit(submission)
    });
}

/// Whether the results map is live (for page scripts and debugging).
#[wasm_bindgen]
pub fn results_map_ready() -> bool {
    let mut ready = false;
    with_session(|s| {
        let controller = s.core.controller();
        ready = controller.state() != MapSyncState::Failed && controller.map().is_some();
        Vec::new()
    });
    ready
}

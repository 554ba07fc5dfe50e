use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Presence of the results map container in the current markup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ContainerState {
    #[default]
    Absent,
    Hidden,
    Visible,
}

/// The page surface the sync core drives.
///
/// Everything here is a narrow side effect on the document; the browser
/// binding implements it against the DOM, tests use [`RecordingPage`].
pub trait PageHost {
    fn map_container(&self) -> ContainerState;
    fn hide_map_container(&mut self);
    /// Shows or hides the manual "search here" control over the map.
    fn set_search_here_visible(&mut self, visible: bool);
    /// Opens or closes the detail section of the result row for `siret`.
    fn set_result_expanded(&mut self, siret: &str, expanded: bool);
    /// Splices a server-rendered fragment into the content region.
    fn replace_content(&mut self, html: &str);
    /// Updates the address bar without reloading.
    fn push_history(&mut self, url: &str);
    /// Full page navigation (the synchronous fallback path).
    fn navigate(&mut self, url: &str);
}

pub type SharedPage = Rc<RefCell<dyn PageHost>>;

/// Deferred task that hides the map container again on the next tick.
pub fn hide_map_container(page: &mut (dyn PageHost + 'static)) {
    page.hide_map_container();
}

/// In-memory [`PageHost`] that records every side effect.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingPage {
    pub container: ContainerState,
    pub hide_calls: usize,
    pub search_here_visible: bool,
    pub expanded_rows: BTreeSet<String>,
    pub content: String,
    pub history: Vec<String>,
    pub navigations: Vec<String>,
}

impl RecordingPage {
    pub fn new(container: ContainerState) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }

    pub fn with_visible_map() -> Self {
        Self::new(ContainerState::Visible)
    }
}

impl PageHost for RecordingPage {
    fn map_container(&self) -> ContainerState {
        self.container
    }

    fn hide_map_container(&mut self) {
        self.hide_calls += 1;
        if self.container == ContainerState::Visible {
            self.container = ContainerState::Hidden;
        }
    }

    fn set_search_here_visible(&mut self, visible: bool) {
        self.search_here_visible = visible;
    }

    fn set_result_expanded(&mut self, siret: &str, expanded: bool) {
        if expanded {
            self.expanded_rows.insert(siret.to_string());
        } else {
            self.expanded_rows.remove(siret);
        }
    }

    fn replace_content(&mut self, html: &str) {
        self.content = html.to_string();
    }

    fn push_history(&mut self, url: &str) {
        self.history.push(url.to_string());
    }

    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_string());
    }
}

use results::{Company, MapSyncConfig};
use runtime::{ContainerState, PageHost};
use search::{FormFields, SearchCriteriaForm, ShownForm, field};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{
    Document, Element, FormData, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement,
};

use crate::markup::{self, ATTR_MAP_SYNC};

/// The form the visitor types into.
pub const SHOWN_FORM_ID: &str = "shown-search-form";
/// The hidden form every search is submitted from.
pub const CANONICAL_FORM_ID: &str = "lbb-search-form";
pub const SEARCH_HERE_ID: &str = "lbb-search-here";
pub const RESULT_ROW_SELECTOR: &str = ".lbb-result[data-siret]";
/// Class that shows a result row's detail section.
pub const RESULT_EXPANDED_CLASS: &str = "active";
const CSRF_META_SELECTOR: &str = "meta[name=\"csrf-token\"]";

/// [`PageHost`] over the live document.
pub struct DomPage {
    document: Document,
    map_container_id: String,
    content_region_id: String,
}

impl DomPage {
    pub fn new(document: Document, config: &MapSyncConfig) -> Self {
        Self {
            document,
            map_container_id: config.results_map_container.clone(),
            content_region_id: config.content_region.clone(),
        }
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn form(&self, id: &str) -> Option<HtmlFormElement> {
        self.element(id)?.dyn_into::<HtmlFormElement>().ok()
    }

    /// Raw `data-map-sync` JSON on the results map container, if any.
    pub fn map_sync_config(document: &Document, container_id: &str) -> Option<String> {
        document
            .get_element_by_id(container_id)?
            .get_attribute(ATTR_MAP_SYNC)
    }

    pub fn csrf_token(&self) -> String {
        self.document
            .query_selector(CSRF_META_SELECTOR)
            .ok()
            .flatten()
            .and_then(|meta| meta.get_attribute("content"))
            .unwrap_or_default()
    }

    pub fn shown_form(&self) -> ShownForm {
        ShownForm::new(self.form(SHOWN_FORM_ID).map(|f| read_fields(&f)).unwrap_or_default())
    }

    pub fn search_form(&self, endpoint: &str) -> SearchCriteriaForm {
        let hidden = self
            .form(CANONICAL_FORM_ID)
            .map(|f| read_fields(&f))
            .unwrap_or_default();
        SearchCriteriaForm::new(endpoint, self.shown_form().fields, hidden)
    }

    /// Result rows that can be placed on a map, in document order.
    pub fn companies(&self) -> Vec<Company> {
        let Ok(rows) = self.document.query_selector_all(RESULT_ROW_SELECTOR) else {
            return Vec::new();
        };
        (0..rows.length())
            .filter_map(|i| rows.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|el| markup::company_from_attrs(|name| el.get_attribute(name)))
            .collect()
    }

    /// Mirrors the canonical form back into both DOM forms so a regular
    /// submit, or a reload, sees the same search.
    pub fn write_form(&self, form: &SearchCriteriaForm) {
        let fields = form.fields();
        for id in [SHOWN_FORM_ID, CANONICAL_FORM_ID] {
            if let Some(el) = self.form(id) {
                write_fields(&el, &fields);
            }
        }
        if let Some(placeholder) = form.location_placeholder() {
            if let Some(input) = self.named_input(SHOWN_FORM_ID, field::LOCATION) {
                input.set_placeholder(placeholder);
            }
        }
    }

    fn named_input(&self, form_id: &str, name: &str) -> Option<HtmlInputElement> {
        self.form(form_id)?
            .query_selector(&format!("[name=\"{name}\"]"))
            .ok()
            .flatten()?
            .dyn_into::<HtmlInputElement>()
            .ok()
    }

    fn log_js_error(what: &str, err: JsValue) {
        tracing::warn!("{what} failed: {err:?}");
    }
}

impl PageHost for DomPage {
    fn map_container(&self) -> ContainerState {
        let Some(el) = self.element(&self.map_container_id) else {
            return ContainerState::Absent;
        };
        match el.dyn_into::<HtmlElement>() {
            Ok(html) if html.offset_width() > 0 || html.offset_height() > 0 => ContainerState::Visible,
            _ => ContainerState::Hidden,
        }
    }

    fn hide_map_container(&mut self) {
        let Some(html) = self
            .element(&self.map_container_id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        if let Err(err) = html.style().set_property("display", "none") {
            Self::log_js_error("hiding the map container", err);
        }
    }

    fn set_search_here_visible(&mut self, visible: bool) {
        if let Some(el) = self.element(SEARCH_HERE_ID) {
            if let Err(err) = el.toggle_attribute_with_force("hidden", !visible) {
                Self::log_js_error("toggling search here", err);
            }
        }
    }

    fn set_result_expanded(&mut self, siret: &str, expanded: bool) {
        let selector = format!(".lbb-result[{}=\"{siret}\"]", markup::ATTR_SIRET);
        let Ok(Some(row)) = self.document.query_selector(&selector) else {
            tracing::debug!(%siret, "result row not found");
            return;
        };
        if let Err(err) = row
            .class_list()
            .toggle_with_force(RESULT_EXPANDED_CLASS, expanded)
        {
            Self::log_js_error("toggling a result row", err);
        }
    }

    fn replace_content(&mut self, html: &str) {
        match self.element(&self.content_region_id) {
            Some(el) => el.set_inner_html(html),
            None => tracing::warn!(id = %self.content_region_id, "content region not found"),
        }
    }

    fn push_history(&mut self, url: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let result = window
            .history()
            .and_then(|h| h.push_state_with_url(&JsValue::NULL, "", Some(url)));
        if let Err(err) = result {
            Self::log_js_error("pushState", err);
        }
    }

    fn navigate(&mut self, url: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(err) = window.location().set_href(url) {
            Self::log_js_error("navigation", err);
        }
    }
}

fn read_fields(form: &HtmlFormElement) -> FormFields {
    let mut fields = FormFields::new();
    let Ok(data) = FormData::new_with_form(form) else {
        return fields;
    };
    let Ok(Some(entries)) = js_sys::try_iter(&data) else {
        return fields;
    };
    for entry in entries.flatten() {
        let pair = js_sys::Array::from(&entry);
        // File inputs have no string value.
        if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
            fields.push(name, value);
        }
    }
    fields
}

fn write_fields(form: &HtmlFormElement, fields: &FormFields) {
    for (name, value) in fields.iter() {
        let Ok(Some(el)) = form.query_selector(&format!("[name=\"{name}\"]")) else {
            continue;
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            // Checkboxes and radios keep their own value.
            if !matches!(input.type_().as_str(), "checkbox" | "radio") {
                input.set_value(value);
            }
        } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        }
    }
}

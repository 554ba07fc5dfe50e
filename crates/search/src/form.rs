use foundation::{DistanceTable, LatLng, RadiusKm};
use refresh::PendingRequest;

use crate::criteria::{SearchCriteria, field};
use crate::fields::FormFields;

pub const DEFAULT_ENDPOINT: &str = "/entreprises";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubmitMode {
    /// Regular browser navigation (full page load).
    Sync,
    /// Partial refresh of the content region.
    Async,
}

/// What a submission asks the page to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Navigate { url: String },
    Refresh { url: String },
}

impl Submission {
    pub fn url(&self) -> &str {
        match self {
            Submission::Navigate { url } | Submission::Refresh { url } => url,
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Submission::Refresh { .. })
    }
}

/// How a related-occupation link was reached.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RelatedSearch {
    /// Going back to the occupation of the initial search.
    Initial,
    /// Following a suggestion; the current job is remembered as `ij`.
    Suggested,
}

/// The user-facing proxy form. Only its fields matter here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShownForm {
    pub fields: FormFields,
}

impl ShownForm {
    pub fn new(fields: FormFields) -> Self {
        Self { fields }
    }
}

/// The canonical search form: the only thing that is ever submitted.
///
/// It holds two sections. The proxy section mirrors the shown form and is
/// replaced wholesale on reconciliation; the hidden section carries the
/// fields only the page and the map write (coordinates, radius, occupation,
/// sector...). Serialization order is proxy, then hidden.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteriaForm {
    endpoint: String,
    proxy: FormFields,
    hidden: FormFields,
    initial_job: String,
    initial_occupation: String,
    initial_location: String,
    location_placeholder: Option<String>,
}

impl SearchCriteriaForm {
    /// Captures the page-load job, occupation and location used by
    /// [`SearchCriteriaForm::clear_sector_filter`].
    pub fn new(endpoint: impl Into<String>, proxy: FormFields, hidden: FormFields) -> Self {
        let mut form = Self {
            endpoint: endpoint.into(),
            proxy,
            hidden,
            initial_job: String::new(),
            initial_occupation: String::new(),
            initial_location: String::new(),
            location_placeholder: None,
        };
        form.initial_job = form.text(field::JOB);
        form.initial_occupation = form.text(field::OCCUPATION);
        form.initial_location = form.text(field::LOCATION);
        form
    }

    pub fn from_fields(hidden: FormFields) -> Self {
        Self::new(DEFAULT_ENDPOINT, FormFields::new(), hidden)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.proxy.get(name).or_else(|| self.hidden.get(name))
    }

    fn text(&self, name: &str) -> String {
        self.value(name).unwrap_or_default().trim().to_string()
    }

    /// Writes `value` wherever `name` exists, or into the hidden section.
    pub fn set_field(&mut self, name: &str, value: &str) {
        let in_proxy = self.proxy.set_existing(name, value);
        let in_hidden = self.hidden.set_existing(name, value);
        if !in_proxy && !in_hidden {
            self.hidden.push(name, value);
        }
    }

    /// Empties `name` wherever it exists; never adds a field.
    pub fn clear_field(&mut self, name: &str) {
        self.proxy.set_existing(name, "");
        self.hidden.set_existing(name, "");
    }

    pub fn set_coordinates(&mut self, p: LatLng) {
        self.set_field(field::LATITUDE, &p.lat.to_string());
        self.set_field(field::LONGITUDE, &p.lng.to_string());
    }

    pub fn set_radius(&mut self, radius: RadiusKm) {
        self.set_field(field::RADIUS, &radius.to_string());
    }

    /// Both sections, in serialization order.
    pub fn fields(&self) -> FormFields {
        let mut all = self.proxy.clone();
        all.extend(&self.hidden);
        all
    }

    pub fn criteria(&self, table: &DistanceTable) -> SearchCriteria {
        SearchCriteria::from_fields(&self.fields(), table)
    }

    pub fn serialize(&self) -> String {
        self.fields().serialize()
    }

    /// The URL a synchronous submit would load; also the refresh identity.
    pub fn url(&self) -> String {
        PendingRequest::for_query(&self.endpoint, &self.serialize()).url
    }

    /// Copies the shown form into the proxy section verbatim, stray fields
    /// included.
    pub fn reconcile_from(&mut self, shown: &ShownForm) {
        self.proxy = shown.fields.clone();
    }

    /// Clears the business-sector filter when the job (typed text or
    /// occupation) or the typed location differ from what the page was
    /// loaded with. A stale sector can silently empty the result list.
    ///
    /// An emptied location (replaced by the map placeholder) is not a change;
    /// a location typed on a page loaded without one is.
    pub fn clear_sector_filter(&mut self) -> bool {
        let job = self.text(field::JOB);
        let occupation = self.text(field::OCCUPATION);
        let location = self.text(field::LOCATION);
        let job_changed = job != self.initial_job || occupation != self.initial_occupation;
        let location_changed = !location.is_empty() && location != self.initial_location;
        if !(job_changed || location_changed) {
            return false;
        }
        if self.value(field::SECTOR).is_some_and(|v| !v.is_empty()) {
            tracing::debug!(job_changed, location_changed, "sector filter cleared");
        }
        self.clear_field(field::SECTOR);
        true
    }

    pub fn submit(&mut self, mode: SubmitMode) -> Submission {
        self.clear_sector_filter();
        let url = self.url();
        match mode {
            SubmitMode::Sync => Submission::Navigate { url },
            SubmitMode::Async => Submission::Refresh { url },
        }
    }

    /// Submit button of the shown form.
    pub fn submit_shown(&mut self, shown: &ShownForm) -> Submission {
        self.reconcile_from(shown);
        self.clear_field(field::INITIAL_JOB);
        self.submit(SubmitMode::Sync)
    }

    /// Follows a related-occupation link.
    pub fn apply_related_occupation(
        &mut self,
        shown: &mut ShownForm,
        label: &str,
        slug: &str,
        kind: RelatedSearch,
    ) -> Submission {
        let initial_job = match kind {
            RelatedSearch::Initial => String::new(),
            RelatedSearch::Suggested => shown.fields.get(field::JOB).unwrap_or_default().to_string(),
        };
        self.set_field(field::INITIAL_JOB, &initial_job);
        shown.fields.set(field::JOB, label);
        self.set_field(field::JOB, label);
        self.set_field(field::OCCUPATION, slug);
        self.submit(SubmitMode::Sync)
    }

    /// "Search this occupation instead" link.
    pub fn extend_occupation(&mut self, slug: &str) -> Submission {
        self.set_field(field::OCCUPATION, slug);
        self.submit(SubmitMode::Sync)
    }

    /// "Search further away" link.
    pub fn extend_distance(&mut self, radius: RadiusKm) -> Submission {
        self.set_radius(radius);
        self.submit(SubmitMode::Sync)
    }

    /// Sidebar filter change; submitted immediately.
    pub fn set_filter(&mut self, name: &str, value: &str) -> Submission {
        self.set_field(name, value);
        self.submit(SubmitMode::Sync)
    }

    /// Empties the typed location, keeping it as placeholder text.
    pub fn replace_location_with_placeholder(&mut self) {
        let previous = self.text(field::LOCATION);
        if !previous.is_empty() {
            self.location_placeholder = Some(previous);
        }
        self.clear_field(field::LOCATION);
    }

    pub fn location_placeholder(&self) -> Option<&str> {
        self.location_placeholder.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::{RelatedSearch, SearchCriteriaForm, ShownForm, SubmitMode, Submission};
    use crate::criteria::field;
    use crate::fields::FormFields;
    use foundation::{DistanceTable, LatLng};
    use pretty_assertions::assert_eq;

    fn shown() -> ShownForm {
        ShownForm::new(FormFields::from_pairs([("j", "Boulanger"), ("l", "Lyon")]))
    }

    fn form() -> SearchCriteriaForm {
        SearchCriteriaForm::new(
            "/entreprises",
            shown().fields,
            FormFields::from_pairs([
                ("ij", ""),
                ("occupation", "boulangerie"),
                ("lat", "45.76"),
                ("lon", "4.83"),
                ("departments", "69"),
                ("d", "10"),
                ("naf", "1071C"),
            ]),
        )
    }

    #[test]
    fn url_is_endpoint_plus_serialized_fields() {
        let f = form();
        assert_eq!(
            f.url(),
            "/entreprises?j=Boulanger&l=Lyon&ij=&occupation=boulangerie&lat=45.76&lon=4.83&departments=69&d=10&naf=1071C"
        );
    }

    #[test]
    fn sync_and_async_submissions_share_the_url() {
        let mut a = form();
        let mut b = form();
        let sync = a.submit(SubmitMode::Sync);
        let not_sync = b.submit(SubmitMode::Async);
        assert!(!sync.is_async());
        assert!(not_sync.is_async());
        assert_eq!(sync.url(), not_sync.url());
    }

    #[test]
    fn reconcile_copies_the_shown_form_wholesale() {
        let mut f = form();
        let stray = ShownForm::new(FormFields::from_pairs([
            ("j", "Pâtissier"),
            ("l", "Lyon"),
            ("junk", "<b>x</b>"),
        ]));
        f.reconcile_from(&stray);
        assert_eq!(f.value("j"), Some("Pâtissier"));
        assert_eq!(f.value("junk"), Some("<b>x</b>"));

        // Fields the new shown form lacks are gone from the proxy section.
        let bare = ShownForm::new(FormFields::from_pairs([("j", "Pâtissier")]));
        f.reconcile_from(&bare);
        assert_eq!(f.value("l"), None);
        assert_eq!(f.value("junk"), None);
    }

    #[test]
    fn unchanged_search_keeps_the_sector() {
        let mut f = form();
        assert!(!f.clear_sector_filter());
        assert_eq!(f.value(field::SECTOR), Some("1071C"));
    }

    #[test]
    fn occupation_change_clears_the_sector() {
        let mut f = form();
        f.set_field(field::OCCUPATION, "patisserie");
        let s = f.submit(SubmitMode::Sync);
        assert_eq!(f.value(field::SECTOR), Some(""));
        assert!(s.url().contains("naf=&") || s.url().ends_with("naf="));
    }

    #[test]
    fn location_change_clears_the_sector() {
        let mut f = form();
        let moved = ShownForm::new(FormFields::from_pairs([("j", "Boulanger"), ("l", "Grenoble")]));
        f.submit_shown(&moved);
        assert_eq!(f.value(field::SECTOR), Some(""));
    }

    #[test]
    fn typed_job_change_clears_the_sector() {
        let mut f = form();
        let retyped = ShownForm::new(FormFields::from_pairs([("j", "Plombier"), ("l", "Lyon")]));
        f.submit_shown(&retyped);
        assert_eq!(f.value(field::SECTOR), Some(""));
    }

    #[test]
    fn location_typed_on_a_page_loaded_without_one_clears_the_sector() {
        let mut f = SearchCriteriaForm::new(
            "/entreprises",
            FormFields::from_pairs([("j", "Boulanger"), ("l", "")]),
            FormFields::from_pairs([("occupation", "boulangerie"), ("naf", "1071C")]),
        );
        assert!(!f.clear_sector_filter());
        let typed = ShownForm::new(FormFields::from_pairs([("j", "Boulanger"), ("l", "Grenoble")]));
        f.submit_shown(&typed);
        assert_eq!(f.value(field::SECTOR), Some(""));
    }

    #[test]
    fn comparison_is_against_page_load_values() {
        let mut f = form();
        f.set_field(field::OCCUPATION, "patisserie");
        f.set_field(field::OCCUPATION, "boulangerie");
        // Back to the page-load value: nothing changed materially.
        assert!(!f.clear_sector_filter());
    }

    #[test]
    fn placeholder_location_is_not_a_location_change() {
        let mut f = form();
        f.replace_location_with_placeholder();
        assert_eq!(f.value(field::LOCATION), Some(""));
        assert_eq!(f.location_placeholder(), Some("Lyon"));
        assert!(!f.clear_sector_filter());
    }

    #[test]
    fn submit_shown_clears_initial_job() {
        let mut f = form();
        f.set_field(field::INITIAL_JOB, "Boulanger");
        f.submit_shown(&shown());
        assert_eq!(f.value(field::INITIAL_JOB), Some(""));
    }

    #[test]
    fn suggested_occupation_remembers_the_previous_job() {
        let mut f = form();
        let mut s = shown();
        let sub = f.apply_related_occupation(&mut s, "Pâtissier", "patisserie", RelatedSearch::Suggested);
        assert_eq!(f.value(field::INITIAL_JOB), Some("Boulanger"));
        assert_eq!(f.value(field::JOB), Some("Pâtissier"));
        assert_eq!(s.fields.get(field::JOB), Some("Pâtissier"));
        assert_eq!(f.value(field::OCCUPATION), Some("patisserie"));
        assert!(matches!(sub, Submission::Navigate { .. }));
    }

    #[test]
    fn initial_occupation_forgets_the_previous_job() {
        let mut f = form();
        f.set_field(field::INITIAL_JOB, "Boulanger");
        let mut s = shown();
        f.apply_related_occupation(&mut s, "Boulanger", "boulangerie", RelatedSearch::Initial);
        assert_eq!(f.value(field::INITIAL_JOB), Some(""));
    }

    #[test]
    fn widening_links_submit_synchronously() {
        let table = DistanceTable::default();
        let mut f = form();
        let sub = f.extend_distance(table.snap(30).expect("radius"));
        assert_eq!(f.criteria(&table).radius_km.map(|r| r.km()), Some(30));
        assert!(!sub.is_async());

        let sub = f.set_filter(field::HEADCOUNT, "2");
        assert!(sub.url().ends_with("h=2"));
    }

    #[test]
    fn coordinates_are_written_as_plain_decimals() {
        let mut f = form();
        f.set_coordinates(LatLng::new(48.8566, 2.3522));
        assert_eq!(f.value(field::LATITUDE), Some("48.8566"));
        assert_eq!(f.value(field::LONGITUDE), Some("2.3522"));
    }
}

use foundation::{LatLng, Siret};
use results::{AnalyticsEvent, Company};
use url::form_urlencoded;

pub const ATTR_SIRET: &str = "data-siret";
pub const ATTR_NAME: &str = "data-name";
pub const ATTR_LATITUDE: &str = "data-latitude";
pub const ATTR_LONGITUDE: &str = "data-longitude";
pub const ATTR_DESCRIPTION: &str = "data-description";

/// Optional JSON settings on the results map container.
pub const ATTR_MAP_SYNC: &str = "data-map-sync";

/// Reads one result row from its data attributes.
///
/// Rows without a siret or usable coordinates are skipped by the caller: they
/// cannot be placed on a map.
pub fn company_from_attrs(attr: impl Fn(&str) -> Option<String>) -> Option<Company> {
    let siret = attr(ATTR_SIRET).filter(|s| !s.trim().is_empty())?;
    let position = LatLng::parse(&attr(ATTR_LATITUDE)?, &attr(ATTR_LONGITUDE)?)?;
    Some(Company {
        siret: Siret::new(siret),
        name: attr(ATTR_NAME).unwrap_or_default(),
        position,
        short_description: attr(ATTR_DESCRIPTION).unwrap_or_default(),
    })
}

/// `POST` target for an analytics event: the action and label in the path,
/// the current search query and the CSRF token in the query string.
pub fn analytics_url(event: &AnalyticsEvent, query: &str, csrf_token: &str) -> String {
    let path: String = form_urlencoded::byte_serialize(event.label.as_bytes()).collect();
    let token = form_urlencoded::Serializer::new(String::new())
        .append_pair("csrf_token", csrf_token)
        .finish();
    match query.trim_start_matches('?') {
        "" => format!("/events/{}/{}?{}", event.action, path, token),
        query => format!("/events/{}/{}?{}&{}", event.action, path, query, token),
    }
}

#[cfg(test)]
mod tests {
    use super::{analytics_url, company_from_attrs};
    use foundation::{LatLng, Siret};
    use pretty_assertions::assert_eq;
    use results::AnalyticsEvent;
    use std::collections::BTreeMap;

    fn attrs(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn reads_a_result_row() {
        let c = company_from_attrs(attrs(&[
            ("data-siret", "12345678900012"),
            ("data-name", "Boulangerie Dupont"),
            ("data-latitude", "48.85"),
            ("data-longitude", "2.35"),
        ]))
        .expect("company");
        assert_eq!(c.siret, Siret::new("12345678900012"));
        assert_eq!(c.name, "Boulangerie Dupont");
        assert_eq!(c.position, LatLng::new(48.85, 2.35));
        assert_eq!(c.short_description, "");
    }

    #[test]
    fn rows_without_coordinates_are_skipped() {
        assert!(company_from_attrs(attrs(&[("data-siret", "1"), ("data-latitude", "48.85")])).is_none());
        assert!(
            company_from_attrs(attrs(&[
                ("data-siret", "1"),
                ("data-latitude", "north"),
                ("data-longitude", "2.35"),
            ]))
            .is_none()
        );
        assert!(
            company_from_attrs(attrs(&[
                ("data-siret", " "),
                ("data-latitude", "48.85"),
                ("data-longitude", "2.35"),
            ]))
            .is_none()
        );
    }

    #[test]
    fn analytics_url_carries_query_and_token() {
        let event = AnalyticsEvent::detail_viewed(&Siret::new("123"));
        assert_eq!(
            analytics_url(&event, "j=Boulanger&d=10", "t0k+n"),
            "/events/toggle-details/123?j=Boulanger&d=10&csrf_token=t0k%2Bn"
        );
        assert_eq!(
            analytics_url(&event, "", "abc"),
            "/events/toggle-details/123?csrf_token=abc"
        );
    }
}

use foundation::{LatLng, LatLngBounds, Siret};

use crate::map::Marker;

#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub siret: Siret,
    pub name: String,
    pub position: LatLng,
    pub short_description: String,
}

impl Company {
    /// Marker whose popup links to the result row; clicking it opens the row
    /// instead of navigating.
    pub fn marker(&self) -> Marker {
        Marker {
            siret: self.siret.clone(),
            position: self.position,
            popup_html: format!(
                "<a href=\"#company-{siret}\" data-siret=\"{siret}\">{name}</a>",
                siret = escape_html(self.siret.as_str()),
                name = escape_html(&self.name),
            ),
        }
    }
}

/// Companies of the current result page plus the search's own coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub companies: Vec<Company>,
    pub search_center: Option<LatLng>,
}

impl ResultSet {
    pub fn new(companies: Vec<Company>, search_center: Option<LatLng>) -> Self {
        Self {
            companies,
            search_center,
        }
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn find(&self, siret: &Siret) -> Option<&Company> {
        self.companies.iter().find(|c| &c.siret == siret)
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(self.companies.iter().map(|c| c.position))
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{Company, ResultSet};
    use foundation::{LatLng, Siret};
    use pretty_assertions::assert_eq;

    fn company(siret: &str, name: &str, lat: f64, lng: f64) -> Company {
        Company {
            siret: Siret::new(siret),
            name: name.to_string(),
            position: LatLng::new(lat, lng),
            short_description: String::new(),
        }
    }

    #[test]
    fn popup_links_to_the_result_row() {
        let m = company("123", "Boulangerie <Dupont> & fils", 1.0, 2.0).marker();
        assert_eq!(
            m.popup_html,
            "<a href=\"#company-123\" data-siret=\"123\">Boulangerie &lt;Dupont&gt; &amp; fils</a>"
        );
        assert_eq!(m.position, LatLng::new(1.0, 2.0));
    }

    #[test]
    fn finds_by_siret() {
        let rs = ResultSet::new(
            vec![company("1", "a", 0.0, 0.0), company("2", "b", 1.0, 1.0)],
            None,
        );
        assert_eq!(rs.find(&Siret::new("2")).map(|c| c.name.as_str()), Some("b"));
        assert!(rs.find(&Siret::new("3")).is_none());
    }
}

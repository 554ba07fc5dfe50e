use serde::{Deserialize, Serialize};

/// Mean Earth radius (kilometers), the sphere used by Web-Mercator tiles.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Parses a pair of form values such as `"48.8566"` / `"2.3522"`.
    ///
    /// Returns `None` when either value is empty, not a number, or not finite.
    pub fn parse(lat: &str, lng: &str) -> Option<Self> {
        let lat: f64 = lat.trim().parse().ok()?;
        let lng: f64 = lng.trim().parse().ok()?;
        let p = Self::new(lat, lng);
        p.is_finite().then_some(p)
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::LatLng;

    #[test]
    fn parses_form_values() {
        assert_eq!(
            LatLng::parse(" 48.85 ", "2.35"),
            Some(LatLng::new(48.85, 2.35))
        );
    }

    #[test]
    fn rejects_empty_and_non_finite_values() {
        assert_eq!(LatLng::parse("", "2.35"), None);
        assert_eq!(LatLng::parse("abc", "2.35"), None);
        assert_eq!(LatLng::parse("NaN", "2.35"), None);
        assert_eq!(LatLng::parse("48.0", "inf"), None);
    }
}

use std::fmt;

use foundation::LatLng;
use serde::{Deserialize, Serialize};

/// Page-level settings for the results map.
///
/// Every field has a default, so the page may embed any subset as JSON.
/// The search radii are fixed by the endpoint and are not configurable here;
/// unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSyncConfig {
    /// Zoom used for a single company, the search point, and detail maps.
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    /// Used when there are neither results nor search coordinates.
    #[serde(default = "default_fallback_center")]
    pub fallback_center: LatLng,
    #[serde(default = "default_fallback_zoom")]
    pub fallback_zoom: f64,

    #[serde(default = "default_refresh_endpoint")]
    pub refresh_endpoint: String,

    /// DOM id of the results map container.
    #[serde(default = "default_results_map_container")]
    pub results_map_container: String,

    /// DOM id of the region replaced by partial refreshes.
    #[serde(default = "default_content_region")]
    pub content_region: String,

    /// Initial state of the auto-refresh checkbox.
    #[serde(default)]
    pub auto_refresh: bool,
}

fn default_zoom() -> f64 {
    13.0
}

fn default_fallback_center() -> LatLng {
    // Metropolitan France.
    LatLng::new(46.6, 2.4)
}

fn default_fallback_zoom() -> f64 {
    5.0
}

fn default_refresh_endpoint() -> String {
    "/entreprises".to_string()
}

fn default_results_map_container() -> String {
    "lbb-result-map".to_string()
}

fn default_content_region() -> String {
    "content".to_string()
}

impl Default for MapSyncConfig {
    fn default() -> Self {
        Self {
            default_zoom: default_zoom(),
            fallback_center: default_fallback_center(),
            fallback_zoom: default_fallback_zoom(),
            refresh_endpoint: default_refresh_endpoint(),
            results_map_container: default_results_map_container(),
            content_region: default_content_region(),
            auto_refresh: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "invalid map config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl MapSyncConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Lenient loader: absent, empty, or broken config yields the defaults.
    pub fn load(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match Self::from_json(raw) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("{err}; using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, MapSyncConfig};
    use foundation::LatLng;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_all_defaults() {
        assert_eq!(MapSyncConfig::from_json("{}"), Ok(MapSyncConfig::default()));
    }

    #[test]
    fn partial_override() {
        let c = MapSyncConfig::from_json(
            r#"{"default_zoom": 12, "auto_refresh": true, "fallback_center": {"lat": 43.6, "lng": 1.44}}"#,
        )
        .expect("config");
        assert_eq!(c.default_zoom, 12.0);
        assert!(c.auto_refresh);
        assert_eq!(c.fallback_center, LatLng::new(43.6, 1.44));
        assert_eq!(c.refresh_endpoint, "/entreprises");
    }

    #[test]
    fn rejects_mistyped_values() {
        assert!(matches!(
            MapSyncConfig::from_json(r#"{"default_zoom": "close"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn search_radii_are_not_page_settings() {
        let c = MapSyncConfig::from_json(r#"{"distances_km": [1, 2], "viewport_margin": 1.0}"#)
            .expect("config");
        assert_eq!(c, MapSyncConfig::default());
    }

    #[test]
    fn lenient_loader_falls_back() {
        assert_eq!(MapSyncConfig::load(None), MapSyncConfig::default());
        assert_eq!(MapSyncConfig::load(Some("  ")), MapSyncConfig::default());
        assert_eq!(MapSyncConfig::load(Some("{not json")), MapSyncConfig::default());
        assert!(MapSyncConfig::load(Some(r#"{"auto_refresh": true}"#)).auto_refresh);
    }
}

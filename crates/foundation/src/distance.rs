use std::fmt;

use crate::math::ground_resolution_km;

/// Search radii understood by the search endpoint (kilometers, ascending).
///
/// The last entry is the catch-all maximum.
pub const DISTANCE_TABLE_KM: [u32; 6] = [5, 10, 30, 50, 100, 3000];

/// The viewport height is doubled so results just outside the visible box are
/// still included.
pub const VIEWPORT_MARGIN: f64 = 2.0;

/// A search radius that is guaranteed to be a member of its [`DistanceTable`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RadiusKm(u32);

impl RadiusKm {
    pub fn km(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RadiusKm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed search radii plus the margin applied to the viewport coverage.
///
/// Resolution contract:
/// - The result is always one of [`DISTANCE_TABLE_KM`].
/// - The first entry strictly greater than the coverage wins.
/// - Non-finite geometry resolves to the maximum entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    entries: Vec<u32>,
    margin: f64,
}

impl Default for DistanceTable {
    fn default() -> Self {
        Self {
            entries: DISTANCE_TABLE_KM.to_vec(),
            margin: VIEWPORT_MARGIN,
        }
    }
}

impl DistanceTable {
    pub fn max(&self) -> RadiusKm {
        RadiusKm(self.entries.last().copied().unwrap_or(DISTANCE_TABLE_KM[5]))
    }

    /// Returns the radius only if `km` is exactly a table entry.
    pub fn snap(&self, km: u32) -> Option<RadiusKm> {
        self.entries.contains(&km).then_some(RadiusKm(km))
    }

    /// Parses a form value (`"30"`) into a table radius.
    pub fn parse(&self, value: &str) -> Option<RadiusKm> {
        self.snap(value.trim().parse().ok()?)
    }

    /// Distance (km) the search must cover for a viewport, margin included.
    pub fn coverage_km(&self, lat_deg: f64, zoom: f64, viewport_height_px: f64) -> f64 {
        ground_resolution_km(lat_deg, zoom) * viewport_height_px * self.margin
    }

    /// Smallest entry strictly greater than `coverage_km`, else the maximum.
    pub fn bucket_for(&self, coverage_km: f64) -> RadiusKm {
        if !coverage_km.is_finite() {
            return self.max();
        }
        let coverage_km = coverage_km.max(0.0);
        self.entries
            .iter()
            .copied()
            .find(|&d| coverage_km < f64::from(d))
            .map(RadiusKm)
            .unwrap_or_else(|| self.max())
    }

    /// Resolves the search radius for the current map geometry.
    pub fn resolve(&self, lat_deg: f64, zoom: f64, viewport_height_px: f64) -> RadiusKm {
        self.bucket_for(self.coverage_km(lat_deg, zoom, viewport_height_px))
    }
}

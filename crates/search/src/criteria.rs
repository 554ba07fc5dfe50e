use std::collections::BTreeMap;

use foundation::{DistanceTable, LatLng, RadiusKm};

use crate::fields::FormFields;

/// Query parameter names understood by the search endpoint.
pub mod field {
    pub const JOB: &str = "j";
    /// Job typed before a related-occupation suggestion was followed.
    pub const INITIAL_JOB: &str = "ij";
    pub const OCCUPATION: &str = "occupation";
    pub const LOCATION: &str = "l";
    pub const LATITUDE: &str = "lat";
    pub const LONGITUDE: &str = "lon";
    pub const DEPARTMENTS: &str = "departments";
    pub const RADIUS: &str = "d";
    /// Business sector (NAF code).
    pub const SECTOR: &str = "naf";
    pub const HEADCOUNT: &str = "h";
    pub const SORT: &str = "sort";
    pub const TRAVEL_MODE: &str = "tr";
    pub const DURATION: &str = "dur";
    pub const AUDIENCE: &str = "p";

    /// Fields with a dedicated slot in `SearchCriteria`; the rest are filters.
    pub const CORE: [&str; 7] = [
        JOB,
        INITIAL_JOB,
        OCCUPATION,
        LOCATION,
        LATITUDE,
        LONGITUDE,
        RADIUS,
    ];
}

/// Typed, read-only view of the canonical form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub job: String,
    pub occupation_slug: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// `None` when the form holds no radius or one outside the table.
    pub radius_km: Option<RadiusKm>,
    pub filters: BTreeMap<String, String>,
}

impl SearchCriteria {
    pub fn from_fields(fields: &FormFields, table: &DistanceTable) -> Self {
        let text = |name: &str| fields.get(name).unwrap_or_default().trim().to_string();
        let number = |name: &str| {
            fields
                .get(name)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };

        let mut filters = BTreeMap::new();
        for (name, value) in fields.iter() {
            if field::CORE.contains(&name) || value.is_empty() {
                continue;
            }
            filters
                .entry(name.to_string())
                .or_insert_with(|| value.to_string());
        }

        Self {
            job: text(field::JOB),
            occupation_slug: text(field::OCCUPATION),
            location: text(field::LOCATION),
            latitude: number(field::LATITUDE),
            longitude: number(field::LONGITUDE),
            radius_km: fields.get(field::RADIUS).and_then(|v| table.parse(v)),
            filters,
        }
    }

    /// The search's own coordinates, when both are present.
    pub fn coordinates(&self) -> Option<LatLng> {
        Some(LatLng::new(self.latitude?, self.longitude?))
    }
}

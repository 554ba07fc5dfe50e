use std::fmt;

use foundation::{LatLng, LatLngBounds, Siret};

/// Map events the sync core listens to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MapEventKind {
    DragEnd,
    ZoomEnd,
    MarkerClick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    DragEnd,
    ZoomEnd,
    MarkerClick(Siret),
}

impl MapEvent {
    pub fn kind(&self) -> MapEventKind {
        match self {
            MapEvent::DragEnd => MapEventKind::DragEnd,
            MapEvent::ZoomEnd => MapEventKind::ZoomEnd,
            MapEvent::MarkerClick(_) => MapEventKind::MarkerClick,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub siret: Siret,
    pub position: LatLng,
    pub popup_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The rendering engine refused to start (no WebGL, old browser...).
    Unsupported(String),
    MissingContainer(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Unsupported(msg) => write!(f, "map engine unavailable: {msg}"),
            MapError::MissingContainer(id) => write!(f, "map container not found: {id}"),
        }
    }
}

impl std::error::Error for MapError {}

/// A live map widget.
pub trait MapHandle {
    fn center(&self) -> LatLng;
    fn zoom(&self) -> f64;
    /// Height of the map viewport in CSS pixels.
    fn height_px(&self) -> f64;
    fn set_view(&mut self, center: LatLng, zoom: f64);
    fn fit_bounds(&mut self, bounds: LatLngBounds);
    fn add_marker(&mut self, marker: Marker);
    /// Starts forwarding the given events to the page session.
    ///
    /// Called once per map instance, after the initial framing, so framing
    /// itself never reads as a user move.
    fn subscribe(&mut self, kinds: &[MapEventKind]);
}

/// The map rendering library.
pub trait MapEngine {
    fn create(
        &mut self,
        container_id: &str,
        center: LatLng,
        zoom: f64,
    ) -> Result<Box<dyn MapHandle>, MapError>;
}

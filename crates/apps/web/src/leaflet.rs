use std::rc::Rc;

use foundation::{LatLng, LatLngBounds, Siret};
use results::{MapEngine, MapError, MapEvent, MapEventKind, MapHandle, Marker};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

// Thin wrappers over the global `L` so the Rust side only sees plain values.
// Views never animate: framing must be final by the time `set_view` returns.
#[wasm_bindgen(inline_js = "
export function lbb_map_create(id, lat, lng, zoom) {
    if (typeof L === 'undefined') {
        throw new Error('Leaflet is not loaded');
    }
    if (!document.getElementById(id)) {
        throw new Error('missing container ' + id);
    }
    const map = L.map(id, { scrollWheelZoom: false });
    L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
        attribution: '&copy; OpenStreetMap contributors',
        maxZoom: 18,
    }).addTo(map);
    map.setView([lat, lng], zoom, { animate: false });
    return map;
}

export function lbb_map_lat(map) { return map.getCenter().lat; }
export function lbb_map_lng(map) { return map.getCenter().lng; }
export function lbb_map_zoom(map) { return map.getZoom(); }
export function lbb_map_height(map) { return map.getContainer().clientHeight; }

export function lbb_map_set_view(map, lat, lng, zoom) {
    map.setView([lat, lng], zoom, { animate: false });
}

export function lbb_map_fit_bounds(map, south, west, north, east) {
    map.fitBounds([[south, west], [north, east]], { animate: false });
}

export function lbb_map_add_marker(map, lat, lng, html) {
    L.marker([lat, lng]).addTo(map).bindPopup(html);
}

export function lbb_map_on(map, name, cb) {
    map.on(name, () => cb());
}

export function lbb_map_on_popup_link(map, cb) {
    map.on('popupopen', (e) => {
        const link = e.popup.getElement().querySelector('a[data-siret]');
        if (link) {
            link.addEventListener('click', (ev) => {
                ev.preventDefault();
                cb(link.dataset.siret);
            });
        }
    });
}

export function lbb_map_remove(map) { map.remove(); }
")]
extern "C" {
    type LeafletMap;

    #[wasm_bindgen(catch)]
    fn lbb_map_create(id: &str, lat: f64, lng: f64, zoom: f64) -> Result<LeafletMap, JsValue>;

    fn lbb_map_lat(map: &LeafletMap) -> f64;
    fn lbb_map_lng(map: &LeafletMap) -> f64;
    fn lbb_map_zoom(map: &LeafletMap) -> f64;
    fn lbb_map_height(map: &LeafletMap) -> f64;
    fn lbb_map_set_view(map: &LeafletMap, lat: f64, lng: f64, zoom: f64);
    fn lbb_map_fit_bounds(map: &LeafletMap, south: f64, west: f64, north: f64, east: f64);
    fn lbb_map_add_marker(map: &LeafletMap, lat: f64, lng: f64, html: &str);
    fn lbb_map_on(map: &LeafletMap, name: &str, cb: &Closure<dyn FnMut()>);
    fn lbb_map_on_popup_link(map: &LeafletMap, cb: &Closure<dyn FnMut(String)>);
    fn lbb_map_remove(map: &LeafletMap);
}

/// Receives map events. Must not re-enter the session synchronously.
pub type EventSink = Rc<dyn Fn(MapEvent)>;

/// Leaflet-backed [`MapEngine`].
pub struct LeafletEngine {
    sink: EventSink,
}

impl LeafletEngine {
    pub fn new(sink: EventSink) -> Self {
        Self { sink }
    }
}

impl MapEngine for LeafletEngine {
    fn create(
        &mut self,
        container_id: &str,
        center: LatLng,
        zoom: f64,
    ) -> Result<Box<dyn MapHandle>, MapError> {
        let map = lbb_map_create(container_id, center.lat, center.lng, zoom).map_err(|err| {
            let msg = err
                .as_string()
                .or_else(|| {
                    err.dyn_ref::<js_sys::Error>()
                        .map(|e| String::from(e.message()))
                })
                .unwrap_or_else(|| format!("{err:?}"));
            if msg.starts_with("missing container") {
                MapError::MissingContainer(container_id.to_string())
            } else {
                MapError::Unsupported(msg)
            }
        })?;
        Ok(Box::new(LeafletHandle {
            map,
            sink: self.sink.clone(),
            listeners: Vec::new(),
            popup_links: None,
        }))
    }
}

pub struct LeafletHandle {
    map: LeafletMap,
    sink: EventSink,
    // Listeners live as long as the map.
    listeners: Vec<Closure<dyn FnMut()>>,
    popup_links: Option<Closure<dyn FnMut(String)>>,
}

impl MapHandle for LeafletHandle {
    fn center(&self) -> LatLng {
        LatLng::new(lbb_map_lat(&self.map), lbb_map_lng(&self.map))
    }

    fn zoom(&self) -> f64 {
        lbb_map_zoom(&self.map)
    }

    fn height_px(&self) -> f64 {
        lbb_map_height(&self.map)
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        lbb_map_set_view(&self.map, center.lat, center.lng, zoom);
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds) {
        let sw = bounds.south_west;
        let ne = bounds.north_east;
        lbb_map_fit_bounds(&self.map, sw.lat, sw.lng, ne.lat, ne.lng);
    }

    fn add_marker(&mut self, marker: Marker) {
        lbb_map_add_marker(
            &self.map,
            marker.position.lat,
            marker.position.lng,
            &marker.popup_html,
        );
    }

    fn subscribe(&mut self, kinds: &[MapEventKind]) {
        for kind in kinds {
            match kind {
                MapEventKind::DragEnd => self.listen("dragend", MapEvent::DragEnd),
                MapEventKind::ZoomEnd => self.listen("zoomend", MapEvent::ZoomEnd),
                MapEventKind::MarkerClick => {
                    let sink = self.sink.clone();
                    let cb = Closure::<dyn FnMut(String)>::new(move |siret: String| {
                        sink(MapEvent::MarkerClick(Siret::new(siret)));
                    });
                    lbb_map_on_popup_link(&self.map, &cb);
                    self.popup_links = Some(cb);
                }
            }
        }
    }
}

impl LeafletHandle {
    fn listen(&mut self, name: &str, event: MapEvent) {
        let sink = self.sink.clone();
        let cb = Closure::<dyn FnMut()>::new(move || sink(event.clone()));
        lbb_map_on(&self.map, name, &cb);
        self.listeners.push(cb);
    }
}

impl Drop for LeafletHandle {
    fn drop(&mut self) {
        lbb_map_remove(&self.map);
    }
}

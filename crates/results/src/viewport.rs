use foundation::LatLng;

/// Last map position the user searched from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
}

/// Center and zoom are stored together or not at all.
///
/// Empty at every full page load; survives partial refreshes so a reloaded
/// result set does not snap the map away from where the user left it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ViewportStateStore {
    state: Option<Viewport>,
}

impl ViewportStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Viewport> {
        self.state
    }

    pub fn set(&mut self, center: LatLng, zoom: f64) {
        self.state = Some(Viewport { center, zoom });
    }

    pub fn clear(&mut self) {
        self.state = None;
    }
}

//! Browser bindings for the results page.
//!
//! The pure pieces (console line buffering, DOM attribute parsing, analytics
//! URLs) build everywhere so they can be unit tested natively. Everything
//! that touches `web_sys` or Leaflet is wasm32-only.

pub mod console;
pub mod markup;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod leaflet;
#[cfg(target_arch = "wasm32")]
mod net;
#[cfg(target_arch = "wasm32")]
mod session;

#[cfg(target_arch = "wasm32")]
pub use session::*;

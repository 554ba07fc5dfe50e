pub mod request;
pub mod tracker;
pub mod transport;

pub use request::*;
pub use tracker::*;
pub use transport::*;

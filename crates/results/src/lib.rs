pub mod analytics;
pub mod company;
pub mod config;
pub mod controller;
pub mod details;
pub mod map;
pub mod page;
pub mod viewport;

pub use analytics::*;
pub use company::*;
pub use config::*;
pub use controller::*;
pub use details::*;
pub use map::*;
pub use page::*;
pub use viewport::*;

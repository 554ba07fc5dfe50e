pub mod event_bus;
pub mod page;
pub mod tick;

pub use event_bus::*;
pub use page::*;
pub use tick::*;

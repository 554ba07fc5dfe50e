pub mod criteria;
pub mod dispatch;
pub mod fields;
pub mod form;

pub use criteria::*;
pub use dispatch::*;
pub use fields::*;
pub use form::*;

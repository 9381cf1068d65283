pub mod event_bus;
pub mod single_flight;

pub use event_bus::*;
pub use single_flight::*;

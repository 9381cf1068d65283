pub mod bounds;
pub mod geo;
pub mod math;
pub mod screen;
pub mod tile;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use geo::*;
pub use screen::*;
pub use tile::*;

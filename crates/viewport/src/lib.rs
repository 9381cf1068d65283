pub mod config;
pub mod projection;
pub mod state;

pub use config::*;
pub use projection::*;
pub use state::*;

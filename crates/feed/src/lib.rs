//! Beacon feed: transport decoding, record mapping and the refreshed list.
//!
//! Raw provider bytes go through [`decode`] (Base64, XOR, UTF-8, JSON,
//! geometry extraction) and land in a [`BeaconStore`], which swaps the whole
//! list on success and keeps the previous one on failure.

pub mod codec;
pub mod decode;
pub mod error;
pub mod geometry;
pub mod record;
pub mod store;
mod wire;

pub use codec::*;
pub use decode::*;
pub use error::*;
pub use geometry::*;
pub use record::*;
pub use store::*;

//! Common STAC types shared across the GeoCubes catalog crates.

pub mod asset;
pub mod bbox;
pub mod collection;
pub mod error;
pub mod gsd;
pub mod item;
pub mod time;

pub use asset::{Asset, AssetRole};
pub use bbox::BoundingBox;
pub use collection::{Collection, Extent, Link, Provider, Summaries};
pub use error::{StacError, StacResult};
pub use gsd::Gsd;
pub use item::{Item, ItemFootprint, ItemProperties};
pub use time::TimeWindow;

/// STAC specification version written into generated records.
pub const STAC_VERSION: &str = "1.0.0";

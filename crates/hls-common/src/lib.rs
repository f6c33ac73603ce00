//! Common types shared across the HLS tile finder crates.
//!
//! Covers the two pieces of the pipeline that carry real logic:
//! - resolving a latitude/longitude to a tiling-system tile id
//! - composing and parsing object keys for product/tile/date/version/band

pub mod date;
pub mod error;
pub mod object_key;
pub mod product;
pub mod tile_grid;

pub use date::{format_day_of_year, AcquisitionDate, MAX_DAY_OF_YEAR};
pub use error::{HlsError, HlsResult};
pub use object_key::{build_full_key, build_prefix, BandSuffix, KeyPrefix, ObjectKey, TileId};
pub use product::Product;
pub use tile_grid::{GeoQuery, GridIndex, TileExtent};

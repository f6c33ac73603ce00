//! HLS tile finder.
//!
//! Resolves a coordinate to its tiling-system tile, lists the HLS objects of
//! the requested acquisition and searches forward for the nearest
//! acquisition of the other product.

pub mod config;
pub mod finder;

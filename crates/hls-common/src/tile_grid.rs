//! Tiling-system lookup: geographic coordinate to tile id.
//!
//! The tiling system is published as a whitespace-delimited text table with
//! one row per tile and a header row naming the columns, for example:
//!
//! ```text
//! TilID   Xstart  Ystart  UZ  EPSG   MinLon    MaxLon    MinLat   MaxLat
//! 12TVM   399960  4700040 12  32612  -112.2093 -110.8790 41.5467  42.5394
//! ```
//!
//! Only `TilID`, `MinLat`, `MaxLat`, `MinLon` and `MaxLon` are used. Row order
//! is significant: neighbouring tiles overlap, and a point on an overlap
//! resolves to whichever tile appears first in the table.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{HlsError, HlsResult};

pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoQuery {
    pub lat: f64,
    pub lon: f64,
}

impl GeoQuery {
    /// Validate a coordinate.
    ///
    /// Non-finite values and degrees outside [-90, 90] / [-180, 180] are
    /// rejected here so that a `None` from [`GridIndex::resolve`] always
    /// means "valid point, no tile coverage".
    pub fn new(lat: f64, lon: f64) -> HlsResult<Self> {
        if !lat.is_finite()
            || !lon.is_finite()
            || !(MIN_LAT..=MAX_LAT).contains(&lat)
            || !(MIN_LON..=MAX_LON).contains(&lon)
        {
            return Err(HlsError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }
}

/// One tile of the tiling system with its geographic bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileExtent {
    pub tile_id: String,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl TileExtent {
    /// Check if a point lies within the box. All edges are inclusive.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Midpoint of the box as (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

/// Positions of the required columns within a row.
struct Columns {
    tile_id: usize,
    min_lat: usize,
    max_lat: usize,
    min_lon: usize,
    max_lon: usize,
}

impl Columns {
    fn from_header(header: &str) -> HlsResult<Self> {
        let names: Vec<&str> = header.split_whitespace().collect();
        let find = |name: &str| {
            names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(name))
                .ok_or_else(|| HlsError::GridLoad(format!("missing required column '{}'", name)))
        };

        Ok(Self {
            tile_id: find("TilID")?,
            min_lat: find("MinLat")?,
            max_lat: find("MaxLat")?,
            min_lon: find("MinLon")?,
            max_lon: find("MaxLon")?,
        })
    }

    fn width(&self) -> usize {
        [
            self.tile_id,
            self.min_lat,
            self.max_lat,
            self.min_lon,
            self.max_lon,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }

    fn parse_row(&self, line_no: usize, fields: &[&str]) -> HlsResult<TileExtent> {
        if fields.len() < self.width() {
            return Err(HlsError::GridLoad(format!(
                "line {}: expected at least {} columns, found {}",
                line_no,
                self.width(),
                fields.len()
            )));
        }

        let number = |idx: usize, name: &str| -> HlsResult<f64> {
            let raw = fields[idx];
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(HlsError::GridLoad(format!(
                    "line {}: {} '{}' is not a number",
                    line_no, name, raw
                ))),
            }
        };

        let extent = TileExtent {
            tile_id: fields[self.tile_id].to_string(),
            min_lat: number(self.min_lat, "MinLat")?,
            max_lat: number(self.max_lat, "MaxLat")?,
            min_lon: number(self.min_lon, "MinLon")?,
            max_lon: number(self.max_lon, "MaxLon")?,
        };

        if extent.min_lat > extent.max_lat || extent.min_lon > extent.max_lon {
            return Err(HlsError::GridLoad(format!(
                "line {}: tile {} has inverted bounds",
                line_no, extent.tile_id
            )));
        }

        Ok(extent)
    }
}

/// Immutable, ordered index of the tiling system.
///
/// Loaded once and never mutated, so it can be shared between threads
/// behind an `Arc` without locking.
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    tiles: Vec<TileExtent>,
}

impl GridIndex {
    /// Parse the tabular text form of the tiling system.
    pub fn parse(text: &str) -> HlsResult<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Read the tiling system table from a local file.
    pub fn from_path(path: impl AsRef<Path>) -> HlsResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| HlsError::GridLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse the table from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> HlsResult<Self> {
        let mut lines = reader.lines().enumerate();

        let columns = loop {
            let Some((_, line)) = lines.next() else {
                return Err(HlsError::GridLoad("grid source is empty".to_string()));
            };
            let line = line.map_err(|e| HlsError::GridLoad(e.to_string()))?;
            if !line.trim().is_empty() {
                break Columns::from_header(&line)?;
            }
        };

        let mut tiles = Vec::new();
        let mut seen = HashSet::new();

        for (idx, line) in lines {
            let line = line.map_err(|e| HlsError::GridLoad(e.to_string()))?;
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            let extent = columns.parse_row(line_no, &fields)?;

            if !seen.insert(extent.tile_id.clone()) {
                warn!(tile = %extent.tile_id, line = line_no, "Duplicate tile id in grid");
            }
            tiles.push(extent);
        }

        if tiles.is_empty() {
            return Err(HlsError::GridLoad("grid source has no tile rows".to_string()));
        }

        debug!(tiles = tiles.len(), "Parsed tile grid");
        Ok(Self { tiles })
    }

    /// First tile, in load order, whose box contains the point.
    pub fn resolve(&self, query: &GeoQuery) -> Option<&TileExtent> {
        self.tiles
            .iter()
            .find(|tile| tile.contains(query.lat, query.lon))
    }

    /// Validate a raw coordinate and resolve it.
    ///
    /// Returns `Ok(None)` for a valid point outside the tiling coverage.
    pub fn resolve_lat_lon(&self, lat: f64, lon: f64) -> HlsResult<Option<&TileExtent>> {
        let query = GeoQuery::new(lat, lon)?;
        Ok(self.resolve(&query))
    }

    /// Every tile containing the point, in load order.
    pub fn tiles_containing<'a>(
        &'a self,
        query: &'a GeoQuery,
    ) -> impl Iterator<Item = &'a TileExtent> + 'a {
        self.tiles
            .iter()
            .filter(move |tile| tile.contains(query.lat, query.lon))
    }

    /// Look up a tile by id (first occurrence).
    pub fn get(&self, tile_id: &str) -> Option<&TileExtent> {
        self.tiles.iter().find(|tile| tile.tile_id == tile_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileExtent> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

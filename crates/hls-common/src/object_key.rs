//! Object key layout for HLS assets.
//!
//! Every band of every acquisition is a separate object:
//!
//! ```text
//! S30/HLS.S30.T12TVM.2019001.v1.4_01.tif
//! └┬┘     └┬┘ └─┬──┘ └──┬──┘ └┬─┘└┬┘
//! product  │   tile    date  version band
//!       product
//! ```
//!
//! The part up to and including the date is the listing prefix for one
//! acquisition. Bands are appended either underscore-joined (`_01`, the
//! v1.4 convention) or as a dotted component (`.B04`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::date::AcquisitionDate;
use crate::error::{HlsError, HlsResult};
use crate::product::Product;

const KEY_EXTENSION: &str = ".tif";

/// Tiling-system tile identifier as used in object keys.
///
/// Object keys mark the tile with a leading `T` (`T12TVM`). Tile ids in the
/// tiling table start with the UTM zone number, so a `T` followed by a digit
/// is recognised as that marker and dropped: `"T12TVM"` and `"12TVM"` are the
/// same tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(String);

impl TileId {
    pub fn new(raw: &str) -> HlsResult<Self> {
        let raw = raw.trim();
        let id = match raw.strip_prefix('T') {
            Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
            _ => raw,
        };

        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(HlsError::invalid(
                "tile_id",
                format!("'{}' is not an alphanumeric tile id", raw),
            ));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TileId {
    type Err = HlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Band component of an object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandSuffix {
    /// `<version>_<name>`, e.g. `v1.4_01`
    Underscore(String),
    /// `<version>.<name>`, e.g. `v2.0.B04`
    Dotted(String),
}

fn validate_band_name(name: &str) -> HlsResult<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(HlsError::invalid(
            "band",
            format!("'{}' is not an alphanumeric band name", name),
        ));
    }
    Ok(())
}

impl BandSuffix {
    pub fn underscore(name: &str) -> HlsResult<Self> {
        validate_band_name(name)?;
        Ok(BandSuffix::Underscore(name.to_string()))
    }

    pub fn dotted(name: &str) -> HlsResult<Self> {
        validate_band_name(name)?;
        Ok(BandSuffix::Dotted(name.to_string()))
    }

    /// Zero-padded band number in the underscore convention (`_01`).
    pub fn numbered(band: u8) -> Self {
        BandSuffix::Underscore(format!("{:02}", band))
    }

    pub fn name(&self) -> &str {
        match self {
            BandSuffix::Underscore(name) | BandSuffix::Dotted(name) => name,
        }
    }
}

impl fmt::Display for BandSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandSuffix::Underscore(name) => write!(f, "_{}", name),
            BandSuffix::Dotted(name) => write!(f, ".{}", name),
        }
    }
}

impl FromStr for BandSuffix {
    type Err = HlsError;

    /// `"_01"` and `"01"` select the underscore form, `".B04"` the dotted one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix('.') {
            Self::dotted(name)
        } else {
            Self::underscore(s.strip_prefix('_').unwrap_or(s))
        }
    }
}

/// Check `v<major>[.<minor>]`.
fn validate_version(version: &str) -> HlsResult<()> {
    let valid = version
        .strip_prefix('v')
        .map(|rest| {
            let parts: Vec<&str> = rest.split('.').collect();
            parts.len() <= 2
                && parts
                    .iter()
                    .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
        })
        .unwrap_or(false);

    if !valid {
        return Err(HlsError::invalid(
            "version",
            format!("'{}' is not of the form v<major>[.<minor>]", version),
        ));
    }
    Ok(())
}

/// Listing prefix shared by all bands of one acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyPrefix {
    pub product: Product,
    pub tile_id: TileId,
    pub date: AcquisitionDate,
}

impl KeyPrefix {
    pub fn new(product: Product, tile_id: TileId, date: AcquisitionDate) -> Self {
        Self {
            product,
            tile_id,
            date,
        }
    }

    /// Same product and tile on another date.
    pub fn with_date(&self, date: AcquisitionDate) -> Self {
        Self {
            product: self.product,
            tile_id: self.tile_id.clone(),
            date,
        }
    }

    /// Full key for one band of this acquisition.
    pub fn key(&self, version: &str, band: Option<BandSuffix>) -> HlsResult<ObjectKey> {
        ObjectKey::new(self.clone(), version, band)
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{product}/HLS.{product}.T{tile}.{date}",
            product = self.product,
            tile = self.tile_id,
            date = self.date
        )
    }
}

/// Complete object key of a single asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    pub prefix: KeyPrefix,
    pub version: String,
    pub band: Option<BandSuffix>,
}

impl ObjectKey {
    /// A major-only version cannot take an all-digit dotted band:
    /// `v2.01` would read back as version `v2.01` with no band.
    pub fn new(prefix: KeyPrefix, version: &str, band: Option<BandSuffix>) -> HlsResult<Self> {
        validate_version(version)?;
        if let Some(BandSuffix::Dotted(name)) = &band {
            if !version.contains('.') && name.bytes().all(|b| b.is_ascii_digit()) {
                return Err(HlsError::invalid(
                    "band",
                    format!(
                        "dotted band '.{}' after major-only version '{}' is ambiguous",
                        name, version
                    ),
                ));
            }
        }
        Ok(Self {
            prefix,
            version: version.to_string(),
            band,
        })
    }

    /// Split a full key back into its components.
    pub fn parse(key: &str) -> HlsResult<Self> {
        let bad = |why: &str| HlsError::InvalidKey(format!("{}: {}", key, why));

        let (dir, name) = key.split_once('/').ok_or_else(|| bad("no product directory"))?;
        let product: Product = dir.parse().map_err(|_| bad("unknown product"))?;

        let rest = name
            .strip_prefix("HLS.")
            .and_then(|r| r.strip_prefix(product.as_str()))
            .and_then(|r| r.strip_prefix(".T"))
            .ok_or_else(|| bad("name does not match product directory"))?;
        let rest = rest
            .strip_suffix(KEY_EXTENSION)
            .ok_or_else(|| bad("missing .tif extension"))?;

        let (tile, rest) = rest.split_once('.').ok_or_else(|| bad("missing date"))?;
        let (date, rest) = rest.split_once('.').ok_or_else(|| bad("missing version"))?;

        let tile_id = TileId::new(tile).map_err(|_| bad("invalid tile id"))?;
        let date: AcquisitionDate = date.parse().map_err(|_| bad("invalid date"))?;

        let (version, band) = split_version_band(rest).ok_or_else(|| bad("invalid version"))?;
        validate_version(&version).map_err(|_| bad("invalid version"))?;
        if let Some(band) = &band {
            validate_band_name(band.name()).map_err(|_| bad("invalid band"))?;
        }

        Ok(Self {
            prefix: KeyPrefix::new(product, tile_id, date),
            version,
            band,
        })
    }

    /// Last path component, e.g. `HLS.S30.T12TVM.2019001.v1.4_01.tif`.
    pub fn file_name(&self) -> String {
        let key = self.to_string();
        match key.split_once('/') {
            Some((_, name)) => name.to_string(),
            None => key,
        }
    }
}

/// Split `v1.4_01`, `v1.4.01`, `v2.0.B04` or `v1.4` into version and band.
///
/// An underscore always separates the band. Without one, the version takes
/// `v<major>` plus a following all-digit component, and anything left over
/// is a dotted band.
fn split_version_band(rest: &str) -> Option<(String, Option<BandSuffix>)> {
    if let Some((version, band)) = rest.rsplit_once('_') {
        return Some((
            version.to_string(),
            Some(BandSuffix::Underscore(band.to_string())),
        ));
    }

    let mut parts = rest.split('.');
    let major = parts.next()?;
    let remaining: Vec<&str> = parts.collect();

    let (version, band_parts) = match remaining.split_first() {
        Some((minor, tail)) if !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()) => {
            (format!("{}.{}", major, minor), tail)
        }
        _ => (major.to_string(), remaining.as_slice()),
    };

    match band_parts {
        [] => Some((version, None)),
        [band] => Some((version, Some(BandSuffix::Dotted(band.to_string())))),
        _ => None,
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.prefix, self.version)?;
        if let Some(band) = &self.band {
            write!(f, "{}", band)?;
        }
        f.write_str(KEY_EXTENSION)
    }
}

impl FromStr for ObjectKey {
    type Err = HlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Listing prefix from string components.
///
/// ```
/// use hls_common::build_prefix;
///
/// let prefix = build_prefix("S30", "T12ABC", "2019", "001").unwrap();
/// assert_eq!(prefix, "S30/HLS.S30.T12ABC.2019001");
/// ```
pub fn build_prefix(product: &str, tile_id: &str, year: &str, day_of_year: &str) -> HlsResult<String> {
    let prefix = KeyPrefix::new(
        product.parse()?,
        TileId::new(tile_id)?,
        AcquisitionDate::parse_parts(year, day_of_year)?,
    );
    Ok(prefix.to_string())
}

/// Full object key from string components.
///
/// `band` is given as `"_01"` / `"01"` for the underscore convention or
/// `".01"` for the dotted one.
pub fn build_full_key(
    product: &str,
    tile_id: &str,
    year: &str,
    day_of_year: &str,
    version: &str,
    band: &str,
) -> HlsResult<String> {
    let prefix = KeyPrefix::new(
        product.parse()?,
        TileId::new(tile_id)?,
        AcquisitionDate::parse_parts(year, day_of_year)?,
    );
    let key = prefix.key(version, Some(band.parse()?))?;
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prefix() {
        assert_eq!(
            build_prefix("S30", "T12ABC", "2019", "001").unwrap(),
            "S30/HLS.S30.T12ABC.2019001"
        );
        assert_eq!(
            build_prefix("L30", "12TVM", "2019", "5").unwrap(),
            "L30/HLS.L30.T12TVM.2019005"
        );
    }

    #[test]
    fn test_build_prefix_rejects_bad_input() {
        assert!(build_prefix("X30", "12TVM", "2019", "001").is_err());
        assert!(build_prefix("S30", "", "2019", "001").is_err());
        assert!(build_prefix("S30", "12-TVM", "2019", "001").is_err());
        assert!(build_prefix("S30", "12TVM", "219", "001").is_err());
        assert!(build_prefix("S30", "12TVM", "2019", "000").is_err());
        assert!(build_prefix("S30", "12TVM", "2019", "367").is_err());
    }

    #[test]
    fn test_build_full_key_band_conventions() {
        assert_eq!(
            build_full_key("S30", "12TVM", "2019", "001", "v1.4", "_01").unwrap(),
            "S30/HLS.S30.T12TVM.2019001.v1.4_01.tif"
        );
        assert_eq!(
            build_full_key("S30", "12TVM", "2019", "001", "v1.4", "01").unwrap(),
            "S30/HLS.S30.T12TVM.2019001.v1.4_01.tif"
        );
        assert_eq!(
            build_full_key("L30", "12TVM", "2019", "001", "v2.0", ".B04").unwrap(),
            "L30/HLS.L30.T12TVM.2019001.v2.0.B04.tif"
        );
        assert!(build_full_key("S30", "12TVM", "2019", "001", "1.4", "_01").is_err());
        assert!(build_full_key("S30", "12TVM", "2019", "001", "v1.4", "_").is_err());
    }

    #[test]
    fn test_tile_id_marker() {
        assert_eq!(TileId::new("T12TVM").unwrap().as_str(), "12TVM");
        assert_eq!(TileId::new("12TVM").unwrap().as_str(), "12TVM");
        // A leading T that is not followed by a digit is part of the id
        assert_eq!(TileId::new("TABC").unwrap().as_str(), "TABC");
        assert!(TileId::new("T").is_ok());
        assert!(TileId::new(" ").is_err());
    }

    #[test]
    fn test_parse_key_underscore_band() {
        let key = ObjectKey::parse("S30/HLS.S30.T12TVM.2019001.v1.4_01.tif").unwrap();
        assert_eq!(key.prefix.product, Product::S30);
        assert_eq!(key.prefix.tile_id.as_str(), "12TVM");
        assert_eq!(key.prefix.date.to_string(), "2019001");
        assert_eq!(key.version, "v1.4");
        assert_eq!(key.band, Some(BandSuffix::Underscore("01".to_string())));
    }

    #[test]
    fn test_parse_key_dotted_band() {
        let key = ObjectKey::parse("L30/HLS.L30.T12TVM.2019005.v1.4.Fmask.tif").unwrap();
        assert_eq!(key.version, "v1.4");
        assert_eq!(key.band, Some(BandSuffix::Dotted("Fmask".to_string())));

        let key = ObjectKey::parse("L30/HLS.L30.T12TVM.2019005.v2.B04.tif").unwrap();
        assert_eq!(key.version, "v2");
        assert_eq!(key.band, Some(BandSuffix::Dotted("B04".to_string())));
    }

    #[test]
    fn test_parse_key_without_band() {
        let key = ObjectKey::parse("S30/HLS.S30.T12TVM.2019001.v1.4.tif").unwrap();
        assert_eq!(key.version, "v1.4");
        assert!(key.band.is_none());
        assert_eq!(key.to_string(), "S30/HLS.S30.T12TVM.2019001.v1.4.tif");
    }

    #[test]
    fn test_parse_key_rejects_malformed() {
        for key in [
            "HLS.S30.T12TVM.2019001.v1.4_01.tif",
            "S30/HLS.L30.T12TVM.2019001.v1.4_01.tif",
            "S30/HLS.S30.T12TVM.2019001.v1.4_01.jp2",
            "S30/HLS.S30.T12TVM.201901.v1.4_01.tif",
            "S30/HLS.S30.T12TVM.2019001.tif",
            "S30/HLS.S30.T12TVM.2019001.v1.4.a.b.tif",
            "S30/HLS.S30.12TVM.2019001.v1.4_01.tif",
        ] {
            assert!(
                matches!(ObjectKey::parse(key), Err(HlsError::InvalidKey(_))),
                "expected {} to be rejected",
                key
            );
        }
    }

    #[test]
    fn test_file_name() {
        let key = ObjectKey::parse("S30/HLS.S30.T12TVM.2019001.v1.4_01.tif").unwrap();
        assert_eq!(key.file_name(), "HLS.S30.T12TVM.2019001.v1.4_01.tif");
    }
}

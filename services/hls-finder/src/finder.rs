//! The lookup pipeline: coordinate to tile, tile to prefix, prefix to
//! objects, and the forward search for the other product.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hls_common::{
    AcquisitionDate, BandSuffix, GeoQuery, GridIndex, HlsResult, KeyPrefix, Product, TileId,
};
use reqwest::Client;
use serde::{Serialize, Serializer};
use storage::{download_object, Acquisition, AvailabilityProber, BlobLister, SasToken, StorageLocation};
use tracing::{info, instrument, warn};

/// One lookup.
#[derive(Debug, Clone)]
pub struct FindRequest {
    pub lat: f64,
    pub lon: f64,
    pub date: AcquisitionDate,
    pub product: Product,
    pub version: String,
    /// Probe budget for the other product's search.
    pub max_days: u32,
}

/// An object and its signed URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectLink {
    pub key: String,
    pub url: String,
}

/// Objects listed for one product at one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductReport {
    pub product: Product,
    #[serde(serialize_with = "display_prefix")]
    pub prefix: KeyPrefix,
    pub date: AcquisitionDate,
    pub objects: Vec<ObjectLink>,
}

fn display_prefix<S: Serializer>(prefix: &KeyPrefix, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(prefix)
}

impl ProductReport {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindReport {
    pub tile_id: String,
    /// Requested product at the requested date; may list nothing.
    pub requested: ProductReport,
    /// First acquisition of the other product on or after the date.
    pub other: Option<ProductReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FindOutcome {
    /// No tile covers the coordinate.
    Uncovered { lat: f64, lon: f64 },
    Found(FindReport),
}

/// Ties the grid, the prober and the storage location together.
pub struct Finder<L> {
    grid: Arc<GridIndex>,
    prober: AvailabilityProber<L>,
    location: StorageLocation,
    token: SasToken,
}

impl<L: BlobLister> Finder<L> {
    pub fn new(grid: Arc<GridIndex>, lister: L, location: StorageLocation, token: SasToken) -> Self {
        Self {
            grid,
            prober: AvailabilityProber::new(lister),
            location,
            token,
        }
    }

    fn report(&self, prefix: &KeyPrefix, keys: Vec<String>) -> ProductReport {
        let objects = keys
            .into_iter()
            .map(|key| ObjectLink {
                url: self.location.url_for(&key, self.token.query()),
                key,
            })
            .collect();

        ProductReport {
            product: prefix.product,
            prefix: prefix.clone(),
            date: prefix.date,
            objects,
        }
    }

    #[instrument(skip(self, request), fields(lat = request.lat, lon = request.lon, product = %request.product))]
    pub async fn find(&self, request: &FindRequest) -> HlsResult<FindOutcome> {
        let query = GeoQuery::new(request.lat, request.lon)?;
        let Some(tile) = self.grid.resolve(&query) else {
            info!("Coordinate is outside the tiling system");
            return Ok(FindOutcome::Uncovered {
                lat: request.lat,
                lon: request.lon,
            });
        };
        info!(tile = %tile.tile_id, "Resolved tile");

        let tile_id = TileId::new(&tile.tile_id)?;
        let prefix = KeyPrefix::new(request.product, tile_id, request.date);
        let keys = self.prober.collect_matching(&prefix.to_string()).await?;
        if keys.is_empty() {
            info!(prefix = %prefix, "No objects for requested acquisition");
        }
        let requested = self.report(&prefix, keys);

        let other_start = KeyPrefix::new(
            request.product.other(),
            prefix.tile_id.clone(),
            request.date,
        );
        let other = self
            .prober
            .find_nearest(&other_start, request.max_days)
            .await?
            .map(|Acquisition { prefix, keys }| self.report(&prefix, keys));

        Ok(FindOutcome::Found(FindReport {
            tile_id: tile.tile_id.clone(),
            requested,
            other,
        }))
    }

    /// Download one band of a listed acquisition into `dir`.
    ///
    /// Prefers the key built from `version`, then any listed key with the
    /// band. Returns `None` if the acquisition has no such band.
    pub async fn download_band(
        &self,
        client: &Client,
        report: &ProductReport,
        version: &str,
        band: &BandSuffix,
        dir: &Path,
    ) -> HlsResult<Option<PathBuf>> {
        let Some(link) = select_band(report, version, band) else {
            warn!(prefix = %report.prefix, band = %band, "Band not listed, skipping download");
            return Ok(None);
        };

        let file_name = link.key.rsplit('/').next().unwrap_or(&link.key);
        let dest = dir.join(file_name);
        download_object(client, &link.url, &dest).await?;
        Ok(Some(dest))
    }
}

fn select_band<'r>(
    report: &'r ProductReport,
    version: &str,
    band: &BandSuffix,
) -> Option<&'r ObjectLink> {
    // Some version/band pairs cannot form a key; those fall through to
    // matching by band alone
    if let Ok(expected) = report.prefix.key(version, Some(band.clone())) {
        let expected = expected.to_string();
        if let Some(link) = report.objects.iter().find(|link| link.key == expected) {
            return Some(link);
        }
    }

    let acquisition = Acquisition {
        prefix: report.prefix.clone(),
        keys: report.objects.iter().map(|link| link.key.clone()).collect(),
    };
    let key = acquisition.key_for_band(band)?;
    report.objects.iter().find(|link| link.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(key: &str) -> ObjectLink {
        ObjectLink {
            key: key.to_string(),
            url: format!("https://a/hls/{}?sig=x", key),
        }
    }

    fn report(keys: &[&str]) -> ProductReport {
        let date = AcquisitionDate::new(2019, 1).unwrap();
        ProductReport {
            product: Product::S30,
            prefix: KeyPrefix::new(Product::S30, TileId::new("12TVM").unwrap(), date),
            date,
            objects: keys.iter().map(|k| link(k)).collect(),
        }
    }

    #[test]
    fn test_select_band_prefers_version() {
        let report = report(&[
            "S30/HLS.S30.T12TVM.2019001.v1.3_01.tif",
            "S30/HLS.S30.T12TVM.2019001.v1.4_01.tif",
        ]);
        let selected = select_band(&report, "v1.4", &BandSuffix::numbered(1)).unwrap();
        assert_eq!(selected.key, "S30/HLS.S30.T12TVM.2019001.v1.4_01.tif");
    }

    #[test]
    fn test_select_band_falls_back_to_any_version() {
        let report = report(&["S30/HLS.S30.T12TVM.2019001.v1.3_01.tif"]);
        let selected = select_band(&report, "v1.4", &BandSuffix::numbered(1)).unwrap();
        assert_eq!(selected.key, "S30/HLS.S30.T12TVM.2019001.v1.3_01.tif");

        assert!(select_band(&report, "v1.4", &BandSuffix::numbered(2)).is_none());
    }

    #[test]
    fn test_select_band_ignores_non_band_objects() {
        let report = report(&[
            "S30/HLS.S30.T12TVM.2019001.v1.4.jpg",
            "S30/HLS.S30.T12TVM.2019001.v1.4.cmr.xml",
            "S30/HLS.S30.T12TVM.2019001.v1.3_01.tif",
        ]);
        let selected = select_band(&report, "v1.4", &BandSuffix::numbered(1)).unwrap();
        assert_eq!(selected.key, "S30/HLS.S30.T12TVM.2019001.v1.3_01.tif");

        let report = self::report(&[
            "S30/HLS.S30.T12TVM.2019001.v1.4.jpg",
            "S30/HLS.S30.T12TVM.2019001.v1.4_01.tif",
        ]);
        let selected = select_band(&report, "v1.4", &BandSuffix::numbered(1)).unwrap();
        assert_eq!(selected.key, "S30/HLS.S30.T12TVM.2019001.v1.4_01.tif");
    }

    #[test]
    fn test_select_band_empty_report() {
        assert!(select_band(&report(&[]), "v1.4", &BandSuffix::numbered(1)).is_none());
    }

    #[test]
    fn test_report_serializes_prefix_as_text() {
        let json = serde_json::to_value(report(&[])).unwrap();
        assert_eq!(json["prefix"], "S30/HLS.S30.T12TVM.2019001");
    }
}

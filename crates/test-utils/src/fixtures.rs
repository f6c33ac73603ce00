//! Common test fixtures for tile lookup and key building.

/// Bear Lake, UT. Lies inside tile 12TVM and no other tile of [`UTAH_GRID`].
pub const BEAR_LAKE: (f64, f64) = (41.8966, -111.4132);

/// Tile covering [`BEAR_LAKE`].
pub const BEAR_LAKE_TILE: &str = "12TVM";

/// A point covered by both 12TVL and 12TVM; 12TVL comes first in the table.
pub const VL_VM_OVERLAP: (f64, f64) = (41.6, -111.5);

/// Gulf of Guinea, far from every tile in [`UTAH_GRID`].
pub const NULL_ISLAND: (f64, f64) = (0.0, 0.0);

/// Excerpt of the tiling system table around northern Utah.
///
/// Same column layout as the published table; rows keep the UTM overlap
/// between neighbouring tiles.
pub const UTAH_GRID: &str = "\
TilID Xstart Ystart UZ EPSG MinLon MaxLon MinLat MaxLat
12TUM 299960 4700040 12 32612 -113.4021 -112.0629 41.5209 42.5356
12TVL 399960 4600020 12 32612 -112.2001 -110.8853 40.6462 41.6440
12TVM 399960 4700040 12 32612 -112.2093 -110.8790 41.5467 42.5394
12TWM 499980 4700040 12 32612 -111.0002 -109.6706 41.5476 42.5402
";

/// Object keys present for 12TVM on 2019-001 in the public container.
pub mod keys {
    pub const S30_PREFIX: &str = "S30/HLS.S30.T12TVM.2019001";
    pub const S30_BAND_01: &str = "S30/HLS.S30.T12TVM.2019001.v1.4_01.tif";
    pub const S30_BAND_02: &str = "S30/HLS.S30.T12TVM.2019001.v1.4_02.tif";
    pub const L30_DAY_005_BAND_01: &str = "L30/HLS.L30.T12TVM.2019005.v1.4_01.tif";
    pub const L30_DAY_005_BAND_02: &str = "L30/HLS.L30.T12TVM.2019005.v1.4_02.tif";
}

/// Azure "List Blobs" response bodies.
pub mod azure {
    /// Single page, two blobs, no continuation marker.
    pub const LIST_SINGLE_PAGE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://hlssa.blob.core.windows.net/" ContainerName="hls">
  <Prefix>S30/HLS.S30.T12TVM.2019001</Prefix>
  <Blobs>
    <Blob>
      <Name>S30/HLS.S30.T12TVM.2019001.v1.4_01.tif</Name>
      <Properties><Content-Length>42197611</Content-Length></Properties>
    </Blob>
    <Blob>
      <Name>S30/HLS.S30.T12TVM.2019001.v1.4_02.tif</Name>
      <Properties><Content-Length>42218503</Content-Length></Properties>
    </Blob>
  </Blobs>
  <NextMarker />
</EnumerationResults>"#;

    /// First page of a paginated listing.
    pub const LIST_FIRST_PAGE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ContainerName="hls">
  <Prefix>S30/HLS.S30.T12TVM.2019001</Prefix>
  <MaxResults>1</MaxResults>
  <Blobs>
    <Blob><Name>S30/HLS.S30.T12TVM.2019001.v1.4_01.tif</Name></Blob>
  </Blobs>
  <NextMarker>2!92!MDAwMDI0IVMzMC9ITFMuUzMwLlQxMlRWTS4yMDE5MDAxLnYxLjRfMDIudGlm</NextMarker>
</EnumerationResults>"#;

    /// Empty listing.
    pub const LIST_EMPTY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ContainerName="hls">
  <Prefix>S30/HLS.S30.T12TVM.2019002</Prefix>
  <Blobs />
  <NextMarker />
</EnumerationResults>"#;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utah_grid_has_header_and_rows() {
        let lines: Vec<&str> = UTAH_GRID.lines().collect();
        assert!(lines[0].starts_with("TilID"));
        assert_eq!(lines.len(), 5);
    }
}

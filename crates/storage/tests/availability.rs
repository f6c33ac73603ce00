//! End-to-end lookup against an in-memory object store.

use std::sync::Arc;

use bytes::Bytes;
use hls_common::{AcquisitionDate, GridIndex, KeyPrefix, Product, TileId};
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::ObjectStore;
use storage::{AvailabilityProber, ObjectStoreLister, StorageLocation};
use test_utils::fixtures::{keys, BEAR_LAKE, BEAR_LAKE_TILE, UTAH_GRID};

async fn store_with(keys: &[&str]) -> Arc<InMemory> {
    let store = Arc::new(InMemory::new());
    for key in keys {
        store
            .put(&Path::from(*key), Bytes::from_static(b"II*\0"))
            .await
            .unwrap();
    }
    store
}

fn bear_lake_prefix(product: Product, day: u32) -> KeyPrefix {
    let grid = GridIndex::parse(UTAH_GRID).unwrap();
    let (lat, lon) = BEAR_LAKE;
    let tile = grid.resolve_lat_lon(lat, lon).unwrap().unwrap();
    assert_eq!(tile.tile_id, BEAR_LAKE_TILE);

    KeyPrefix::new(
        product,
        TileId::new(&tile.tile_id).unwrap(),
        AcquisitionDate::new(2019, day).unwrap(),
    )
}

#[tokio::test]
async fn test_bear_lake_empty_store() {
    let prober = AvailabilityProber::new(ObjectStoreLister::new(store_with(&[]).await));
    let prefix = bear_lake_prefix(Product::S30, 1);
    assert_eq!(prefix.to_string(), keys::S30_PREFIX);

    let found = prober.collect_matching(&prefix.to_string()).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_bear_lake_single_object() {
    let store = store_with(&[keys::S30_BAND_01]).await;
    let prober = AvailabilityProber::new(ObjectStoreLister::new(store));
    let prefix = bear_lake_prefix(Product::S30, 1);

    let found = prober.collect_matching(&prefix.to_string()).await.unwrap();
    assert_eq!(found, vec![keys::S30_BAND_01]);

    let location = StorageLocation::new("https://hlssa.blob.core.windows.net/", "hls");
    assert_eq!(
        location.url_for(&found[0], "sv=2021&sig=x"),
        "https://hlssa.blob.core.windows.net/hls/S30/HLS.S30.T12TVM.2019001.v1.4_01.tif?sv=2021&sig=x"
    );
}

#[tokio::test]
async fn test_day_stepping_stops_at_first_match() {
    let store = store_with(&[
        keys::L30_DAY_005_BAND_01,
        keys::L30_DAY_005_BAND_02,
        "L30/HLS.L30.T12TVM.2019009.v1.4_01.tif",
    ])
    .await;
    let prober = AvailabilityProber::new(ObjectStoreLister::new(store));

    let acquisition = prober
        .find_nearest(&bear_lake_prefix(Product::L30, 1), 366)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(acquisition.prefix.date.day_of_year(), 5);
    assert_eq!(acquisition.prefix.to_string(), "L30/HLS.L30.T12TVM.2019005");
    let mut found = acquisition.keys.clone();
    found.sort();
    assert_eq!(found, vec![keys::L30_DAY_005_BAND_01, keys::L30_DAY_005_BAND_02]);
}

#[tokio::test]
async fn test_day_stepping_exhausted() {
    let store = store_with(&[keys::S30_BAND_01]).await;
    let prober = AvailabilityProber::new(ObjectStoreLister::new(store));

    // Only S30 objects exist, so the L30 search runs dry
    let acquisition = prober
        .find_nearest(&bear_lake_prefix(Product::L30, 1), 30)
        .await
        .unwrap();
    assert!(acquisition.is_none());
}

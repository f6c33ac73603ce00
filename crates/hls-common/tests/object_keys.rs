//! Object key construction and parsing.

use hls_common::{
    build_full_key, build_prefix, format_day_of_year, AcquisitionDate, BandSuffix, HlsError,
    KeyPrefix, ObjectKey, Product, TileId,
};

#[test]
fn test_reference_prefix() {
    assert_eq!(
        build_prefix("S30", "T12ABC", "2019", "001").unwrap(),
        "S30/HLS.S30.T12ABC.2019001"
    );
}

#[test]
fn test_full_key_round_trips() {
    let cases = [
        ("S30", "T12ABC", "2019", "001", "v1.4", "_01"),
        ("L30", "12TVM", "2020", "366", "v1.4", "_11"),
        ("S30", "12TVM", "2019", "045", "v2.0", ".B8A"),
        ("L30", "60WXT", "2021", "200", "v1", ".Fmask"),
        ("S30", "12TVM", "2019", "001", "v2.0", ".01"),
    ];

    for (product, tile, year, day, version, band) in cases {
        let key = build_full_key(product, tile, year, day, version, band).unwrap();
        let parsed = ObjectKey::parse(&key).unwrap();

        assert_eq!(parsed.prefix.product, product.parse::<Product>().unwrap());
        assert_eq!(parsed.prefix.tile_id, TileId::new(tile).unwrap());
        assert_eq!(parsed.prefix.date.year_str(), year);
        assert_eq!(parsed.prefix.date.day_str(), day);
        assert_eq!(parsed.version, version);
        assert_eq!(parsed.band, Some(band.parse::<BandSuffix>().unwrap()));
        assert_eq!(parsed.to_string(), key);
    }

    // `v2.01.tif` would parse back as version v2.01 without a band
    assert!(matches!(
        build_full_key("S30", "12TVM", "2019", "001", "v2", ".01"),
        Err(HlsError::InvalidArgument { .. })
    ));
}

#[test]
fn test_day_of_year_formatting() {
    assert_eq!(format_day_of_year(1).unwrap(), "001");
    assert_eq!(format_day_of_year(366).unwrap(), "366");
    assert!(matches!(
        format_day_of_year(0),
        Err(HlsError::InvalidArgument { .. })
    ));
    assert!(matches!(
        format_day_of_year(367),
        Err(HlsError::InvalidArgument { .. })
    ));
}

#[test]
fn test_typed_builder_matches_string_builder() {
    let prefix = KeyPrefix::new(
        Product::L30,
        TileId::new("12TVM").unwrap(),
        AcquisitionDate::new(2019, 5).unwrap(),
    );
    let key = prefix.key("v1.4", Some(BandSuffix::numbered(1))).unwrap();

    assert_eq!(
        prefix.to_string(),
        build_prefix("L30", "12TVM", "2019", "005").unwrap()
    );
    assert_eq!(
        key.to_string(),
        build_full_key("L30", "12TVM", "2019", "005", "v1.4", "_01").unwrap()
    );
    assert!(key.to_string().starts_with(&prefix.to_string()));
}

#[test]
fn test_with_date_keeps_product_and_tile() {
    let prefix = KeyPrefix::new(
        Product::S30,
        TileId::new("12TVM").unwrap(),
        AcquisitionDate::new(2019, 1).unwrap(),
    );
    let next = prefix.with_date(AcquisitionDate::new(2019, 2).unwrap());
    assert_eq!(next.to_string(), "S30/HLS.S30.T12TVM.2019002");
}

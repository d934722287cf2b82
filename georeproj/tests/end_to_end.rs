use approx::assert_abs_diff_eq;
use assert_matches::assert_matches;
use geo_types::Coord;
use georeproj::error::{ConfigurationError, SerializationError};
use georeproj::transform::{
    CoordinateTransformation, NamedTransformation, TransformType, TransformationCatalog,
    TransformationConfig,
};
use georeproj::{resolve, AnyGeometry, Geometry, LineGeometry, PointGeometry, PolygonGeometry};
use serde_json::{json, Value};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn api_point() -> PointGeometry {
    PointGeometry::new(
        Some(&json!({"longitude": -82.3775, "latitude": 35.0806})),
        None,
        Some(resolve(4326).unwrap()),
    )
    .unwrap()
}

#[test]
fn api_point_to_web_mercator_esri_json() {
    init_logger();

    let config = TransformationConfig::from_json(r#"{"spatial_reference": "3857"}"#).unwrap();
    let transformation = CoordinateTransformation::new(config).unwrap();

    let mut point = api_point();
    transformation.transform(&mut point).unwrap();

    let esri: Value = serde_json::from_str(&point.to_esri_json().unwrap()).unwrap();
    assert_eq!(esri["spatialReference"]["wkid"], json!(3857));
    assert_abs_diff_eq!(esri["x"].as_f64().unwrap(), -9_170_221.352822894, epsilon = 1e-3);
    assert_abs_diff_eq!(esri["y"].as_f64().unwrap(), 4_174_839.7637739033, epsilon = 1e-3);

    assert_eq!(
        point.raw_input(),
        Some(&json!({"longitude": -82.3775, "latitude": 35.0806}))
    );
}

#[test]
fn web_mercator_round_trip() {
    init_logger();

    let to_mercator = CoordinateTransformation::new(TransformationConfig::reproject(3857)).unwrap();
    let to_wgs84 = CoordinateTransformation::new(TransformationConfig::reproject(4326)).unwrap();

    let mut line = LineGeometry::new(
        Some(&json!([
            {"longitude": -82.3775, "latitude": 35.0806},
            {"longitude": -82.0, "latitude": 35.5},
            {"longitude": 12.5, "latitude": 55.7},
        ])),
        Some(resolve(4326).unwrap()),
    )
    .unwrap();
    let original = line.points().unwrap();

    to_mercator.transform(&mut line).unwrap();
    to_wgs84.transform(&mut line).unwrap();

    for (result, expected) in line.points().unwrap().iter().zip(&original) {
        assert_abs_diff_eq!(result.x, expected.x, epsilon = 1e-7);
        assert_abs_diff_eq!(result.y, expected.y, epsilon = 1e-7);
    }
    assert_eq!(line.spatial_reference().map(|s| s.epsg()), Some(4326));
}

#[test]
fn out_of_range_transform_index_fails_at_setup() {
    init_logger();

    let config = TransformationConfig::from_json(
        r#"{
            "spatial_reference": 4326,
            "source_reference": 4230,
            "transform_type": "REPROJECT_WITH_TRANSFORM",
            "transform_idx": 50
        }"#,
    )
    .unwrap();

    assert_matches!(
        CoordinateTransformation::new(config),
        Err(ConfigurationError::TransformIndexOutOfRange { index: 50, .. })
    );
}

#[test]
fn intermediate_strategy_from_utm() {
    init_logger();

    let config = TransformationConfig::from_json(
        r#"{
            "spatial_reference": 4326,
            "intermediate_reference": 4230,
            "transform_type": "REPROJECT_WITH_INTERMEDIATE"
        }"#,
    )
    .unwrap();
    let transformation = CoordinateTransformation::new(config).unwrap();
    assert_eq!(
        transformation.selected_transformation().and_then(|t| t.code()),
        Some(1311)
    );

    let direct = CoordinateTransformation::new(TransformationConfig::reproject(4326)).unwrap();

    // ED50 / UTM zone 31N
    let utm = resolve(23031).unwrap();
    let mut shifted = PointGeometry::from_coord(
        Coord {
            x: 448_000.0,
            y: 5_411_000.0,
        },
        Some(utm.clone()),
    );
    let mut unshifted = shifted.clone();

    transformation.transform(&mut shifted).unwrap();
    direct.transform(&mut unshifted).unwrap();

    assert_eq!(shifted.spatial_reference().map(|s| s.epsg()), Some(4326));
    // Both land near Paris, within the size of an ED50 datum shift of each other.
    assert_abs_diff_eq!(shifted.x().unwrap(), unshifted.x().unwrap(), epsilon = 1e-2);
    assert_abs_diff_eq!(shifted.y().unwrap(), unshifted.y().unwrap(), epsilon = 1e-2);
    assert_abs_diff_eq!(shifted.y().unwrap(), 48.85, epsilon = 0.1);
}

#[test]
fn proj_string_overrides_transform_type() {
    init_logger();

    let config = TransformationConfig::from_json(
        r#"{
            "spatial_reference": 4326,
            "transform_type": "REPROJECT",
            "proj_string": "cart ellps=intl | helmert x=-87 y=-98 z=-121 | cart inv ellps=WGS84"
        }"#,
    )
    .unwrap();
    let transformation = CoordinateTransformation::new(config).unwrap();
    assert_eq!(transformation.transform_type(), TransformType::ProjString);

    let with_transform = CoordinateTransformation::new(
        TransformationConfig::reproject(4326)
            .with_transform_type(TransformType::ReprojectWithTransform)
            .with_source_reference(4230)
            .with_transform_idx(2),
    )
    .unwrap();

    let mut by_pipeline =
        PointGeometry::from_coord(Coord { x: 2.35, y: 48.85 }, Some(resolve(4230).unwrap()));
    let mut by_catalog = by_pipeline.clone();

    transformation.transform(&mut by_pipeline).unwrap();
    with_transform.transform(&mut by_catalog).unwrap();

    assert_abs_diff_eq!(by_pipeline.x().unwrap(), by_catalog.x().unwrap(), epsilon = 1e-9);
    assert_abs_diff_eq!(by_pipeline.y().unwrap(), by_catalog.y().unwrap(), epsilon = 1e-9);
}

#[test]
fn custom_catalog_is_injected() {
    init_logger();

    let catalog = TransformationCatalog::empty().with(NamedTransformation {
        code: 100_001,
        name: "Local shift".to_string(),
        source_epsg: 4269,
        target_epsg: 4326,
        accuracy: 0.1,
        pipeline: "cart ellps=GRS80 | helmert x=1 y=1 z=1 | cart inv ellps=WGS84".to_string(),
    });
    let config = TransformationConfig::reproject(4326)
        .with_transform_type(TransformType::ReprojectWithTransform)
        .with_source_reference(4269);

    let transformation = CoordinateTransformation::with_catalog(config, &catalog).unwrap();
    let selected = transformation.selected_transformation().unwrap();
    assert_eq!(selected.code(), Some(100_001));
    assert_eq!(selected.name(), "Local shift");
}

#[test]
fn batch_of_mixed_geometries() {
    init_logger();

    let transformation = CoordinateTransformation::new(TransformationConfig::reproject(3857)).unwrap();
    let wgs84 = resolve(4326).unwrap();

    let mut geometries: Vec<AnyGeometry> = vec![
        api_point().into(),
        PointGeometry::from_coord(Coord { x: 1.0, y: 1.0 }, None).into(),
        LineGeometry::from_coords(
            vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }],
            Some(wgs84.clone()),
        )
        .into(),
        PolygonGeometry::new(
            Some(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 1.0, y: 1.0 },
            ]),
            Some(wgs84),
        )
        .into(),
        PolygonGeometry::empty().into(),
    ];

    let results = transformation.transform_all(geometries.iter_mut());
    assert_eq!(results.len(), 5);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
    assert!(results[3].is_ok());
    assert!(results[4].is_ok());

    assert_matches!(
        geometries[1].to_esri_value(),
        Err(SerializationError::NoReference)
    );
    assert_matches!(geometries[4].to_esri_value(), Err(SerializationError::Empty));

    let polygon = geometries[3].to_esri_value().unwrap();
    assert_eq!(polygon["rings"].as_array().map(|r| r.len()), Some(4));
    assert_eq!(polygon["spatialReference"]["wkid"], json!(3857));
}

#[test]
fn linear_referencing_after_reprojection() {
    init_logger();

    let transformation = CoordinateTransformation::new(TransformationConfig::reproject(3857)).unwrap();
    let mut line = LineGeometry::from_coords(
        vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 180.0, y: 0.0 }],
        Some(resolve(4326).unwrap()),
    );
    transformation.transform(&mut line).unwrap();

    let middle = line.position_along_line(0.5).unwrap();
    assert_abs_diff_eq!(middle.x().unwrap(), 20_037_508.342789244 / 2.0, epsilon = 1e-3);
    assert_eq!(middle.spatial_reference().map(|s| s.epsg()), Some(3857));

    let part = line.segment_along_line(0.0, 0.5).unwrap();
    assert_eq!(part.point_count(), Some(2));
    assert_eq!(
        part.to_esri_value().unwrap()["spatialReference"],
        json!({"wkid": 3857})
    );
}

#[test]
fn polygon_from_api_coordinates() {
    init_logger();

    let coords = georeproj::input::get_coordinates(&json!([
        {"longitude": -82.0, "latitude": 35.0},
        {"longitude": -81.0, "latitude": 35.0},
        {"longitude": -81.0, "latitude": 36.0},
    ]))
    .unwrap();
    let mut polygon = PolygonGeometry::new(Some(coords), Some(resolve(4326).unwrap()));
    assert_eq!(polygon.point_count(), Some(4));

    let transformation = CoordinateTransformation::new(TransformationConfig::reproject(32617)).unwrap();
    transformation.transform(&mut polygon).unwrap();

    let ring = polygon.points().unwrap();
    assert_eq!(ring.first(), ring.last());
    // -81 is the central meridian of UTM zone 17
    assert_abs_diff_eq!(ring[1].x, 500_000.0, epsilon = 1e-3);
}

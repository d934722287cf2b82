//! Reads a GeoJSON `LineString` in WGS84 from a file, reprojects it with the given transformation settings and prints
//! the ESRI JSON of the result.
//!
//! ```sh
//! cargo run --example reproject_geojson -- line.geojson '{"spatial_reference": 3857}'
//! ```

use georeproj::transform::{CoordinateTransformation, TransformationConfig};
use georeproj::{resolve, Geometry, LineGeometry};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let path = args.next().expect("path to a GeoJSON file");
    let settings = args
        .next()
        .unwrap_or_else(|| r#"{"spatial_reference": 3857}"#.to_string());

    let config = TransformationConfig::from_json(&settings).expect("invalid settings");
    let transformation = CoordinateTransformation::new(config).expect("invalid transformation");

    let geojson = std::fs::read_to_string(&path).expect("failed to read input");
    let mut line =
        LineGeometry::from_geojson(&geojson, Some(resolve(4326).expect("WGS84 is known")))
            .expect("input is not a line");

    transformation
        .transform(&mut line)
        .expect("failed to transform");

    log::info!(
        "Line of {} vertices transformed with {}, length {:.3}",
        line.point_count().unwrap_or_default(),
        transformation.transform_type(),
        line.length().unwrap_or_default()
    );

    println!("{}", line.to_esri_json().expect("failed to serialize"));
}

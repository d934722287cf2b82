//! Georeproj reprojects point, line and polygon geometries between spatial references identified by EPSG codes and
//! writes them out as ESRI JSON.
//!
//! # Quick start
//!
//! ```no_run
//! use georeproj::geometry::{Geometry, PointGeometry};
//! use georeproj::srs::resolve;
//! use georeproj::transform::{CoordinateTransformation, TransformationConfig};
//! use serde_json::json;
//!
//! let transformation = CoordinateTransformation::new(TransformationConfig::reproject(3857))?;
//!
//! let mut point = PointGeometry::new(
//!     Some(&json!({"longitude": -82.3775, "latitude": 35.0806})),
//!     None,
//!     Some(resolve(4326)?),
//! )?;
//! transformation.transform(&mut point)?;
//!
//! // {"x":-9170221.35...,"y":4174839.76...,"spatialReference":{"wkid":3857}}
//! println!("{}", point.to_esri_json()?);
//! # Ok::<(), georeproj::GeoReprojError>(())
//! ```
//!
//! A transformation is configured once (see [`TransformationConfig`](transform::TransformationConfig)) with one of
//! four strategies:
//!
//! * `REPROJECT`: direct conversion from the geometry's reference to the target;
//! * `REPROJECT_WITH_TRANSFORM`: a named datum transformation from a configured source reference;
//! * `REPROJECT_WITH_INTERMEDIATE`: conversion into an intermediate reference followed by a named transformation;
//! * `PROJ_STRING`: a custom `geodesy` pipeline.
//!
//! Lines also support linear referencing, see [`linear_ref`].

pub mod error;
pub mod geometry;
pub mod input;
pub mod linear_ref;
pub mod srs;
pub mod transform;
pub mod units;

pub use error::GeoReprojError;
pub use geometry::{AnyGeometry, Geometry, LineGeometry, PointGeometry, PolygonGeometry, Transformable};
pub use srs::{resolve, SharedReference, SpatialReference};
pub use transform::{CoordinateTransformation, TransformType, TransformationConfig};

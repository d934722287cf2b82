//! ESRI JSON geometry objects.
//!
//! Only the members used by this crate are modelled: no `z`/`m` values and no `hasZ`/`hasM` flags.

use serde::{Deserialize, Serialize};

use crate::error::SerializationError;
use crate::srs::SharedReference;

/// `spatialReference` member of an ESRI geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EsriSpatialReference {
    /// Well-known id of the reference (EPSG code).
    pub wkid: u16,
}

impl EsriSpatialReference {
    pub(crate) fn from_reference(
        spatial_reference: Option<&SharedReference>,
    ) -> Result<Self, SerializationError> {
        spatial_reference
            .map(|srs| Self { wkid: srs.epsg() })
            .ok_or(SerializationError::NoReference)
    }
}

/// ESRI point.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EsriPoint {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Spatial reference.
    #[serde(rename = "spatialReference")]
    pub spatial_reference: EsriSpatialReference,
}

/// ESRI polyline with a single path.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EsriPolyline {
    /// Paths of the polyline.
    pub paths: Vec<Vec<[f64; 2]>>,
    /// Spatial reference.
    #[serde(rename = "spatialReference")]
    pub spatial_reference: EsriSpatialReference,
}

/// ESRI polygon.
///
/// The single ring is written as a flat list of vertices, matching the output of the services this crate feeds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EsriPolygon {
    /// Vertices of the exterior ring, closed.
    pub rings: Vec<[f64; 2]>,
    /// Spatial reference.
    #[serde(rename = "spatialReference")]
    pub spatial_reference: EsriSpatialReference,
}

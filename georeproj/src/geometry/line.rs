use std::str::FromStr;

use geo::EuclideanLength;
use geo_types::{Coord, LineString};
use geojson::GeoJson;
use serde_json::Value;

use super::esri::{EsriPolyline, EsriSpatialReference};
use super::point::PointGeometry;
use super::{transform_vertices, EngineGeometry, Geometry, GeometryType, Transformable};
use crate::error::{ConstructionError, LinearReferenceError, SerializationError, TransformationError};
use crate::linear_ref;
use crate::srs::SharedReference;

/// Line geometry: a single path of vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineGeometry {
    raw_input: Option<Value>,
    geometry: Option<EngineGeometry<LineString<f64>>>,
}

impl LineGeometry {
    /// Creates a line from an API array of `{"longitude": .., "latitude": ..}` objects.
    ///
    /// Every element is read as a point first, then the points are joined into a path in input order. `None` creates
    /// an empty line.
    pub fn new(
        geom_json: Option<&Value>,
        spatial_reference: Option<SharedReference>,
    ) -> Result<Self, ConstructionError> {
        let Some(json) = geom_json else {
            return Ok(Self::empty());
        };

        let Value::Array(items) = json else {
            return Err(ConstructionError::InvalidInput(format!(
                "line must be an array of points, got {json}"
            )));
        };

        let mut coords = Vec::with_capacity(items.len());
        for item in items {
            let point = PointGeometry::new(Some(item), None, spatial_reference.clone())?;
            if let Some(coord) = point.coord() {
                coords.push(coord);
            }
        }

        Ok(Self {
            raw_input: Some(json.clone()),
            geometry: Some(EngineGeometry::new(
                LineString::new(coords),
                spatial_reference,
            )),
        })
    }

    /// Creates a line from a list of coordinate pairs.
    pub fn from_coords(
        coords: Vec<Coord<f64>>,
        spatial_reference: Option<SharedReference>,
    ) -> Self {
        Self {
            raw_input: None,
            geometry: Some(EngineGeometry::new(
                LineString::new(coords),
                spatial_reference,
            )),
        }
    }

    /// Creates a line from a GeoJSON `LineString` geometry (or a feature containing one).
    ///
    /// Coordinates beyond the first two dimensions are dropped. The GeoJSON text is kept as the raw input.
    pub fn from_geojson(
        geojson: &str,
        spatial_reference: Option<SharedReference>,
    ) -> Result<Self, ConstructionError> {
        let parsed = GeoJson::from_str(geojson)
            .map_err(|err| ConstructionError::InvalidInput(err.to_string()))?;

        let geometry = match parsed {
            GeoJson::Geometry(geometry) => geometry,
            GeoJson::Feature(feature) => feature.geometry.ok_or_else(|| {
                ConstructionError::InvalidInput("feature has no geometry".to_string())
            })?,
            GeoJson::FeatureCollection(_) => {
                return Err(ConstructionError::InvalidInput(
                    "expected a LineString geometry, got a feature collection".to_string(),
                ))
            }
        };

        let geojson::Value::LineString(positions) = &geometry.value else {
            return Err(ConstructionError::InvalidInput(
                "expected a LineString geometry".to_string(),
            ));
        };

        let coords = positions
            .iter()
            .map(|position| match position.as_slice() {
                [x, y, ..] => Ok(Coord { x: *x, y: *y }),
                _ => Err(ConstructionError::InvalidInput(
                    "position must contain at least 2 dimensions".to_string(),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut line = Self::from_coords(coords, spatial_reference);
        line.raw_input = Some(Value::String(geojson.to_string()));
        Ok(line)
    }

    /// Creates a line from a well-known binary `LineString`.
    #[cfg(feature = "wkb")]
    pub fn from_wkb(
        wkb: &[u8],
        spatial_reference: Option<SharedReference>,
    ) -> Result<Self, ConstructionError> {
        use geozero::wkb::Wkb;
        use geozero::ToGeo;

        let geometry = Wkb(wkb.to_vec())
            .to_geo()
            .map_err(|err| ConstructionError::InvalidInput(err.to_string()))?;

        match geometry {
            geo_types::Geometry::LineString(line) => {
                Ok(Self::from_coords(line.0, spatial_reference))
            }
            _ => Err(ConstructionError::InvalidInput(
                "expected a LineString geometry".to_string(),
            )),
        }
    }

    /// Creates an empty line.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Engine shape of the line.
    pub fn shape(&self) -> Option<&LineString<f64>> {
        self.geometry.as_ref().map(|g| g.shape())
    }

    /// Name of the engine geometry type.
    pub fn line_type(&self) -> Option<&'static str> {
        self.shape().map(|_| "LineString")
    }

    /// Number of parts. A built line always has exactly one path.
    pub fn part_count(&self) -> Option<usize> {
        self.shape().map(|_| 1)
    }

    /// First vertex.
    pub fn first_point(&self) -> Option<Coord<f64>> {
        self.shape()?.0.first().copied()
    }

    /// Last vertex.
    pub fn last_point(&self) -> Option<Coord<f64>> {
        self.shape()?.0.last().copied()
    }

    /// Planar length of the line in the units of its current spatial reference.
    ///
    /// This is not a geodesic length: for a line in geographic coordinates the result is in degrees.
    pub fn length(&self) -> Option<f64> {
        self.shape().map(|line| line.euclidean_length())
    }

    /// Point at `measure` (from `0.0` to `1.0`) of the line's length. See
    /// [`position_along_line`](crate::linear_ref::position_along_line).
    pub fn position_along_line(&self, measure: f64) -> Result<PointGeometry, LinearReferenceError> {
        linear_ref::position_along_line(self, measure)
    }

    /// Part of the line between two measures. See
    /// [`segment_along_line`](crate::linear_ref::segment_along_line).
    pub fn segment_along_line(
        &self,
        start_measure: f64,
        end_measure: f64,
    ) -> Result<LineGeometry, LinearReferenceError> {
        linear_ref::segment_along_line(self, start_measure, end_measure)
    }
}

impl Geometry for LineGeometry {
    fn geometry_type(&self) -> GeometryType {
        GeometryType::Polyline
    }

    fn is_empty(&self) -> bool {
        self.geometry.is_none()
    }

    fn spatial_reference(&self) -> Option<&SharedReference> {
        self.geometry.as_ref()?.spatial_reference()
    }

    fn points(&self) -> Option<Vec<Coord<f64>>> {
        self.shape().map(|line| line.0.clone())
    }

    fn point_count(&self) -> Option<usize> {
        self.shape().map(|line| line.0.len())
    }

    fn raw_input(&self) -> Option<&Value> {
        self.raw_input.as_ref()
    }

    fn to_geo(&self) -> Option<geo_types::Geometry<f64>> {
        self.shape()
            .map(|line| geo_types::Geometry::LineString(line.clone()))
    }

    fn to_esri_value(&self) -> Result<Value, SerializationError> {
        let line = self.shape().ok_or(SerializationError::Empty)?;
        let esri = EsriPolyline {
            paths: vec![line.coords().map(|c| [c.x, c.y]).collect()],
            spatial_reference: EsriSpatialReference::from_reference(self.spatial_reference())?,
        };

        Ok(serde_json::to_value(esri)?)
    }
}

impl Transformable for LineGeometry {
    fn rebuild_from_transformed_vertices<F>(
        &mut self,
        transform: F,
        target: &SharedReference,
    ) -> Result<(), TransformationError>
    where
        F: FnMut(Coord<f64>) -> Result<Coord<f64>, TransformationError>,
    {
        let Some(line) = self.shape() else {
            return Ok(());
        };

        let coords = transform_vertices(line.coords().copied(), transform)?;
        self.geometry = Some(EngineGeometry::new(
            LineString::new(coords),
            Some(target.clone()),
        ));

        Ok(())
    }
}

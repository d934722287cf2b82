use geo_types::{Coord, Point};
use serde_json::Value;

use super::esri::{EsriPoint, EsriSpatialReference};
use super::{EngineGeometry, Geometry, GeometryType, Transformable};
use crate::error::{ConstructionError, SerializationError, TransformationError};
use crate::input::LonLat;
use crate::srs::SharedReference;

/// Point geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointGeometry {
    raw_input: Option<Value>,
    geometry: Option<EngineGeometry<Point<f64>>>,
}

impl PointGeometry {
    /// Creates a point either from a `{"longitude": .., "latitude": ..}` object or from explicit coordinates.
    ///
    /// Giving neither creates an empty point. Giving both is an error, since there is no rule which one should win.
    pub fn new(
        geom_json: Option<&Value>,
        coordinates: Option<Coord<f64>>,
        spatial_reference: Option<SharedReference>,
    ) -> Result<Self, ConstructionError> {
        match (geom_json, coordinates) {
            (Some(_), Some(_)) => Err(ConstructionError::Ambiguous("point")),
            (Some(json), None) => {
                let lonlat = LonLat::from_json(json)?;
                Ok(Self {
                    raw_input: Some(json.clone()),
                    geometry: Some(EngineGeometry::new(
                        Point::from(Coord::from(lonlat)),
                        spatial_reference,
                    )),
                })
            }
            (None, Some(coord)) => Ok(Self::from_coord(coord, spatial_reference)),
            (None, None) => Ok(Self::empty()),
        }
    }

    /// Creates a point from explicit coordinates.
    pub fn from_coord(coord: Coord<f64>, spatial_reference: Option<SharedReference>) -> Self {
        Self {
            raw_input: None,
            geometry: Some(EngineGeometry::new(Point::from(coord), spatial_reference)),
        }
    }

    /// Creates a point from an API location.
    pub fn from_lonlat(lonlat: LonLat, spatial_reference: Option<SharedReference>) -> Self {
        Self::from_coord(lonlat.into(), spatial_reference)
    }

    /// Creates an empty point.
    pub fn empty() -> Self {
        Self::default()
    }

    /// X coordinate (longitude for geographic references).
    pub fn x(&self) -> Option<f64> {
        self.shape().map(|p| p.x())
    }

    /// Y coordinate (latitude for geographic references).
    pub fn y(&self) -> Option<f64> {
        self.shape().map(|p| p.y())
    }

    /// Z coordinate. Points are two dimensional, so this is always `0.0` for a non-empty point.
    pub fn z(&self) -> Option<f64> {
        self.shape().map(|_| 0.0)
    }

    /// Coordinates of the point.
    pub fn coord(&self) -> Option<Coord<f64>> {
        self.shape().map(|p| p.0)
    }

    /// Engine shape of the point.
    pub fn shape(&self) -> Option<&Point<f64>> {
        self.geometry.as_ref().map(|g| g.shape())
    }
}

impl Geometry for PointGeometry {
    fn geometry_type(&self) -> GeometryType {
        GeometryType::Point
    }

    fn is_empty(&self) -> bool {
        self.geometry.is_none()
    }

    fn spatial_reference(&self) -> Option<&SharedReference> {
        self.geometry.as_ref()?.spatial_reference()
    }

    fn points(&self) -> Option<Vec<Coord<f64>>> {
        self.coord().map(|c| vec![c])
    }

    fn raw_input(&self) -> Option<&Value> {
        self.raw_input.as_ref()
    }

    fn to_geo(&self) -> Option<geo_types::Geometry<f64>> {
        self.shape().map(|p| geo_types::Geometry::Point(*p))
    }

    fn to_esri_value(&self) -> Result<Value, SerializationError> {
        let point = self.shape().ok_or(SerializationError::Empty)?;
        let esri = EsriPoint {
            x: point.x(),
            y: point.y(),
            spatial_reference: EsriSpatialReference::from_reference(self.spatial_reference())?,
        };

        Ok(serde_json::to_value(esri)?)
    }
}

impl Transformable for PointGeometry {
    fn rebuild_from_transformed_vertices<F>(
        &mut self,
        mut transform: F,
        target: &SharedReference,
    ) -> Result<(), TransformationError>
    where
        F: FnMut(Coord<f64>) -> Result<Coord<f64>, TransformationError>,
    {
        let Some(coord) = self.coord() else {
            return Ok(());
        };

        let transformed = transform(coord)?;
        self.geometry = Some(EngineGeometry::new(
            Point::from(transformed),
            Some(target.clone()),
        ));

        Ok(())
    }
}

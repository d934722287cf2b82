use geo_types::{Coord, LineString, Polygon};
use serde_json::Value;

use super::esri::{EsriPolygon, EsriSpatialReference};
use super::{transform_vertices, EngineGeometry, Geometry, GeometryType, Transformable};
use crate::error::{ConstructionError, SerializationError, TransformationError};
use crate::srs::SharedReference;

/// Polygon geometry with a single exterior ring.
///
/// The ring is always closed: if the last vertex differs from the first one, the first vertex is appended. Interior
/// rings are not supported, and polygons cannot be created from API JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonGeometry {
    geometry: Option<EngineGeometry<Polygon<f64>>>,
}

impl PolygonGeometry {
    /// Creates a polygon from the vertices of its ring. `None` or an empty list creates an empty polygon.
    pub fn new(
        coordinates: Option<Vec<Coord<f64>>>,
        spatial_reference: Option<SharedReference>,
    ) -> Self {
        match coordinates {
            Some(coords) if !coords.is_empty() => Self {
                geometry: Some(EngineGeometry::new(
                    ring_polygon(coords),
                    spatial_reference,
                )),
            },
            _ => Self::empty(),
        }
    }

    /// Polygons cannot be built from API longitude/latitude JSON. Always returns
    /// [`ConstructionError::Unsupported`].
    pub fn from_json(
        _geom_json: &Value,
        _spatial_reference: Option<SharedReference>,
    ) -> Result<Self, ConstructionError> {
        Err(ConstructionError::Unsupported(
            "polygon can not be created from json, use coordinates instead",
        ))
    }

    /// Creates an empty polygon.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Engine shape of the polygon.
    pub fn shape(&self) -> Option<&Polygon<f64>> {
        self.geometry.as_ref().map(|g| g.shape())
    }
}

fn ring_polygon(coords: Vec<Coord<f64>>) -> Polygon<f64> {
    // Polygon::new closes the exterior ring.
    Polygon::new(LineString::new(coords), vec![])
}

impl Geometry for PolygonGeometry {
    fn geometry_type(&self) -> GeometryType {
        GeometryType::Polygon
    }

    fn is_empty(&self) -> bool {
        self.geometry.is_none()
    }

    fn spatial_reference(&self) -> Option<&SharedReference> {
        self.geometry.as_ref()?.spatial_reference()
    }

    fn points(&self) -> Option<Vec<Coord<f64>>> {
        self.shape().map(|polygon| polygon.exterior().0.clone())
    }

    fn point_count(&self) -> Option<usize> {
        self.shape().map(|polygon| polygon.exterior().0.len())
    }

    fn raw_input(&self) -> Option<&Value> {
        None
    }

    fn to_geo(&self) -> Option<geo_types::Geometry<f64>> {
        self.shape()
            .map(|polygon| geo_types::Geometry::Polygon(polygon.clone()))
    }

    fn to_esri_value(&self) -> Result<Value, SerializationError> {
        let polygon = self.shape().ok_or(SerializationError::Empty)?;
        let esri = EsriPolygon {
            rings: polygon.exterior().coords().map(|c| [c.x, c.y]).collect(),
            spatial_reference: EsriSpatialReference::from_reference(self.spatial_reference())?,
        };

        Ok(serde_json::to_value(esri)?)
    }
}

impl Transformable for PolygonGeometry {
    fn rebuild_from_transformed_vertices<F>(
        &mut self,
        transform: F,
        target: &SharedReference,
    ) -> Result<(), TransformationError>
    where
        F: FnMut(Coord<f64>) -> Result<Coord<f64>, TransformationError>,
    {
        let Some(polygon) = self.shape() else {
            return Ok(());
        };

        let coords = transform_vertices(polygon.exterior().coords().copied(), transform)?;
        self.geometry = Some(EngineGeometry::new(
            ring_polygon(coords),
            Some(target.clone()),
        ));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::resolve;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn triangle() -> Vec<Coord<f64>> {
        vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 10.0, y: 0.0 },
            Coord { x: 10.0, y: 10.0 },
        ]
    }

    #[test]
    fn open_ring_is_closed() {
        let polygon = PolygonGeometry::new(Some(triangle()), None);
        let points = polygon.points().unwrap();

        assert_eq!(points.len(), 4);
        assert_eq!(points.first(), points.last());
        assert_eq!(polygon.point_count(), Some(4));
    }

    #[test]
    fn closed_ring_is_not_closed_twice() {
        let mut ring = triangle();
        ring.push(Coord { x: 0.0, y: 0.0 });
        let polygon = PolygonGeometry::new(Some(ring), None);

        assert_eq!(polygon.point_count(), Some(4));
    }

    #[test]
    fn empty_polygon() {
        assert!(PolygonGeometry::new(None, None).is_empty());
        assert!(PolygonGeometry::new(Some(vec![]), None).is_empty());
        assert_eq!(PolygonGeometry::empty().points(), None);
    }

    #[test]
    fn json_construction_is_unsupported() {
        assert_matches!(
            PolygonGeometry::from_json(&json!([{"longitude": 1.0, "latitude": 2.0}]), None),
            Err(ConstructionError::Unsupported(_))
        );
    }

    #[test]
    fn esri_json() {
        let polygon = PolygonGeometry::new(Some(triangle()), Some(resolve(3857).unwrap()));

        assert_eq!(
            polygon.to_esri_value().unwrap(),
            json!({
                "rings": [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 0.0]],
                "spatialReference": {"wkid": 3857}
            })
        );
    }

    #[test]
    fn rebuild_keeps_ring_closed() {
        let target = resolve(3857).unwrap();
        let mut polygon = PolygonGeometry::new(Some(triangle()), Some(resolve(4326).unwrap()));

        polygon
            .rebuild_from_transformed_vertices(
                |c| {
                    Ok(Coord {
                        x: c.x + 1.0,
                        y: c.y + 1.0,
                    })
                },
                &target,
            )
            .unwrap();

        let points = polygon.points().unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], Coord { x: 1.0, y: 1.0 });
        assert_eq!(points.first(), points.last());
        assert_eq!(polygon.spatial_reference().map(|s| s.epsg()), Some(3857));
    }
}

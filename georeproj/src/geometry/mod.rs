//! Point, line and polygon geometries.
//!
//! Every geometry owns an optional engine shape (see [`EngineGeometry`]) and derives all its properties from it:
//! coordinates, point count, length and the spatial reference are never stored twice. A geometry constructed without
//! input is *empty*: all derived properties return `None` until a shape is built.
//!
//! Geometries are reprojected through the [`Transformable`] trait, which every variant implements by rebuilding its
//! shape from transformed vertices.

use geo_types::Coord;
use serde_json::Value;

use crate::error::{SerializationError, TransformationError};
use crate::srs::SharedReference;

pub mod esri;
mod line;
mod point;
mod polygon;

pub use line::LineGeometry;
pub use point::PointGeometry;
pub use polygon::PolygonGeometry;

/// Kind of the geometry, named the way ESRI services name them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryType {
    /// Single point.
    Point,
    /// Single path.
    Polyline,
    /// Polygon with one ring.
    Polygon,
}

impl GeometryType {
    /// Name of the type: `point`, `polyline` or `polygon`.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Point => "point",
            GeometryType::Polyline => "polyline",
            GeometryType::Polygon => "polygon",
        }
    }
}

/// Engine shape with the spatial reference stamped on it.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineGeometry<G> {
    shape: G,
    spatial_reference: Option<SharedReference>,
}

impl<G> EngineGeometry<G> {
    /// Creates a new engine geometry.
    pub fn new(shape: G, spatial_reference: Option<SharedReference>) -> Self {
        Self {
            shape,
            spatial_reference,
        }
    }

    /// Shape of the geometry.
    pub fn shape(&self) -> &G {
        &self.shape
    }

    /// Stamped spatial reference.
    pub fn spatial_reference(&self) -> Option<&SharedReference> {
        self.spatial_reference.as_ref()
    }
}

/// Common contract of all geometries.
pub trait Geometry {
    /// Kind of the geometry.
    fn geometry_type(&self) -> GeometryType;

    /// Returns true if the geometry has no engine shape.
    fn is_empty(&self) -> bool;

    /// Spatial reference stamped on the engine shape.
    fn spatial_reference(&self) -> Option<&SharedReference>;

    /// Vertices of the geometry. For polygons only the exterior ring is returned.
    fn points(&self) -> Option<Vec<Coord<f64>>>;

    /// Number of vertices, see [`Geometry::points`].
    fn point_count(&self) -> Option<usize> {
        self.points().map(|points| points.len())
    }

    /// Original JSON input, if the geometry was built from one.
    fn raw_input(&self) -> Option<&Value>;

    /// The geometry in the form used by the `geo` ecosystem.
    fn to_geo(&self) -> Option<geo_types::Geometry<f64>>;

    /// GeoJSON representation of the engine shape.
    fn to_geojson(&self) -> Option<geojson::Geometry> {
        self.to_geo()
            .map(|geometry| geojson::Geometry::new(geojson::Value::from(&geometry)))
    }

    /// ESRI JSON representation of the geometry.
    fn to_esri_value(&self) -> Result<Value, SerializationError>;

    /// ESRI JSON representation of the geometry, as a string.
    fn to_esri_json(&self) -> Result<String, SerializationError> {
        Ok(serde_json::to_string(&self.to_esri_value()?)?)
    }
}

/// Geometries that can be rewritten vertex by vertex into another spatial reference.
pub trait Transformable: Geometry {
    /// Runs every vertex through `transform`, rebuilds the engine shape from the results in the same order and stamps
    /// `target` on it.
    ///
    /// The geometry is only modified if all vertices are transformed successfully. On error the previous shape is
    /// kept and the error is returned. Empty geometries are left untouched.
    fn rebuild_from_transformed_vertices<F>(
        &mut self,
        transform: F,
        target: &SharedReference,
    ) -> Result<(), TransformationError>
    where
        F: FnMut(Coord<f64>) -> Result<Coord<f64>, TransformationError>;
}

/// Any of the supported geometries.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyGeometry {
    /// Point.
    Point(PointGeometry),
    /// Line.
    Line(LineGeometry),
    /// Polygon.
    Polygon(PolygonGeometry),
}

impl Geometry for AnyGeometry {
    fn geometry_type(&self) -> GeometryType {
        match self {
            AnyGeometry::Point(v) => v.geometry_type(),
            AnyGeometry::Line(v) => v.geometry_type(),
            AnyGeometry::Polygon(v) => v.geometry_type(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            AnyGeometry::Point(v) => v.is_empty(),
            AnyGeometry::Line(v) => v.is_empty(),
            AnyGeometry::Polygon(v) => v.is_empty(),
        }
    }

    fn spatial_reference(&self) -> Option<&SharedReference> {
        match self {
            AnyGeometry::Point(v) => v.spatial_reference(),
            AnyGeometry::Line(v) => v.spatial_reference(),
            AnyGeometry::Polygon(v) => v.spatial_reference(),
        }
    }

    fn points(&self) -> Option<Vec<Coord<f64>>> {
        match self {
            AnyGeometry::Point(v) => v.points(),
            AnyGeometry::Line(v) => v.points(),
            AnyGeometry::Polygon(v) => v.points(),
        }
    }

    fn raw_input(&self) -> Option<&Value> {
        match self {
            AnyGeometry::Point(v) => v.raw_input(),
            AnyGeometry::Line(v) => v.raw_input(),
            AnyGeometry::Polygon(v) => v.raw_input(),
        }
    }

    fn to_geo(&self) -> Option<geo_types::Geometry<f64>> {
        match self {
            AnyGeometry::Point(v) => v.to_geo(),
            AnyGeometry::Line(v) => v.to_geo(),
            AnyGeometry::Polygon(v) => v.to_geo(),
        }
    }

    fn to_esri_value(&self) -> Result<Value, SerializationError> {
        match self {
            AnyGeometry::Point(v) => v.to_esri_value(),
            AnyGeometry::Line(v) => v.to_esri_value(),
            AnyGeometry::Polygon(v) => v.to_esri_value(),
        }
    }
}

impl Transformable for AnyGeometry {
    fn rebuild_from_transformed_vertices<F>(
        &mut self,
        transform: F,
        target: &SharedReference,
    ) -> Result<(), TransformationError>
    where
        F: FnMut(Coord<f64>) -> Result<Coord<f64>, TransformationError>,
    {
        match self {
            AnyGeometry::Point(v) => v.rebuild_from_transformed_vertices(transform, target),
            AnyGeometry::Line(v) => v.rebuild_from_transformed_vertices(transform, target),
            AnyGeometry::Polygon(v) => v.rebuild_from_transformed_vertices(transform, target),
        }
    }
}

impl From<PointGeometry> for AnyGeometry {
    fn from(value: PointGeometry) -> Self {
        Self::Point(value)
    }
}

impl From<LineGeometry> for AnyGeometry {
    fn from(value: LineGeometry) -> Self {
        Self::Line(value)
    }
}

impl From<PolygonGeometry> for AnyGeometry {
    fn from(value: PolygonGeometry) -> Self {
        Self::Polygon(value)
    }
}

fn transform_vertices<F>(
    vertices: impl Iterator<Item = Coord<f64>>,
    transform: F,
) -> Result<Vec<Coord<f64>>, TransformationError>
where
    F: FnMut(Coord<f64>) -> Result<Coord<f64>, TransformationError>,
{
    vertices.map(transform).collect()
}

//! Coordinate operations applied to single vertices.

use std::fmt::{Debug, Formatter};

use geo_types::Coord;
use geodesy::prelude::*;

use crate::error::TransformationError;
use crate::srs::SharedReference;

/// Operation that maps a coordinate pair from one reference to another.
pub trait CoordinateOperation {
    /// Transforms one vertex.
    fn apply(&self, coord: Coord<f64>) -> Result<Coord<f64>, TransformationError>;
}

/// Conversion between two EPSG references computed by the projection engine from their definitions, without any
/// named transformation.
#[derive(Debug, Clone)]
pub struct Conversion {
    source: SharedReference,
    target: SharedReference,
}

impl Conversion {
    /// Creates a new conversion.
    pub fn new(source: SharedReference, target: SharedReference) -> Self {
        Self { source, target }
    }

    /// Source reference.
    pub fn source(&self) -> &SharedReference {
        &self.source
    }

    /// Target reference.
    pub fn target(&self) -> &SharedReference {
        &self.target
    }
}

impl CoordinateOperation for Conversion {
    fn apply(&self, coord: Coord<f64>) -> Result<Coord<f64>, TransformationError> {
        if self.source == self.target {
            return Ok(coord);
        }

        // proj4rs works with radians for geographic systems
        let mut point = if self.source.is_geographic() {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };

        proj4rs::transform::transform(self.source.proj(), self.target.proj(), &mut point).map_err(
            |err| TransformationError::Vertex {
                x: coord.x,
                y: coord.y,
                reason: format!("{err:?}"),
            },
        )?;

        let result = if self.target.is_geographic() {
            Coord {
                x: point.0.to_degrees(),
                y: point.1.to_degrees(),
            }
        } else {
            Coord {
                x: point.0,
                y: point.1,
            }
        };

        finite_or_error(coord, result)
    }
}

/// Transformation compiled from a `geodesy` pipeline definition, e.g.
/// `cart ellps=intl | helmert x=-87 y=-98 z=-121 | cart inv ellps=WGS84`.
///
/// Geodesy operators expect angles in radians. The `angular_input`/`angular_output` flags given to
/// [`Pipeline::apply`] tell whether coordinates should be converted from/to degrees around the pipeline.
pub struct Pipeline {
    definition: String,
    context: Minimal,
    op: OpHandle,
}

impl Pipeline {
    /// Compiles the pipeline definition.
    pub fn compile(definition: &str) -> Result<Self, geodesy::Error> {
        let mut context = Minimal::new();
        let op = context.op(definition)?;

        Ok(Self {
            definition: definition.to_string(),
            context,
            op,
        })
    }

    /// Text of the pipeline.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Transforms one vertex.
    pub fn apply(
        &self,
        coord: Coord<f64>,
        direction: Direction,
        angular_input: bool,
        angular_output: bool,
    ) -> Result<Coord<f64>, TransformationError> {
        let mut data = if angular_input {
            [Coor4D([coord.x.to_radians(), coord.y.to_radians(), 0.0, 0.0])]
        } else {
            [Coor4D([coord.x, coord.y, 0.0, 0.0])]
        };

        self.context
            .apply(self.op, direction, &mut data)
            .map_err(|err| TransformationError::Vertex {
                x: coord.x,
                y: coord.y,
                reason: err.to_string(),
            })?;

        let result = if angular_output {
            Coord {
                x: data[0].0[0].to_degrees(),
                y: data[0].0[1].to_degrees(),
            }
        } else {
            Coord {
                x: data[0].0[0],
                y: data[0].0[1],
            }
        };

        finite_or_error(coord, result)
    }
}

impl Debug for Pipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("definition", &self.definition)
            .finish()
    }
}

fn finite_or_error(
    input: Coord<f64>,
    result: Coord<f64>,
) -> Result<Coord<f64>, TransformationError> {
    if result.x.is_finite() && result.y.is_finite() {
        Ok(result)
    } else {
        Err(TransformationError::Vertex {
            x: input.x,
            y: input.y,
            reason: "transformation produced a non-finite coordinate".to_string(),
        })
    }
}

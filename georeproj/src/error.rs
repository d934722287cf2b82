//! Error types used by the crate.

use thiserror::Error;

/// Failure to resolve an EPSG code into a [`SpatialReference`](crate::srs::SpatialReference).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReferenceError {
    /// The value cannot be read as an integer EPSG code.
    #[error("EPSG code must be an integer, got '{0}'")]
    NotAnInteger(String),
    /// The registry has no definition for the code.
    #[error("unknown EPSG code {0}")]
    UnknownCode(i64),
    /// The definition exists but the engine refused it.
    #[error("invalid EPSG code {code} used to create a spatial reference: {reason}")]
    Invalid {
        /// EPSG code.
        code: u16,
        /// Engine message.
        reason: String,
    },
}

/// Setup errors of a [`CoordinateTransformation`](crate::transform::CoordinateTransformation).
///
/// These are fatal: they are reported before any geometry is processed and are never retried.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// One of the configured references cannot be resolved.
    #[error("invalid spatial reference: {0}")]
    Reference(#[from] ReferenceError),
    /// The strategy needs a reference that was not configured.
    #[error("'{0}' must be set for this transform type")]
    MissingReference(&'static str),
    /// Pipeline text failed to compile.
    #[error("failed to create transformation from pipeline '{pipeline}': {reason}")]
    InvalidPipeline {
        /// Pipeline definition as given in the configuration.
        pipeline: String,
        /// Engine message.
        reason: String,
    },
    /// There is no known way to transform between the two references.
    #[error("transformations not available between EPSG:{source_epsg} and EPSG:{target_epsg}")]
    NoTransformations {
        /// Source EPSG code.
        source_epsg: u16,
        /// Target EPSG code.
        target_epsg: u16,
    },
    /// `transform_idx` points past the end of the candidate list.
    #[error("transformation {index} not found in list of {available} for EPSG:{source_epsg} -> EPSG:{target_epsg}")]
    TransformIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of candidates.
        available: usize,
        /// Source EPSG code.
        source_epsg: u16,
        /// Target EPSG code.
        target_epsg: u16,
    },
}

/// Error constructing a geometry from its raw input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstructionError {
    /// JSON input and explicit coordinates were both given.
    #[error("{0} can not be created from json and input coordinates at the same time")]
    Ambiguous(&'static str),
    /// The geometry type does not support this construction path.
    #[error("{0}")]
    Unsupported(&'static str),
    /// The raw input has an unexpected shape.
    #[error("invalid input geometry: {0}")]
    InvalidInput(String),
}

/// Error applying a transformation to one geometry. The geometry keeps its previous state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformationError {
    /// The geometry has no spatial reference to transform from.
    #[error("geometry has no spatial reference")]
    NoReference,
    /// The engine failed to transform a vertex.
    #[error("failed to transform vertex ({x}, {y}): {reason}")]
    Vertex {
        /// Input x.
        x: f64,
        /// Input y.
        y: f64,
        /// Engine message.
        reason: String,
    },
}

/// Error exporting a geometry to the wire format.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// The geometry has no spatial reference, so `wkid` cannot be written.
    #[error("geometry has no spatial reference")]
    NoReference,
    /// The geometry is empty.
    #[error("geometry is empty")]
    Empty,
    /// JSON encoding failed.
    #[error("failed to encode geometry: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error of linear referencing operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinearReferenceError {
    /// Measure is not inside `[0.0, 1.0]`.
    #[error("measure {0} is outside of [0.0, 1.0]")]
    MeasureOutOfRange(f64),
    /// Start measure is greater than end measure.
    #[error("start measure {start} is greater than end measure {end}")]
    InvalidRange {
        /// Start measure.
        start: f64,
        /// End measure.
        end: f64,
    },
    /// The line has no vertices.
    #[error("line is empty")]
    EmptyLine,
}

/// Crate level error, convenient for callers that do not need to tell the stages apart.
#[derive(Debug, Error)]
pub enum GeoReprojError {
    /// See [`ReferenceError`].
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    /// See [`ConfigurationError`].
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// See [`ConstructionError`].
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    /// See [`TransformationError`].
    #[error(transparent)]
    Transformation(#[from] TransformationError),
    /// See [`SerializationError`].
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    /// See [`LinearReferenceError`].
    #[error(transparent)]
    LinearReference(#[from] LinearReferenceError),
}

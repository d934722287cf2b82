//! Raw geometry input as returned by upstream APIs.
//!
//! A point is a `{"longitude": .., "latitude": ..}` object, a line is an array of such objects.

use geo_types::Coord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConstructionError;

/// Single location in geographic coordinates as returned by an API.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct LonLat {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
}

impl LonLat {
    /// Creates a new location.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Reads a location from a JSON object.
    pub fn from_json(value: &Value) -> Result<Self, ConstructionError> {
        if !value.is_object() {
            return Err(ConstructionError::InvalidInput(format!(
                "expected an object with longitude and latitude, got {value}"
            )));
        }

        Self::deserialize(value).map_err(|err| ConstructionError::InvalidInput(err.to_string()))
    }
}

impl From<LonLat> for Coord<f64> {
    fn from(value: LonLat) -> Self {
        Coord {
            x: value.longitude,
            y: value.latitude,
        }
    }
}

/// Parses the coordinates of an API geometry.
///
/// A single object gives one coordinate pair, an array of objects gives one pair per element, in order.
pub fn get_coordinates(geom_json: &Value) -> Result<Vec<Coord<f64>>, ConstructionError> {
    match geom_json {
        Value::Array(points) => points
            .iter()
            .map(|point| LonLat::from_json(point).map(Coord::from))
            .collect(),
        other => Ok(vec![LonLat::from_json(other)?.into()]),
    }
}

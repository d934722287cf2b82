//! Spatial references identified by EPSG codes.
//!
//! A [`SpatialReference`] is resolved once with [`resolve`] and then shared between any number of geometries and
//! transformations through [`SharedReference`]. The data axis order of every resolved reference is
//! [`AxisOrder::EastNorth`]: x is the longitude (or easting) and y is the latitude (or northing), whatever order the
//! authority itself defines for the system.

use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use proj4rs::proj::Proj;

use crate::error::ReferenceError;

/// Spatial reference shared between geometries.
pub type SharedReference = Arc<SpatialReference>;

/// Order of the two horizontal axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AxisOrder {
    /// x = longitude/easting, y = latitude/northing ("traditional GIS order").
    EastNorth,
    /// x = latitude/northing, y = longitude/easting.
    NorthEast,
}

/// Coordinate system definition a geometry is interpreted against.
pub struct SpatialReference {
    epsg: u16,
    definition: &'static str,
    proj: Proj,
    grid_fallback: bool,
}

impl SpatialReference {
    /// EPSG code of the reference.
    pub fn epsg(&self) -> u16 {
        self.epsg
    }

    /// Authority code as written to `wkid` fields.
    pub fn authority_code(&self) -> String {
        self.epsg.to_string()
    }

    /// PROJ.4 style definition of the reference taken from the EPSG registry.
    pub fn definition(&self) -> &'static str {
        self.definition
    }

    /// Returns true if coordinates of this reference are longitude and latitude in degrees.
    pub fn is_geographic(&self) -> bool {
        self.definition.contains("+proj=longlat")
    }

    /// Axis order of coordinates stored in geometries. Always [`AxisOrder::EastNorth`].
    pub fn axis_order(&self) -> AxisOrder {
        AxisOrder::EastNorth
    }

    /// Axis order as defined by the EPSG authority. Geographic systems are defined latitude first.
    ///
    /// This is informational only: geometries never store coordinates in this order.
    pub fn authority_axis_order(&self) -> AxisOrder {
        if self.is_geographic() {
            AxisOrder::NorthEast
        } else {
            AxisOrder::EastNorth
        }
    }

    /// Returns true if the definition places the reference on WGS84 without any grid files, so the engine can
    /// convert between it and any other such reference.
    ///
    /// References compiled without their shift grids (see [`SpatialReference::uses_grid_fallback`]) never qualify.
    pub fn has_datum_shift_parameters(&self) -> bool {
        if self.grid_fallback {
            return false;
        }

        if self.definition.contains("+nadgrids=") && !self.definition.contains("+nadgrids=@null") {
            return false;
        }

        self.definition.contains("+towgs84=")
            || self.definition.contains("+datum=WGS84")
            || self.definition.contains("+datum=NAD83")
            || self.definition.contains("+ellps=WGS84")
            || self.definition.contains("+ellps=GRS80")
            || self.definition.contains("+a=6378137 +b=6378137")
    }

    /// Returns true if the registry definition needs shift grids the engine does not have, so the reference was
    /// compiled on its bare ellipsoid instead. Such a reference only reaches WGS84 through a named transformation.
    pub fn uses_grid_fallback(&self) -> bool {
        self.grid_fallback
    }

    pub(crate) fn proj(&self) -> &Proj {
        &self.proj
    }
}

impl Debug for SpatialReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialReference")
            .field("epsg", &self.epsg)
            .field("definition", &self.definition)
            .field("grid_fallback", &self.grid_fallback)
            .finish()
    }
}

impl Display for SpatialReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

impl PartialEq for SpatialReference {
    fn eq(&self, other: &Self) -> bool {
        self.epsg == other.epsg
    }
}

impl Eq for SpatialReference {}

/// Values that can be read as an EPSG code: integers and integer-like strings.
///
/// Strings may be surrounded by whitespace and prefixed with `EPSG:` (case insensitive).
pub trait EpsgCode {
    /// Returns the integer value of the code.
    fn to_epsg(&self) -> Result<i64, ReferenceError>;
}

macro_rules! impl_epsg_code_for_int {
    ($($t:ty),*) => {
        $(
            impl EpsgCode for $t {
                fn to_epsg(&self) -> Result<i64, ReferenceError> {
                    i64::try_from(*self).map_err(|_| ReferenceError::NotAnInteger(self.to_string()))
                }
            }
        )*
    };
}

impl_epsg_code_for_int!(u16, u32, u64, i32, i64, usize);

impl EpsgCode for str {
    fn to_epsg(&self) -> Result<i64, ReferenceError> {
        let trimmed = self.trim();
        let code = match trimmed.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("epsg:") => &trimmed[5..],
            _ => trimmed,
        };

        code.trim()
            .parse::<i64>()
            .map_err(|_| ReferenceError::NotAnInteger(self.to_string()))
    }
}

impl EpsgCode for String {
    fn to_epsg(&self) -> Result<i64, ReferenceError> {
        self.as_str().to_epsg()
    }
}

impl<T: EpsgCode + ?Sized> EpsgCode for &T {
    fn to_epsg(&self) -> Result<i64, ReferenceError> {
        (**self).to_epsg()
    }
}

/// Creates a spatial reference from an EPSG code.
///
/// Fails if the value is not an integer, if the code is not in the EPSG registry, or if the engine cannot compile
/// the registry definition. Definitions whose datum is only available through shift grids (NAD27) are compiled on
/// their ellipsoid without the grids.
pub fn resolve(code: impl EpsgCode) -> Result<SharedReference, ReferenceError> {
    let value = code.to_epsg()?;
    let epsg = u16::try_from(value).map_err(|_| ReferenceError::UnknownCode(value))?;
    let definition = crs_definitions::from_code(epsg)
        .map(|def| def.proj4)
        .ok_or(ReferenceError::UnknownCode(value))?;

    let invalid = |err: proj4rs::errors::Error| ReferenceError::Invalid {
        code: epsg,
        reason: format!("{err:?}"),
    };

    let (proj, grid_fallback) = match Proj::from_proj_string(definition) {
        Ok(proj) => (proj, false),
        Err(proj4rs::errors::Error::NadGridNotAvailable) => {
            let grid_free = grid_free_definition(definition);
            log::warn!(
                "Shift grids for EPSG:{epsg} are not available, using '{grid_free}' without datum shift"
            );
            (Proj::from_proj_string(&grid_free).map_err(invalid)?, true)
        }
        Err(err) => return Err(invalid(err)),
    };

    log::debug!("Resolved EPSG:{epsg} as '{definition}'");

    Ok(Arc::new(SpatialReference {
        epsg,
        definition,
        proj,
        grid_fallback,
    }))
}

/// Drops grid references from a definition, replacing grid based datums by their ellipsoid.
fn grid_free_definition(definition: &str) -> String {
    definition
        .split_whitespace()
        .filter(|token| !token.starts_with("+nadgrids="))
        .map(|token| match token {
            "+datum=NAD27" => "+ellps=clrk66",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

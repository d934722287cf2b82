//! Known transformations between pairs of spatial references.
//!
//! The catalog plays the role of the transformation registry of a projection library: for a pair of references it
//! lists all transformations it knows, ranked from the most to the least accurate. Datum shifts are registered as
//! `geodesy` pipelines working on geographic coordinates. The engine's own conversion (proj4rs, using the `towgs84`
//! parameters of the definitions) is always ranked last and is only offered when both references can be related to
//! WGS84 without grid files.

use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};

use geo_types::Coord;
use geodesy::prelude::Direction;

use super::operation::{Conversion, CoordinateOperation, Pipeline};
use crate::error::{ConfigurationError, TransformationError};
use crate::srs::SharedReference;

/// Datum shift registered in a [`TransformationCatalog`].
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTransformation {
    /// EPSG code of the coordinate operation.
    pub code: u32,
    /// Human readable name.
    pub name: String,
    /// EPSG code of the geographic reference the pipeline transforms from.
    pub source_epsg: u16,
    /// EPSG code of the geographic reference the pipeline transforms to.
    pub target_epsg: u16,
    /// Accuracy of the transformation in meters.
    pub accuracy: f64,
    /// `geodesy` pipeline working in radians.
    pub pipeline: String,
}

impl NamedTransformation {
    fn helmert(
        code: u32,
        name: &str,
        (source_epsg, source_ellps): (u16, &str),
        (target_epsg, target_ellps): (u16, &str),
        accuracy: f64,
        helmert: &str,
    ) -> Self {
        Self {
            code,
            name: name.to_string(),
            source_epsg,
            target_epsg,
            accuracy,
            pipeline: format!(
                "cart ellps={source_ellps} | helmert {helmert} | cart inv ellps={target_ellps}"
            ),
        }
    }
}

/// Registry of named transformations.
#[derive(Debug, Clone, Default)]
pub struct TransformationCatalog {
    entries: Vec<NamedTransformation>,
}

impl TransformationCatalog {
    /// Catalog without any named transformations. Only the engine conversion is offered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog with commonly used datum shifts to WGS84.
    pub fn builtin() -> Self {
        const WGS84: (u16, &str) = (4326, "WGS84");
        const ED50: (u16, &str) = (4230, "intl");
        const OSGB36: (u16, &str) = (4277, "airy");
        const NAD27: (u16, &str) = (4267, "clrk66");
        const NAD83: (u16, &str) = (4269, "GRS80");

        Self {
            entries: vec![
                NamedTransformation::helmert(
                    1133,
                    "ED50 to WGS 84 (1)",
                    ED50,
                    WGS84,
                    10.0,
                    "x=-87 y=-98 z=-121",
                ),
                NamedTransformation::helmert(
                    1275,
                    "ED50 to WGS 84 (17)",
                    ED50,
                    WGS84,
                    2.0,
                    "x=-84 y=-97 z=-117",
                ),
                NamedTransformation::helmert(
                    1311,
                    "ED50 to WGS 84 (18)",
                    ED50,
                    WGS84,
                    1.0,
                    "x=-89.5 y=-93.8 z=-123.1 rx=0 ry=0 rz=-0.156 s=1.2 convention=position_vector",
                ),
                NamedTransformation::helmert(
                    1195,
                    "OSGB36 to WGS 84 (1)",
                    OSGB36,
                    WGS84,
                    21.0,
                    "x=375 y=-111 z=431",
                ),
                NamedTransformation::helmert(
                    1314,
                    "OSGB36 to WGS 84 (6)",
                    OSGB36,
                    WGS84,
                    2.0,
                    "x=446.448 y=-125.157 z=542.06 rx=0.15 ry=0.247 rz=0.842 s=-20.489 convention=position_vector",
                ),
                NamedTransformation::helmert(
                    1172,
                    "NAD27 to WGS 84 (3)",
                    NAD27,
                    WGS84,
                    15.0,
                    "x=-10 y=158 z=187",
                ),
                NamedTransformation::helmert(
                    1173,
                    "NAD27 to WGS 84 (4)",
                    NAD27,
                    WGS84,
                    10.0,
                    "x=-8 y=160 z=176",
                ),
                NamedTransformation::helmert(
                    1188,
                    "NAD83 to WGS 84 (1)",
                    NAD83,
                    WGS84,
                    4.0,
                    "x=0 y=0 z=0",
                ),
            ],
        }
    }

    /// Adds a transformation to the catalog.
    pub fn with(mut self, transformation: NamedTransformation) -> Self {
        self.entries.push(transformation);
        self
    }

    /// Registered transformations.
    pub fn entries(&self) -> &[NamedTransformation] {
        &self.entries
    }

    /// Lists all transformations from `source` to `target`, best ranked first.
    ///
    /// Registered transformations are matched in both directions and sorted by accuracy. Fails if a registered
    /// pipeline does not compile.
    pub fn candidates(
        &self,
        source: &SharedReference,
        target: &SharedReference,
    ) -> Result<Vec<TransformationCandidate>, ConfigurationError> {
        // (entry, applied in inverse direction)
        let mut matching: Vec<(&NamedTransformation, bool)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                if entry.source_epsg == source.epsg() && entry.target_epsg == target.epsg() {
                    Some((entry, false))
                } else if entry.source_epsg == target.epsg() && entry.target_epsg == source.epsg() {
                    Some((entry, true))
                } else {
                    None
                }
            })
            .collect();

        matching.sort_by(|(a, _), (b, _)| {
            a.accuracy
                .partial_cmp(&b.accuracy)
                .unwrap_or(Ordering::Equal)
        });

        let mut candidates = Vec::with_capacity(matching.len() + 1);
        for (entry, inverse) in matching {
            let pipeline = Pipeline::compile(&entry.pipeline).map_err(|err| {
                ConfigurationError::InvalidPipeline {
                    pipeline: entry.pipeline.clone(),
                    reason: err.to_string(),
                }
            })?;

            let name = if inverse {
                format!("Inverse of {}", entry.name)
            } else {
                entry.name.clone()
            };

            candidates.push(TransformationCandidate {
                name,
                code: Some(entry.code),
                accuracy: Some(entry.accuracy),
                source: source.clone(),
                target: target.clone(),
                method: Method::DatumShift { pipeline, inverse },
            });
        }

        if source == target
            || (source.has_datum_shift_parameters() && target.has_datum_shift_parameters())
        {
            candidates.push(TransformationCandidate {
                name: format!("Conversion from {source} to {target}"),
                code: None,
                accuracy: None,
                source: source.clone(),
                target: target.clone(),
                method: Method::Conversion(Conversion::new(source.clone(), target.clone())),
            });
        }

        Ok(candidates)
    }
}

enum Method {
    Conversion(Conversion),
    DatumShift { pipeline: Pipeline, inverse: bool },
}

/// One way of transforming coordinates between two references.
pub struct TransformationCandidate {
    name: String,
    code: Option<u32>,
    accuracy: Option<f64>,
    source: SharedReference,
    target: SharedReference,
    method: Method,
}

impl TransformationCandidate {
    /// Name of the transformation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// EPSG code of the operation, `None` for the engine conversion.
    pub fn code(&self) -> Option<u32> {
        self.code
    }

    /// Accuracy in meters, if known.
    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    /// Reference the input coordinates are expected in.
    pub fn source(&self) -> &SharedReference {
        &self.source
    }

    /// Reference of the output coordinates.
    pub fn target(&self) -> &SharedReference {
        &self.target
    }
}

impl CoordinateOperation for TransformationCandidate {
    fn apply(&self, coord: Coord<f64>) -> Result<Coord<f64>, TransformationError> {
        match &self.method {
            Method::Conversion(conversion) => conversion.apply(coord),
            Method::DatumShift { pipeline, inverse } => pipeline.apply(
                coord,
                if *inverse { Direction::Inv } else { Direction::Fwd },
                self.source.is_geographic(),
                self.target.is_geographic(),
            ),
        }
    }
}

impl Debug for TransformationCandidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformationCandidate")
            .field("name", &self.name)
            .field("code", &self.code)
            .field("accuracy", &self.accuracy)
            .field("source", &self.source.epsg())
            .field("target", &self.target.epsg())
            .finish()
    }
}

/// Picks the candidate at `index`. The list and the index come from configuration, so failures here are
/// configuration errors.
pub(crate) fn select_candidate(
    candidates: Vec<TransformationCandidate>,
    index: usize,
    source: &SharedReference,
    target: &SharedReference,
) -> Result<TransformationCandidate, ConfigurationError> {
    if candidates.is_empty() {
        return Err(ConfigurationError::NoTransformations {
            source_epsg: source.epsg(),
            target_epsg: target.epsg(),
        });
    }

    let available = candidates.len();
    candidates
        .into_iter()
        .nth(index)
        .ok_or(ConfigurationError::TransformIndexOutOfRange {
            index,
            available,
            source_epsg: source.epsg(),
            target_epsg: target.epsg(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::resolve;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    #[test]
    fn named_transformations_are_ranked_by_accuracy() {
        let ed50 = resolve(4230).unwrap();
        let wgs84 = resolve(4326).unwrap();
        let candidates = TransformationCatalog::builtin()
            .candidates(&ed50, &wgs84)
            .unwrap();

        let codes: Vec<_> = candidates.iter().filter_map(|c| c.code()).collect();
        assert_eq!(codes, vec![1311, 1275, 1133]);
        assert_eq!(candidates[0].accuracy(), Some(1.0));
        assert_eq!(candidates[0].name(), "ED50 to WGS 84 (18)");
    }

    #[test]
    fn reverse_direction_is_matched() {
        let ed50 = resolve(4230).unwrap();
        let wgs84 = resolve(4326).unwrap();
        let catalog = TransformationCatalog::builtin();

        let forward = catalog.candidates(&ed50, &wgs84).unwrap();
        let inverse = catalog.candidates(&wgs84, &ed50).unwrap();
        assert_eq!(inverse[0].code(), Some(1311));
        assert!(inverse[0].name().starts_with("Inverse of"));

        let original = Coord { x: 2.35, y: 48.85 };
        let shifted = forward[2].apply(original).unwrap();
        assert!((shifted.x - original.x).abs() > 1e-5);

        let back = inverse[2].apply(shifted).unwrap();
        assert_abs_diff_eq!(back.x, original.x, epsilon = 1e-8);
        assert_abs_diff_eq!(back.y, original.y, epsilon = 1e-8);
    }

    #[test]
    fn null_shift_keeps_coordinates() {
        let nad83 = resolve(4269).unwrap();
        let wgs84 = resolve(4326).unwrap();
        let candidates = TransformationCatalog::builtin()
            .candidates(&nad83, &wgs84)
            .unwrap();

        assert_eq!(candidates[0].code(), Some(1188));
        let result = candidates[0].apply(Coord { x: -82.0, y: 35.0 }).unwrap();
        assert_abs_diff_eq!(result.x, -82.0, epsilon = 1e-7);
        assert_abs_diff_eq!(result.y, 35.0, epsilon = 1e-7);
    }

    #[test]
    fn conversion_is_the_only_candidate_for_same_datum() {
        let wgs84 = resolve(4326).unwrap();
        let mercator = resolve(3857).unwrap();
        let candidates = TransformationCatalog::builtin()
            .candidates(&wgs84, &mercator)
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].code(), None);
        assert_eq!(candidates[0].source().epsg(), 4326);
        assert_eq!(candidates[0].target().epsg(), 3857);
    }

    #[test]
    fn custom_entries() {
        let wgs84 = resolve(4326).unwrap();
        let mercator = resolve(3857).unwrap();
        let catalog = TransformationCatalog::empty().with(NamedTransformation {
            code: 9999,
            name: "Test shift".to_string(),
            source_epsg: 4326,
            target_epsg: 3857,
            accuracy: 0.5,
            pipeline: "noop".to_string(),
        });

        let candidates = catalog.candidates(&wgs84, &mercator).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].code(), Some(9999));
        assert_eq!(catalog.entries().len(), 1);
    }

    #[test]
    fn broken_entry_is_a_configuration_error() {
        let wgs84 = resolve(4326).unwrap();
        let mercator = resolve(3857).unwrap();
        let catalog = TransformationCatalog::empty().with(NamedTransformation {
            code: 1,
            name: "Broken".to_string(),
            source_epsg: 4326,
            target_epsg: 3857,
            accuracy: 1.0,
            pipeline: "not_an_operator".to_string(),
        });

        assert_matches!(
            catalog.candidates(&wgs84, &mercator),
            Err(ConfigurationError::InvalidPipeline { .. })
        );
    }

    #[test]
    fn selection() {
        let wgs84 = resolve(4326).unwrap();
        let mercator = resolve(3857).unwrap();

        assert_matches!(
            select_candidate(vec![], 0, &wgs84, &mercator),
            Err(ConfigurationError::NoTransformations {
                source_epsg: 4326,
                target_epsg: 3857
            })
        );

        let candidates = TransformationCatalog::empty()
            .candidates(&wgs84, &mercator)
            .unwrap();
        assert_matches!(
            select_candidate(candidates, 1, &wgs84, &mercator),
            Err(ConfigurationError::TransformIndexOutOfRange {
                index: 1,
                available: 1,
                ..
            })
        );

        let candidates = TransformationCatalog::empty()
            .candidates(&wgs84, &mercator)
            .unwrap();
        assert!(select_candidate(candidates, 0, &wgs84, &mercator).is_ok());
    }
}

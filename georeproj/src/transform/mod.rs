//! Reprojection of geometries between spatial references.
//!
//! A [`CoordinateTransformation`] is built once from a [`TransformationConfig`]. All references are resolved and the
//! named transformation (if the strategy needs one) is selected at that point, so every configuration problem is
//! reported before the first geometry is touched. The built transformation is then applied to any number of
//! geometries with [`CoordinateTransformation::transform`].

use geo_types::Coord;
use geodesy::prelude::Direction;

use crate::error::{ConfigurationError, TransformationError};
use crate::geometry::Transformable;
use crate::srs::{resolve, SharedReference};

mod catalog;
mod config;
mod operation;

pub use catalog::{NamedTransformation, TransformationCandidate, TransformationCatalog};
pub use config::{EpsgSetting, TransformType, TransformationConfig};
pub use operation::{Conversion, CoordinateOperation, Pipeline};

#[derive(Debug)]
enum Strategy {
    Reproject,
    WithTransform(TransformationCandidate),
    WithIntermediate {
        intermediate: SharedReference,
        candidate: TransformationCandidate,
    },
    ProjString(Pipeline),
}

/// Configured transformation into a target spatial reference.
///
/// ```no_run
/// use georeproj::geometry::{Geometry, PointGeometry};
/// use georeproj::srs::resolve;
/// use georeproj::transform::{CoordinateTransformation, TransformationConfig};
/// use geo_types::Coord;
///
/// let transformation = CoordinateTransformation::new(TransformationConfig::reproject(3857))?;
/// let mut point = PointGeometry::from_coord(Coord { x: -82.3775, y: 35.0806 }, Some(resolve(4326)?));
/// transformation.transform(&mut point)?;
/// println!("{}", point.to_esri_json()?);
/// # Ok::<(), georeproj::GeoReprojError>(())
/// ```
#[derive(Debug)]
pub struct CoordinateTransformation {
    transform_type: TransformType,
    spatial_reference: SharedReference,
    intermediate_reference: Option<SharedReference>,
    strategy: Strategy,
}

impl CoordinateTransformation {
    /// Sets up the transformation using the [builtin](TransformationCatalog::builtin) catalog.
    pub fn new(config: TransformationConfig) -> Result<Self, ConfigurationError> {
        Self::with_catalog(config, &TransformationCatalog::builtin())
    }

    /// Sets up the transformation, looking named transformations up in `catalog`.
    pub fn with_catalog(
        config: TransformationConfig,
        catalog: &TransformationCatalog,
    ) -> Result<Self, ConfigurationError> {
        Self::setup(config, catalog).inspect_err(|err| {
            log::error!("Failed to set up coordinate transformation: {err}");
        })
    }

    fn setup(
        config: TransformationConfig,
        catalog: &TransformationCatalog,
    ) -> Result<Self, ConfigurationError> {
        let transform_type = config.effective_transform_type();
        let spatial_reference = required_reference(&config.spatial_reference, "spatial_reference")?;
        let intermediate_reference = config
            .intermediate_reference
            .as_ref()
            .map(resolve)
            .transpose()?;

        let strategy = match transform_type {
            TransformType::Reproject => Strategy::Reproject,
            TransformType::ReprojectWithTransform => {
                let source = match &config.source_reference {
                    Some(code) => resolve(code)?,
                    None => intermediate_reference
                        .clone()
                        .ok_or(ConfigurationError::MissingReference("source_reference"))?,
                };

                let candidate = choose(catalog, &source, &spatial_reference, config.transform_idx)?;
                Strategy::WithTransform(candidate)
            }
            TransformType::ReprojectWithIntermediate => {
                let intermediate = intermediate_reference
                    .clone()
                    .ok_or(ConfigurationError::MissingReference("intermediate_reference"))?;

                let candidate = choose(
                    catalog,
                    &intermediate,
                    &spatial_reference,
                    config.transform_idx,
                )?;
                Strategy::WithIntermediate {
                    intermediate,
                    candidate,
                }
            }
            TransformType::ProjString => {
                let definition = config
                    .proj_string
                    .as_deref()
                    .ok_or(ConfigurationError::MissingReference("proj_string"))?;
                let pipeline = Pipeline::compile(definition).map_err(|err| {
                    ConfigurationError::InvalidPipeline {
                        pipeline: definition.to_string(),
                        reason: err.to_string(),
                    }
                })?;
                Strategy::ProjString(pipeline)
            }
        };

        log::debug!("Coordinate transformation {transform_type} to {spatial_reference} is set up");

        Ok(Self {
            transform_type,
            spatial_reference,
            intermediate_reference,
            strategy,
        })
    }

    /// Strategy in use.
    pub fn transform_type(&self) -> TransformType {
        self.transform_type
    }

    /// Target spatial reference.
    pub fn spatial_reference(&self) -> &SharedReference {
        &self.spatial_reference
    }

    /// Intermediate spatial reference, if configured.
    pub fn intermediate_reference(&self) -> Option<&SharedReference> {
        self.intermediate_reference.as_ref()
    }

    /// Named transformation selected during setup.
    pub fn selected_transformation(&self) -> Option<&TransformationCandidate> {
        match &self.strategy {
            Strategy::WithTransform(candidate) => Some(candidate),
            Strategy::WithIntermediate { candidate, .. } => Some(candidate),
            Strategy::Reproject | Strategy::ProjString(_) => None,
        }
    }

    /// Transforms the geometry in place and stamps the target reference on it.
    ///
    /// Empty geometries are left as they are. Strategies that reproject from the geometry's own reference fail with
    /// [`TransformationError::NoReference`] for unreferenced geometries. With a named transformation, a geometry
    /// stamped with another reference than the transformation's source is converted into that source first, and an
    /// unreferenced geometry is taken to be in it already. On any error the geometry is not modified.
    pub fn transform<G: Transformable>(&self, geometry: &mut G) -> Result<(), TransformationError> {
        if geometry.is_empty() {
            return Ok(());
        }

        let target = &self.spatial_reference;
        match &self.strategy {
            Strategy::Reproject => {
                let source = geometry
                    .spatial_reference()
                    .cloned()
                    .ok_or(TransformationError::NoReference)?;
                let conversion = Conversion::new(source, target.clone());
                geometry.rebuild_from_transformed_vertices(|c| conversion.apply(c), target)
            }
            Strategy::WithTransform(candidate) => {
                let foreign_source = geometry
                    .spatial_reference()
                    .filter(|srs| *srs != candidate.source())
                    .cloned();

                match foreign_source {
                    Some(source) => {
                        let to_source = Conversion::new(source, candidate.source().clone());
                        geometry.rebuild_from_transformed_vertices(
                            |c| candidate.apply(to_source.apply(c)?),
                            target,
                        )
                    }
                    None => {
                        geometry.rebuild_from_transformed_vertices(|c| candidate.apply(c), target)
                    }
                }
            }
            Strategy::WithIntermediate {
                intermediate,
                candidate,
            } => {
                let source = geometry
                    .spatial_reference()
                    .cloned()
                    .ok_or(TransformationError::NoReference)?;
                let to_intermediate = Conversion::new(source, intermediate.clone());
                geometry.rebuild_from_transformed_vertices(
                    |c| candidate.apply(to_intermediate.apply(c)?),
                    target,
                )
            }
            Strategy::ProjString(pipeline) => {
                let angular_input = geometry
                    .spatial_reference()
                    .is_some_and(|srs| srs.is_geographic());
                let angular_output = target.is_geographic();
                geometry.rebuild_from_transformed_vertices(
                    |c: Coord<f64>| pipeline.apply(c, Direction::Fwd, angular_input, angular_output),
                    target,
                )
            }
        }
    }

    /// Transforms every geometry of the batch. A failing geometry keeps its previous state and does not stop the
    /// others; the returned list has one result per geometry, in order.
    pub fn transform_all<'a, G, I>(&self, geometries: I) -> Vec<Result<(), TransformationError>>
    where
        G: Transformable + 'a,
        I: IntoIterator<Item = &'a mut G>,
    {
        geometries
            .into_iter()
            .enumerate()
            .map(|(index, geometry)| {
                self.transform(geometry).inspect_err(|err| {
                    log::warn!("Failed to transform geometry {index}: {err}");
                })
            })
            .collect()
    }
}

fn required_reference(
    code: &Option<EpsgSetting>,
    name: &'static str,
) -> Result<SharedReference, ConfigurationError> {
    let code = code
        .as_ref()
        .ok_or(ConfigurationError::MissingReference(name))?;
    Ok(resolve(code)?)
}

fn choose(
    catalog: &TransformationCatalog,
    source: &SharedReference,
    target: &SharedReference,
    index: usize,
) -> Result<TransformationCandidate, ConfigurationError> {
    let candidates = catalog.candidates(source, target)?;
    let candidate = catalog::select_candidate(candidates, index, source, target)?;
    log::debug!(
        "Selected transformation {index} '{}' for {source} -> {target}",
        candidate.name()
    );

    Ok(candidate)
}

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ReferenceError;
use crate::srs::EpsgCode;

/// Overall transformation steps performed by a [`CoordinateTransformation`](super::CoordinateTransformation).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformType {
    /// Plain reprojection into the target reference, no named transformation.
    #[default]
    Reproject,
    /// Named transformation from the source reference into the target reference.
    ReprojectWithTransform,
    /// Reprojection into the intermediate reference, then a named transformation into the target reference.
    ReprojectWithIntermediate,
    /// Custom transformation pipeline.
    ProjString,
}

impl TransformType {
    /// Name of the type as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformType::Reproject => "REPROJECT",
            TransformType::ReprojectWithTransform => "REPROJECT_WITH_TRANSFORM",
            TransformType::ReprojectWithIntermediate => "REPROJECT_WITH_INTERMEDIATE",
            TransformType::ProjString => "PROJ_STRING",
        }
    }
}

impl Display for TransformType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REPROJECT" => Ok(TransformType::Reproject),
            "REPROJECT_WITH_TRANSFORM" => Ok(TransformType::ReprojectWithTransform),
            "REPROJECT_WITH_INTERMEDIATE" => Ok(TransformType::ReprojectWithIntermediate),
            "PROJ_STRING" => Ok(TransformType::ProjString),
            other => Err(format!("unknown transform type '{other}'")),
        }
    }
}

/// EPSG code as written in a configuration file: either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EpsgSetting {
    /// Numeric code.
    Code(i64),
    /// Textual code, e.g. `"3857"` or `"EPSG:3857"`.
    Text(String),
}

impl EpsgCode for EpsgSetting {
    fn to_epsg(&self) -> Result<i64, ReferenceError> {
        match self {
            EpsgSetting::Code(code) => Ok(*code),
            EpsgSetting::Text(text) => text.to_epsg(),
        }
    }
}

impl From<i64> for EpsgSetting {
    fn from(value: i64) -> Self {
        Self::Code(value)
    }
}

impl From<u16> for EpsgSetting {
    fn from(value: u16) -> Self {
        Self::Code(value.into())
    }
}

impl From<i32> for EpsgSetting {
    fn from(value: i32) -> Self {
        Self::Code(value.into())
    }
}

impl From<&str> for EpsgSetting {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EpsgSetting {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Settings of a [`CoordinateTransformation`](super::CoordinateTransformation).
///
/// Deserializes from the `coordinate_transformation` parameters block of a host configuration file. Unknown keys are
/// ignored.
///
/// ```json
/// {
///     "spatial_reference": 3857,
///     "intermediate_reference": "4269",
///     "transform_type": "REPROJECT_WITH_INTERMEDIATE",
///     "transform_idx": 0
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransformationConfig {
    /// EPSG code of the final spatial reference.
    pub spatial_reference: Option<EpsgSetting>,
    /// EPSG code of the reference to reproject into before applying the named transformation.
    pub intermediate_reference: Option<EpsgSetting>,
    /// EPSG code the named transformation of `REPROJECT_WITH_TRANSFORM` starts from. Falls back to
    /// `intermediate_reference` when not set.
    pub source_reference: Option<EpsgSetting>,
    /// Transformation steps to perform.
    pub transform_type: TransformType,
    /// Index of the named transformation in the ranked list of candidates.
    pub transform_idx: usize,
    /// Custom pipeline. When set, `transform_type` is ignored and the pipeline is applied.
    #[serde(deserialize_with = "deserialize_proj_string")]
    pub proj_string: Option<String>,
}

impl TransformationConfig {
    /// Plain reprojection into `spatial_reference`.
    pub fn reproject(spatial_reference: impl Into<EpsgSetting>) -> Self {
        Self {
            spatial_reference: Some(spatial_reference.into()),
            ..Default::default()
        }
    }

    /// Parses the configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the transform type.
    pub fn with_transform_type(mut self, transform_type: TransformType) -> Self {
        self.transform_type = transform_type;
        self
    }

    /// Sets the intermediate reference.
    pub fn with_intermediate_reference(mut self, code: impl Into<EpsgSetting>) -> Self {
        self.intermediate_reference = Some(code.into());
        self
    }

    /// Sets the source reference of the named transformation.
    pub fn with_source_reference(mut self, code: impl Into<EpsgSetting>) -> Self {
        self.source_reference = Some(code.into());
        self
    }

    /// Sets the index of the named transformation.
    pub fn with_transform_idx(mut self, transform_idx: usize) -> Self {
        self.transform_idx = transform_idx;
        self
    }

    /// Sets a custom pipeline.
    pub fn with_proj_string(mut self, proj_string: impl Into<String>) -> Self {
        self.proj_string = Some(proj_string.into());
        self
    }

    /// Transform type that will actually be used: a custom pipeline overrides the configured type.
    pub fn effective_transform_type(&self) -> TransformType {
        if self.proj_string.is_some() {
            TransformType::ProjString
        } else {
            self.transform_type
        }
    }
}

// Configuration files written for older hosts use `false` to disable the pipeline.
fn deserialize_proj_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(serde::de::Error::custom(format!(
            "proj_string must be a string, got {other}"
        ))),
    }
}

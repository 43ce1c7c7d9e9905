use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

/// Cosine distance between two descriptors, in `[0, 2]`.
pub type Distance = f64;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DescriptorError {
    #[error("descriptor has {actual} dimensions, model {model} expects {expected}")]
    DimensionMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },

    #[error("descriptor from model {actual} cannot be compared with model {expected}")]
    ModelVersionMismatch { expected: String, actual: String },

    #[error("descriptor value at index {index} is not finite")]
    NonFinite { index: usize },

    #[error("descriptor has zero magnitude")]
    ZeroNorm,
}

/// Identifies the extractor that produced a descriptor, and the descriptor length it
/// always produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelVersion {
    pub name: String,
    pub dimensions: usize,
}

impl ModelVersion {
    pub fn new(name: impl Into<String>, dimensions: usize) -> Self {
        Self {
            name: name.into(),
            dimensions,
        }
    }

    /// Fails with `DimensionMismatch` unless `len` is this model's descriptor length.
    pub fn check_len(&self, len: usize) -> Result<(), DescriptorError> {
        if len == self.dimensions {
            Ok(())
        } else {
            Err(DescriptorError::DimensionMismatch {
                model: self.name.clone(),
                expected: self.dimensions,
                actual: len,
            })
        }
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}d)", self.name, self.dimensions)
    }
}

/// A face descriptor whose length has been checked against its model version.
///
/// The only way to obtain one is [`Descriptor::new`], so every descriptor in the system
/// has the length its model dictates, finite values and a non-zero magnitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    model_version: ModelVersion,
    values: Vec<f32>,
}

impl Descriptor {
    pub fn new(model_version: &ModelVersion, values: Vec<f32>) -> Result<Self, DescriptorError> {
        model_version.check_len(values.len())?;
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DescriptorError::NonFinite { index });
        }
        let descriptor = Self {
            model_version: model_version.clone(),
            values,
        };
        if descriptor.norm() == 0.0 {
            return Err(DescriptorError::ZeroNorm);
        }
        Ok(descriptor)
    }

    #[must_use]
    pub fn model_version(&self) -> &ModelVersion {
        &self.model_version
    }

    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Euclidean norm, accumulated in `f64`.
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.values
            .iter()
            .map(|v| f64::from(*v) * f64::from(*v))
            .sum::<f64>()
            .sqrt()
    }

    /// Fails unless `other` comes from the same model as `self`.
    pub fn check_comparable(&self, other: &Self) -> Result<(), DescriptorError> {
        if self.model_version == other.model_version {
            Ok(())
        } else {
            Err(DescriptorError::ModelVersionMismatch {
                expected: self.model_version.name.clone(),
                actual: other.model_version.name.clone(),
            })
        }
    }

    /// Cosine distance `1 - (a·b) / (|a|·|b|)`.
    ///
    /// The full formula is always evaluated, descriptors are not assumed to be unit
    /// length. Accumulation happens in `f64` and the result is clamped to `[0, 2]` so
    /// rounding can never produce a negative distance.
    pub fn cosine_distance(&self, other: &Self) -> Result<Distance, DescriptorError> {
        self.check_comparable(other)?;
        let dot: f64 = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| f64::from(*a) * f64::from(*b))
            .sum();
        let similarity = (dot / (self.norm() * other.norm())).clamp(-1.0, 1.0);
        Ok(1.0 - similarity)
    }
}

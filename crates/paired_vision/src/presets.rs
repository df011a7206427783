//! Named transform presets and the rules for resolving a transform specifier.
//!
//! A dataset receives two [`TransformSpec`]s, one for the full image and one
//! for the crop. A spec is either a preset key (`"train"` / `"val"`), looked
//! up in an injected [`PresetRegistry`], or a custom [`ImagePipeline`] that is
//! used as is. Only the two exact preset keys ever trigger a lookup.

use crate::config::PresetConfig;
use crate::error::PairError;
use crate::transforms::vision::{Normalize, RandomHorizontalFlip, RandomRotation, Resize, ToTensor};
use crate::transforms::{pipeline, ImagePipeline, Transform};
use anyhow::Result;
use image::imageops::FilterType;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Built-in pipeline names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetKey {
    /// Randomized augmentation for training
    Train,
    /// Deterministic preprocessing for evaluation
    Val,
}

impl PresetKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetKey::Train => "train",
            PresetKey::Val => "val",
        }
    }

    /// Whether pipelines registered under this key are expected to be deterministic.
    pub fn is_deterministic(&self) -> bool {
        matches!(self, PresetKey::Val)
    }
}

impl fmt::Display for PresetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetKey {
    type Err = PairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(PresetKey::Train),
            "val" => Ok(PresetKey::Val),
            other => Err(PairError::UnknownPreset(other.to_string())),
        }
    }
}

/// How a dataset should obtain one of its pipelines.
#[derive(Clone)]
pub enum TransformSpec {
    /// Look the pipeline up in the registry.
    Preset(PresetKey),
    /// Use this pipeline verbatim, bypassing the registry.
    Custom(ImagePipeline),
}

impl TransformSpec {
    pub fn train() -> Self {
        TransformSpec::Preset(PresetKey::Train)
    }

    pub fn val() -> Self {
        TransformSpec::Preset(PresetKey::Val)
    }

    /// Wraps a concrete transform chain as a custom spec.
    pub fn custom<T>(transform: T) -> Self
    where
        T: Transform<image::DynamicImage, tch::Tensor> + 'static,
    {
        TransformSpec::Custom(pipeline(transform))
    }
}

impl Default for TransformSpec {
    fn default() -> Self {
        TransformSpec::train()
    }
}

impl fmt::Debug for TransformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformSpec::Preset(key) => f.debug_tuple("Preset").field(key).finish(),
            TransformSpec::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Only `"train"` and `"val"` parse; any other string is an error rather
/// than a silent fallback.
impl FromStr for TransformSpec {
    type Err = PairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(TransformSpec::Preset)
    }
}

impl From<PresetKey> for TransformSpec {
    fn from(key: PresetKey) -> Self {
        TransformSpec::Preset(key)
    }
}

impl From<ImagePipeline> for TransformSpec {
    fn from(pipeline: ImagePipeline) -> Self {
        TransformSpec::Custom(pipeline)
    }
}

/// Which image a pipeline is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Full,
    Crop,
}

impl PipelineKind {
    fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::Full => "full-image",
            PipelineKind::Crop => "crop",
        }
    }
}

/// Two independent lookups from preset key to pipeline: one for full
/// images, one for center crops.
///
/// Registries are plain values handed to the dataset constructor; there is
/// no process-wide table.
///
/// # Example
/// ```ignore
/// let registry = PresetRegistry::standard(&PresetConfig::default())?;
/// let dataset = ImagePairDataset::new(paths, labels, "val".parse()?, "val".parse()?, &registry)?;
/// ```
#[derive(Clone, Default)]
pub struct PresetRegistry {
    full: HashMap<PresetKey, ImagePipeline>,
    crop: HashMap<PresetKey, ImagePipeline>,
}

impl PresetRegistry {
    /// A registry with no presets; resolving any preset fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard pipelines:
    ///
    /// | Key     | Full image                                | Crop                                                      |
    /// |---------|-------------------------------------------|-----------------------------------------------------------|
    /// | `train` | Resize → HFlip → ToTensor → Normalize     | Resize → HFlip → Rotation → ToTensor → Normalize          |
    /// | `val`   | Resize → ToTensor → Normalize             | Resize → ToTensor → Normalize                             |
    pub fn standard(config: &PresetConfig) -> Result<Self> {
        let (width, height) = config.image_size;
        let filter: FilterType = config.filter.into();
        let resize = Resize::exact(width, height, filter)?;
        let flip = RandomHorizontalFlip::new(config.flip_probability)?;
        let rotation = RandomRotation::new(config.rotation_degrees)?;
        let normalize = Normalize::new(&config.mean, &config.std)?;

        let val = pipeline(
            resize
                .clone()
                .then(ToTensor)
                .then(normalize.clone()),
        );
        let full_train = pipeline(
            resize
                .clone()
                .then(flip.clone())
                .then(ToTensor)
                .then(normalize.clone()),
        );
        let crop_train = pipeline(
            resize
                .then(flip)
                .then(rotation)
                .then(ToTensor)
                .then(normalize),
        );

        log::debug!(
            "built standard presets ({}x{}, flip p={}, rotation ±{}°)",
            width,
            height,
            config.flip_probability,
            config.rotation_degrees
        );

        Ok(Self::empty()
            .with_full(PresetKey::Train, full_train)
            .with_full(PresetKey::Val, val.clone())
            .with_crop(PresetKey::Train, crop_train)
            .with_crop(PresetKey::Val, val))
    }

    /// Registers (or replaces) the full-image pipeline for `key`.
    pub fn with_full(mut self, key: PresetKey, pipeline: ImagePipeline) -> Self {
        self.full.insert(key, pipeline);
        self
    }

    /// Registers (or replaces) the crop pipeline for `key`.
    pub fn with_crop(mut self, key: PresetKey, pipeline: ImagePipeline) -> Self {
        self.crop.insert(key, pipeline);
        self
    }

    /// Looks up a preset pipeline.
    pub fn get(&self, kind: PipelineKind, key: PresetKey) -> Result<ImagePipeline> {
        let table = match kind {
            PipelineKind::Full => &self.full,
            PipelineKind::Crop => &self.crop,
        };
        table.get(&key).cloned().ok_or_else(|| {
            PairError::MissingPreset {
                kind: kind.as_str(),
                key: key.to_string(),
            }
            .into()
        })
    }

    /// Turns a specifier into the pipeline the dataset will hold.
    pub fn resolve(&self, kind: PipelineKind, spec: &TransformSpec) -> Result<ImagePipeline> {
        match spec {
            TransformSpec::Preset(key) => {
                log::debug!(
                    "{} transform: preset '{}' ({})",
                    kind.as_str(),
                    key,
                    if key.is_deterministic() { "deterministic" } else { "randomized" }
                );
                self.get(kind, *key)
            }
            TransformSpec::Custom(custom) => {
                log::debug!("{} transform: custom pipeline", kind.as_str());
                Ok(custom.clone())
            }
        }
    }
}

impl fmt::Debug for PresetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut full: Vec<_> = self.full.keys().map(PresetKey::as_str).collect();
        let mut crop: Vec<_> = self.crop.keys().map(PresetKey::as_str).collect();
        full.sort_unstable();
        crop.sort_unstable();
        f.debug_struct("PresetRegistry")
            .field("full", &full)
            .field("crop", &crop)
            .finish()
    }
}

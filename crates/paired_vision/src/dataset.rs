use crate::error::PairError;
use crate::label::Label;
use crate::presets::{PipelineKind, PresetRegistry, TransformSpec};
use crate::sample::Sample;
use crate::transforms::vision::{CenterCrop, EnsureRGB, LoadImage};
use crate::transforms::{ImagePipeline, Transform};
use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tch::Tensor;

/// A `MapDataset` produces items on demand from an index in `[0, len)`.
///
/// Implementations must be `Send + Sync` so that many threads can fetch
/// distinct (or identical) indices at the same time.
pub trait MapDataset: Send + Sync {
    /// The item produced for one index.
    type Item;

    /// Computes the item at `index`.
    /// Indices outside `[0, len)` fail with [`PairError::IndexOutOfBounds`].
    fn get(&self, index: usize) -> Result<Self::Item>;

    /// Returns total number of items.
    fn len(&self) -> usize;

    /// Checks if the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The cropping collaborator: takes the full RGB image, returns the region
/// the crop pipeline should see.
pub type Cropper = Arc<dyn Transform<DynamicImage, DynamicImage>>;

/// Pairs every image with its center crop.
///
/// Holds an ordered list of image paths and an equally long list of labels.
/// Nothing is read at construction time; each call to [`get`](Self::get)
/// opens the file, converts it to RGB, cuts the center crop, runs the
/// full-image pipeline on the original and the crop pipeline on the crop,
/// and converts the label to an `f32` tensor. No decoded image is cached.
///
/// Cloning is cheap: paths, labels and pipelines live behind `Arc`s.
///
/// # Example
/// ```ignore
/// let registry = PresetRegistry::standard(&PresetConfig::default())?;
/// let dataset = ImagePairDataset::new(
///     vec!["cat.png".into(), "dog.png".into()],
///     vec![Label::from(0), Label::from(1)],
///     TransformSpec::val(),
///     TransformSpec::val(),
///     &registry,
/// )?;
///
/// let (inputs, label) = dataset.get(0)?;
/// inputs.full_img()?; // [3, 224, 224]
/// inputs.crop_img()?; // [3, 224, 224]
/// ```
#[derive(Clone)]
pub struct ImagePairDataset {
    paths: Arc<[PathBuf]>,
    labels: Arc<[Label]>,
    transform: ImagePipeline,
    crop_transform: ImagePipeline,
    cropper: Cropper,
    loader: LoadImage,
}

impl ImagePairDataset {
    /// Creates a dataset using the default [`CenterCrop::half_longest_side`] policy.
    ///
    /// Fails if `paths` and `labels` differ in length, or if a preset spec
    /// names a pipeline missing from `registry`.
    pub fn new(
        paths: Vec<PathBuf>,
        labels: Vec<Label>,
        transform: TransformSpec,
        crop_transform: TransformSpec,
        registry: &PresetRegistry,
    ) -> Result<Self> {
        Self::with_cropper(
            paths,
            labels,
            transform,
            crop_transform,
            registry,
            Arc::new(CenterCrop::half_longest_side()),
        )
    }

    /// Creates a dataset with a caller-supplied cropping policy.
    pub fn with_cropper(
        paths: Vec<PathBuf>,
        labels: Vec<Label>,
        transform: TransformSpec,
        crop_transform: TransformSpec,
        registry: &PresetRegistry,
        cropper: Cropper,
    ) -> Result<Self> {
        if paths.len() != labels.len() {
            return Err(PairError::LengthMismatch {
                paths: paths.len(),
                labels: labels.len(),
            }
            .into());
        }

        let transform = registry
            .resolve(PipelineKind::Full, &transform)
            .context("Failed to resolve full-image transform")?;
        let crop_transform = registry
            .resolve(PipelineKind::Crop, &crop_transform)
            .context("Failed to resolve crop transform")?;

        log::debug!("image-pair dataset with {} entries", paths.len());

        Ok(Self {
            paths: paths.into(),
            labels: labels.into(),
            transform,
            crop_transform,
            cropper,
            loader: LoadImage::new(),
        })
    }

    /// Computes the sample at `index`.
    ///
    /// Returns the `{full_img, crop_img}` sample and the label tensor.
    /// Any failure (range, I/O, decode, transform) aborts this fetch only.
    pub fn get(&self, index: usize) -> Result<(Sample, Tensor)> {
        let path = self.path(index)?;
        let label = &self.labels[index];

        let full_img = self
            .loader
            .load(path)
            .and_then(|img| EnsureRGB.apply(img))?;
        let crop_img = self
            .cropper
            .apply(full_img.clone())
            .with_context(|| format!("Failed to crop image: {}", path.display()))?;

        let full_img = self
            .transform
            .apply(full_img)
            .with_context(|| format!("Failed to transform image: {}", path.display()))?;
        let crop_img = self
            .crop_transform
            .apply(crop_img)
            .with_context(|| format!("Failed to transform crop: {}", path.display()))?;

        log::trace!("fetched index {} ({})", index, path.display());
        Ok((Sample::pair(full_img, crop_img), label.to_tensor()))
    }

    /// Number of (path, label) entries.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Path of the image at `index`.
    pub fn path(&self, index: usize) -> Result<&Path> {
        self.paths
            .get(index)
            .map(PathBuf::as_path)
            .ok_or_else(|| self.out_of_bounds(index))
    }

    /// Label at `index`, before tensor conversion.
    pub fn label(&self, index: usize) -> Result<&Label> {
        self.labels
            .get(index)
            .ok_or_else(|| self.out_of_bounds(index))
    }

    /// The resolved full-image pipeline.
    pub fn transform(&self) -> &ImagePipeline {
        &self.transform
    }

    /// The resolved crop pipeline.
    pub fn crop_transform(&self) -> &ImagePipeline {
        &self.crop_transform
    }

    /// Fetches every index in order.
    pub fn iter(&self) -> impl Iterator<Item = Result<(Sample, Tensor)>> + '_ {
        (0..self.len()).map(move |index| self.get(index))
    }

    fn out_of_bounds(&self, index: usize) -> anyhow::Error {
        PairError::IndexOutOfBounds {
            index,
            len: self.len(),
        }
        .into()
    }
}

impl MapDataset for ImagePairDataset {
    type Item = (Sample, Tensor);

    fn get(&self, index: usize) -> Result<Self::Item> {
        ImagePairDataset::get(self, index)
    }

    fn len(&self) -> usize {
        ImagePairDataset::len(self)
    }
}

impl std::fmt::Debug for ImagePairDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePairDataset")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

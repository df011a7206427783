//! Paired full-image / center-crop datasets for vision models.
//!
//! ```text
//!   paths[i] ──► LoadImage ──► EnsureRGB ──┬──────────────► full pipeline ──► "full_img"
//!                                          └─► CenterCrop ─► crop pipeline ──► "crop_img"
//!   labels[i] ─────────────────────────────────────────────► f32 tensor ────► label
//! ```
//!
//! Pipelines are resolved once, at construction, from a [`TransformSpec`]:
//! either a preset key (`"train"` / `"val"`) looked up in an injected
//! [`PresetRegistry`], or a custom [`ImagePipeline`].

pub mod batch;
pub mod collator;
pub mod config;
pub mod dataset;
pub mod error;
pub mod label;
pub mod minibatch;
pub mod presets;
pub mod readers;
pub mod rng;
pub mod sample;
pub mod transforms;

pub use batch::{fetch_batch, PairBatch};
pub use collator::StackCollator;
pub use config::{PresetConfig, ResizeFilter};
pub use dataset::{Cropper, ImagePairDataset, MapDataset};
pub use error::PairError;
pub use label::Label;
pub use minibatch::MiniBatch;
pub use presets::{PipelineKind, PresetKey, PresetRegistry, TransformSpec};
pub use readers::ManifestSource;
pub use sample::{Sample, CROP_IMG, FULL_IMG};
pub use transforms::{pipeline, ImagePipeline, Transform};

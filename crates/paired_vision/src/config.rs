//! src/config.rs
//!
//! Parameters of the built-in `train` / `val` preset pipelines.
//!
//! ```ignore
//! let config = PresetConfig::builder()
//!     .image_size(128, 128)
//!     .flip_probability(0.5)
//!     .rotation_degrees(15.0)
//!     .build();
//!
//! let registry = PresetRegistry::standard(&config)?;
//! ```
//!
//! The same structure can be read from JSON; missing fields keep their
//! defaults:
//! ```json
//! { "image_size": [128, 128], "rotation_degrees": 15.0 }
//! ```

use anyhow::{Context, Result};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resampling filter used by the preset `Resize` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Configuration for the standard preset pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    /// Output `(width, height)` of every preset pipeline. Default: 224x224
    pub image_size: (u32, u32),
    /// Per-channel normalization mean (ImageNet by default)
    pub mean: [f32; 3],
    /// Per-channel normalization std (ImageNet by default)
    pub std: [f32; 3],
    /// Probability of a horizontal flip in `train` presets. Default: 0.5
    pub flip_probability: f64,
    /// Rotation range in degrees for the crop `train` preset. Default: 20
    pub rotation_degrees: f32,
    /// Resampling filter for the resize step. Default: Triangle
    pub filter: ResizeFilter,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            image_size: (224, 224),
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
            flip_probability: 0.5,
            rotation_degrees: 20.0,
            filter: ResizeFilter::Triangle,
        }
    }
}

impl PresetConfig {
    pub fn builder() -> PresetConfigBuilder {
        PresetConfigBuilder::default()
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preset config: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid preset config: {}", path.display()))
    }
}

/// Builder for PresetConfig with method chaining
#[derive(Default)]
pub struct PresetConfigBuilder {
    config: PresetConfig,
}

impl PresetConfigBuilder {
    /// Set the output size of every preset pipeline
    pub fn image_size(mut self, width: u32, height: u32) -> Self {
        self.config.image_size = (width, height);
        self
    }

    /// Set the normalization statistics
    pub fn normalization(mut self, mean: [f32; 3], std: [f32; 3]) -> Self {
        self.config.mean = mean;
        self.config.std = std;
        self
    }

    /// Set the flip probability used by `train` presets
    pub fn flip_probability(mut self, p: f64) -> Self {
        self.config.flip_probability = p;
        self
    }

    /// Set the rotation range of the crop `train` preset (0 disables it)
    pub fn rotation_degrees(mut self, degrees: f32) -> Self {
        self.config.rotation_degrees = degrees;
        self
    }

    /// Set the resize filter
    pub fn filter(mut self, filter: ResizeFilter) -> Self {
        self.config.filter = filter;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> PresetConfig {
        self.config
    }
}

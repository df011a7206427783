use crate::transforms::Transform;
use anyhow::{ensure, Context, Result};
use image::{DynamicImage, GenericImageView};
use tch::{Kind, Tensor};

// ============================================================================
// ToTensor
// ============================================================================

/// Converts an image to a channel-first f32 tensor in [0.0, 1.0] range.
///
/// Channel Handling
/// | Input Format  | Output Shape |
/// |---------------|--------------|
/// | Grayscale (L) | `[1, H, W]`  |
/// | RGBA          | `[4, H, W]`  |
/// | Anything else | `[3, H, W]`  |
///
/// The image-pair dataset runs `EnsureRGB` before any pipeline, so dataset
/// tensors are always `[3, H, W]`.
///
/// # Example
/// ```ignore
/// let tensor = ToTensor.apply(image)?;
/// ```
#[derive(Debug, Clone)]
pub struct ToTensor;

impl Transform<DynamicImage, Tensor> for ToTensor {
    fn apply(&self, img: DynamicImage) -> Result<Tensor> {
        let (width, height) = img.dimensions();
        ensure!(
            width > 0 && height > 0,
            "Image dimensions must be positive (got {}x{})",
            width,
            height
        );

        // Interleaved HWC bytes plus channel count
        let (raw, channels) = match img {
            DynamicImage::ImageLuma8(img) => (img.into_raw(), 1),
            DynamicImage::ImageRgba8(img) => (img.into_raw(), 4),
            DynamicImage::ImageRgb8(img) => (img.into_raw(), 3),
            other => (other.to_rgb8().into_raw(), 3),
        };

        Tensor::from_slice(&raw)
            .reshape(&[height as i64, width as i64, channels])
            .permute(&[2, 0, 1])
            .contiguous()
            .to_kind(Kind::Float)
            .f_div_scalar(255.0)
            .context("Failed to scale tensor values")
    }
}

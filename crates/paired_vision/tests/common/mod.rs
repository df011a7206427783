use anyhow::Result;
use image::{DynamicImage, Rgb, RgbImage};
use paired_vision::transforms::Transform;
use std::path::PathBuf;
use tch::{Kind, Tensor};
use tempfile::TempDir;

/// Writes a `width x height` RGB PNG whose pixels encode their coordinates,
/// so left/right and top/bottom halves differ.
pub fn write_gradient_png(dir: &TempDir, name: &str, width: u32, height: u32) -> Result<PathBuf> {
    let path = dir.path().join(name);
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    })
    .save(&path)?;
    Ok(path)
}

/// Custom pipeline that ignores the pixels and returns a `[3, H, W]` tensor
/// filled with a marker value.
pub struct MarkerPipeline(pub f64);

impl Transform<DynamicImage, Tensor> for MarkerPipeline {
    fn apply(&self, img: DynamicImage) -> Result<Tensor> {
        Ok(Tensor::full(
            &[3, img.height() as i64, img.width() as i64],
            self.0,
            (Kind::Float, tch::Device::Cpu),
        ))
    }
}

use crate::rng::worker_gen_range;
use crate::transforms::Transform;
use anyhow::{ensure, Result};
use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, Rgb};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

// ============================================================================
// EnsureRGB
// ============================================================================
/// Ensures that the image is indeed 3-channel RGB
#[derive(Debug, Clone)]
pub struct EnsureRGB;

impl Transform<DynamicImage, DynamicImage> for EnsureRGB {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage> {
        Ok(match img {
            DynamicImage::ImageRgb8(_) => img,
            _ => DynamicImage::ImageRgb8(img.to_rgb8()),
        })
    }
}

// ============================================================================
// Resize
// ============================================================================

/// Resizes an image to the specified dimension. Users must specify the
/// filter type.
///
/// [`Resize::new`] preserves the aspect ratio and fits the image inside
/// `width x height`; [`Resize::exact`] stretches to exactly `width x height`,
/// which is what the preset pipelines use so every tensor in a batch has
/// the same shape.
///
/// # Filter Types
/// - `Nearest`: Nearest neighbour, fastest
/// - `Triangle`: Bilinear filter, good all-round default
/// - `CatmullRom`: Bicubic sharpening
/// - `Gaussian`: Blurring/smoothing
/// - `Lanczos3`: Lanczos with window 3, highest quality re-sampling but slowest.
///
/// # Examples
/// ``` ignore
/// # use image::imageops::FilterType;
/// let resize = Resize::exact(224, 224, FilterType::Triangle)?;
/// let resized = resize.apply(img)?;
/// ```
#[derive(Debug, Clone)]
pub struct Resize {
    width: u32,
    height: u32,
    filter: FilterType,
    exact: bool,
}

impl Resize {
    /// Creates an aspect-preserving Resize transform.
    pub fn new(width: u32, height: u32, filter: FilterType) -> Result<Self> {
        ensure!(
            width > 0 && height > 0,
            "Image dimensions must be positive after resizing (got {}x{})",
            width,
            height
        );
        Ok(Self {
            width,
            height,
            filter,
            exact: false,
        })
    }

    /// Creates a Resize transform that ignores the aspect ratio.
    pub fn exact(width: u32, height: u32, filter: FilterType) -> Result<Self> {
        Ok(Self {
            exact: true,
            ..Self::new(width, height, filter)?
        })
    }
}

impl Transform<DynamicImage, DynamicImage> for Resize {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage> {
        Ok(if self.exact {
            img.resize_exact(self.width, self.height, self.filter)
        } else {
            img.resize(self.width, self.height, self.filter)
        })
    }
}

// ============================================================================
// CenterCrop
// ============================================================================

/// How large the centered region should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CropSize {
    /// Exactly `width x height` pixels.
    Fixed { width: u32, height: u32 },
    /// A square whose side is half of the image's longest side.
    HalfLongestSide,
}

/// Extracts a region from the middle of an image.
///
/// When the requested region is larger than the image along an axis, the
/// image is centered inside the region and the uncovered border is
/// zero-filled, so the output always has the requested size.
///
/// [`CenterCrop::half_longest_side`] is the cropping policy the image-pair
/// dataset uses by default: for a 100x100 image it yields the central 50x50.
#[derive(Debug, Clone)]
pub struct CenterCrop {
    size: CropSize,
}

impl CenterCrop {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        ensure!(
            width > 0 && height > 0,
            "Crop dimensions must be positive (got {}x{})",
            width,
            height
        );
        Ok(Self {
            size: CropSize::Fixed { width, height },
        })
    }

    pub fn half_longest_side() -> Self {
        Self {
            size: CropSize::HalfLongestSide,
        }
    }

    /// Output dimensions for an input of `width x height`.
    pub fn output_dims(&self, width: u32, height: u32) -> (u32, u32) {
        match self.size {
            CropSize::Fixed { width, height } => (width, height),
            CropSize::HalfLongestSide => {
                let side = (width.max(height) / 2).max(1);
                (side, side)
            }
        }
    }

    /// Offset of the crop window inside the source along one axis.
    /// Negative when the window is wider than the source. Halves round to even.
    fn offset(source: u32, crop: u32) -> i64 {
        if source >= crop {
            ((source - crop) as f64 / 2.0).round_ties_even() as i64
        } else {
            -(((crop - source) / 2) as i64)
        }
    }
}

impl Transform<DynamicImage, DynamicImage> for CenterCrop {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage> {
        let (width, height) = img.dimensions();
        ensure!(
            width > 0 && height > 0,
            "Cannot crop an empty image (got {}x{})",
            width,
            height
        );

        let (crop_w, crop_h) = self.output_dims(width, height);
        let left = Self::offset(width, crop_w);
        let top = Self::offset(height, crop_h);

        if crop_w <= width && crop_h <= height {
            return Ok(img.crop_imm(left as u32, top as u32, crop_w, crop_h));
        }

        let mut canvas = DynamicImage::new(crop_w, crop_h, img.color());
        imageops::replace(&mut canvas, &img, -left, -top);
        Ok(canvas)
    }
}

// ============================================================================
// RandomRotation
// ============================================================================

/// Rotates the image about its center by an angle drawn uniformly from
/// `[-degrees, degrees]`. The output keeps the input size; corners exposed
/// by the rotation are black. Non-RGB inputs are converted to RGB first.
#[derive(Debug, Clone)]
pub struct RandomRotation {
    degrees: f32,
}

impl RandomRotation {
    pub fn new(degrees: f32) -> Result<Self> {
        ensure!(
            degrees.is_finite() && degrees >= 0.0,
            "Rotation range must be a non-negative number of degrees (got {})",
            degrees
        );
        Ok(Self { degrees })
    }
}

impl Transform<DynamicImage, DynamicImage> for RandomRotation {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage> {
        if self.degrees == 0.0 {
            return Ok(img);
        }
        let angle: f32 = worker_gen_range(-self.degrees..=self.degrees);
        let rgb = match img {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        };
        Ok(DynamicImage::ImageRgb8(rotate_about_center(
            &rgb,
            angle.to_radians(),
            Interpolation::Bilinear,
            Rgb([0, 0, 0]),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::init_worker_rng;
    use image::{DynamicImage, GenericImageView, GrayImage, Luma, Rgb, RgbImage};

    fn test_gradient_image(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let r = (x * 255 / width) as u8;
                let g = (y * 255 / height) as u8;
                let b = 128;
                img.put_pixel(x, y, Rgb([r, g, b]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_ensure_rgb() -> Result<()> {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([7])));
        let rgb = EnsureRGB.apply(gray)?;
        assert!(matches!(rgb, DynamicImage::ImageRgb8(_)));
        assert_eq!(rgb.to_rgb8().get_pixel(1, 1), &Rgb([7, 7, 7]));
        Ok(())
    }

    #[test]
    fn test_resize() -> Result<()> {
        let img = test_gradient_image(100, 50);
        let fitted = Resize::new(50, 50, FilterType::Nearest)?.apply(img.clone())?;
        assert_eq!(fitted.dimensions(), (50, 25));

        let stretched = Resize::exact(50, 50, FilterType::Nearest)?.apply(img)?;
        assert_eq!(stretched.dimensions(), (50, 50));

        assert!(Resize::exact(0, 10, FilterType::Nearest).is_err());
        Ok(())
    }

    #[test]
    fn test_center_crop_half_longest_side() -> Result<()> {
        let img = test_gradient_image(100, 100);
        let crop = CenterCrop::half_longest_side().apply(img.clone())?;
        assert_eq!(crop.dimensions(), (50, 50));

        // The crop starts at (25, 25) of the source
        assert_eq!(
            crop.to_rgb8().get_pixel(0, 0),
            img.to_rgb8().get_pixel(25, 25)
        );
        Ok(())
    }

    #[test]
    fn test_center_crop_pads_short_axis() -> Result<()> {
        // 100x20: the 50x50 window is taller than the image
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 20, Rgb([9, 9, 9])));
        let crop = CenterCrop::half_longest_side().apply(img)?;
        assert_eq!(crop.dimensions(), (50, 50));

        let rgb = crop.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([0, 0, 0])); // padded band
        assert_eq!(rgb.get_pixel(25, 25), &Rgb([9, 9, 9])); // image content
        assert_eq!(rgb.get_pixel(49, 49), &Rgb([0, 0, 0]));
        Ok(())
    }

    #[test]
    fn test_center_crop_fixed() -> Result<()> {
        let img = test_gradient_image(10, 8);
        let crop = CenterCrop::new(4, 4)?.apply(img.clone())?;
        assert_eq!(crop.dimensions(), (4, 4));
        assert_eq!(crop.to_rgb8().get_pixel(0, 0), img.to_rgb8().get_pixel(3, 2));
        Ok(())
    }

    #[test]
    fn test_center_crop_odd_margin_rounds_to_even() -> Result<()> {
        // Margins of 11 and 9 put the window at (5.5, 4.5), rounded to (6, 4)
        let img = test_gradient_image(19, 17);
        let crop = CenterCrop::new(8, 8)?.apply(img.clone())?;
        assert_eq!(crop.to_rgb8().get_pixel(0, 0), img.to_rgb8().get_pixel(6, 4));

        let square = test_gradient_image(17, 17);
        let crop = CenterCrop::new(8, 8)?.apply(square.clone())?;
        assert_eq!(crop.to_rgb8().get_pixel(0, 0), square.to_rgb8().get_pixel(4, 4));
        Ok(())
    }

    #[test]
    fn test_random_rotation() -> Result<()> {
        init_worker_rng(0, 0, 42);
        let img = test_gradient_image(16, 12);

        let rotated = RandomRotation::new(20.0)?.apply(img.clone())?;
        assert_eq!(rotated.dimensions(), (16, 12));

        let untouched = RandomRotation::new(0.0)?.apply(img.clone())?;
        assert_eq!(untouched.as_bytes(), img.as_bytes());

        assert!(RandomRotation::new(-1.0).is_err());
        Ok(())
    }
}

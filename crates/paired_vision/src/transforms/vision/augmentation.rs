use crate::rng::worker_gen_bool;
use crate::transforms::Transform;
use anyhow::{ensure, Result};
use image::DynamicImage;

// ============================================================================
// RandomHorizontalFlip
// ============================================================================

/// Mirrors the image left-to-right with probability `p`.
///
/// The decision is drawn from the calling thread's RNG (see [`crate::rng`]),
/// so seeding the thread makes the flip sequence reproducible.
///
/// # Example
/// ```ignore
/// let flip = RandomHorizontalFlip::new(0.5)?; // 50% flip chance
/// let augmented = flip.apply(image)?;
/// ```
#[derive(Debug, Clone)]
pub struct RandomHorizontalFlip {
    p: f64,
}

impl RandomHorizontalFlip {
    pub fn new(p: f64) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&p),
            "Probability must be in [0.0, 1.0] range (got {})",
            p
        );
        Ok(Self { p })
    }

    pub fn probability(&self) -> f64 {
        self.p
    }
}

impl Transform<DynamicImage, DynamicImage> for RandomHorizontalFlip {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage> {
        // p == 0.0 and p == 1.0 never touch the RNG
        let flip = match self.p {
            p if p <= 0.0 => false,
            p if p >= 1.0 => true,
            p => worker_gen_bool(p),
        };
        Ok(if flip { img.fliph() } else { img })
    }
}

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use tch::Tensor;

/// Feature name of the transformed full image.
pub const FULL_IMG: &str = "full_img";
/// Feature name of the transformed center crop.
pub const CROP_IMG: &str = "crop_img";

/// The model inputs for one dataset entry.
///
/// A `Sample` maps feature names to tensors. Samples produced by
/// [`ImagePairDataset`](crate::dataset::ImagePairDataset) always carry
/// exactly two features:
/// - `"full_img"`: the whole image after the full-image pipeline, `[C, H, W]`
/// - `"crop_img"`: the center crop after the crop pipeline, `[C, h, w]`
///
/// The label travels next to the sample rather than inside it, so a
/// dataset item is the pair `(Sample, Tensor)`.
#[derive(Debug)]
pub struct Sample {
    pub features: HashMap<String, Tensor>,
}

/// Creates a shallow clone of the `Sample`
impl Clone for Sample {
    fn clone(&self) -> Self {
        let features = self
            .features
            .iter()
            .map(|(k, v)| (k.clone(), v.shallow_clone()))
            .collect();
        Self { features }
    }
}

/// Safety:
/// `tch::Tensor` is `Send` and `Sync` in its source, `String` and `HashMap`
/// compose those guarantees, and every mutation goes through `&mut self`.
unsafe impl Send for Sample {}
unsafe impl Sync for Sample {}

impl Sample {
    /// Builds the two-feature sample returned by the image-pair dataset.
    pub fn pair(full_img: Tensor, crop_img: Tensor) -> Self {
        Self {
            features: HashMap::from([
                (FULL_IMG.to_string(), full_img),
                (CROP_IMG.to_string(), crop_img),
            ]),
        }
    }

    /// Creates a `Sample` from a single `(feature_name, tensor)` pair.
    pub fn from_single(name: impl Into<String>, tensor: Tensor) -> Self {
        Self {
            features: HashMap::from([(name.into(), tensor)]),
        }
    }

    /// Adds or overwrites a feature in the `Sample`.
    pub fn with_feature(mut self, name: impl Into<String>, tensor: Tensor) -> Self {
        self.features.insert(name.into(), tensor);
        self
    }

    /// Returns a reference to the tensor by feature name.
    pub fn get(&self, feature: &str) -> Result<&Tensor> {
        self.features
            .get(feature)
            .ok_or_else(|| anyhow!("Feature {} not found", feature))
    }

    /// The transformed full image.
    pub fn full_img(&self) -> Result<&Tensor> {
        self.get(FULL_IMG)
    }

    /// The transformed center crop.
    pub fn crop_img(&self) -> Result<&Tensor> {
        self.get(CROP_IMG)
    }

    /// Returns an iterator over all feature names in this `Sample`.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod sample_test {
    use super::*;
    use tch::{Device, Kind, Tensor};

    #[test]
    fn test_pair_sample_features() -> Result<()> {
        let sample = Sample::pair(
            Tensor::ones(&[3, 4, 4], (Kind::Float, Device::Cpu)),
            Tensor::zeros(&[3, 2, 2], (Kind::Float, Device::Cpu)),
        );

        assert_eq!(sample.full_img()?.size(), vec![3, 4, 4]);
        assert_eq!(sample.crop_img()?.size(), vec![3, 2, 2]);
        assert!(sample.get("label").is_err());

        let mut names: Vec<_> = sample.features().collect();
        names.sort_unstable();
        assert_eq!(names, vec![CROP_IMG, FULL_IMG]);
        Ok(())
    }

    #[test]
    fn test_shallow_clone_shares_storage() -> Result<()> {
        let sample = Sample::from_single("x", Tensor::from_slice(&[1.0_f32, 2.0]));
        let cloned = sample.clone().with_feature("y", Tensor::from(3_i64));

        assert!(sample.get("y").is_err());
        assert!(cloned.get("x")?.equal(sample.get("x")?));
        Ok(())
    }
}

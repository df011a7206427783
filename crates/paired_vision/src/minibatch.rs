use crate::collator::Collator;
use crate::sample::Sample;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use tch::{Device, Tensor};

/// A batch of samples stacked along dim 0.
///
/// For image-pair samples of `[3, H, W]` full images and `[3, h, w]` crops,
/// a batch of `N` holds:
/// - `"full_img"` -> shape `[N, 3, H, W]`
/// - `"crop_img"` -> shape `[N, 3, h, w]`
#[derive(Debug)]
pub struct MiniBatch {
    pub tensors: HashMap<String, Tensor>,
}

impl MiniBatch {
    /// Constructs a `MiniBatch` by applying the given [`Collator`].
    pub fn collate(samples: Vec<Sample>, collator: impl Collator) -> Result<Self> {
        collator.collate(&samples)
    }

    /// Returns the number of samples in the batch.
    pub fn batch_size(&self) -> Result<i64> {
        self.tensors
            .values()
            .next()
            .map(|t| t.size()[0])
            .ok_or(anyhow!("Empty mini-batch"))
    }

    /// Returns a reference to the tensor for a given feature key.
    pub fn get(&self, feature: &str) -> Result<&Tensor> {
        self.tensors
            .get(feature)
            .ok_or_else(|| anyhow!("Feature '{}' not found in mini-batch", feature))
    }

    /// Returns an iterator over all feature keys in the batch.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.tensors.keys().map(String::as_str)
    }

    /// Transfers all tensors to the target device (CPU/GPU)
    pub fn to_device(&self, device: Device) -> Self {
        Self {
            tensors: self
                .tensors
                .iter()
                .map(|(feature_name, tensor)| (feature_name.clone(), tensor.to_device(device)))
                .collect(),
        }
    }
}

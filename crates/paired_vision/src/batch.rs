use crate::collator::{stack_same_shape, Collator, StackCollator};
use crate::dataset::MapDataset;
use crate::minibatch::MiniBatch;
use crate::sample::Sample;
use anyhow::{Context, Result};
use rayon::prelude::*;
use tch::{Device, Tensor};

/// A batch of image pairs ready for a model step.
///
/// - `inputs`: `"full_img"` `[N, 3, H, W]` and `"crop_img"` `[N, 3, h, w]`
/// - `labels`: `[N]` for scalar labels, `[N, K]` for `K`-element vectors
#[derive(Debug)]
pub struct PairBatch {
    pub inputs: MiniBatch,
    pub labels: Tensor,
}

impl PairBatch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.labels.size().first().copied().unwrap_or(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transfers inputs and labels to the target device (CPU/GPU)
    pub fn to_device(&self, device: Device) -> Self {
        Self {
            inputs: self.inputs.to_device(device),
            labels: self.labels.to_device(device),
        }
    }
}

/// Fetches `indices` from `dataset` on the rayon pool and stacks the results.
///
/// Samples keep the order of `indices`. If any fetch fails the whole batch
/// fails with that fetch's error (annotated with its index); there is no
/// partial batch.
///
/// # Example
/// ```ignore
/// let batch = fetch_batch(&dataset, &[0, 5, 7, 2])?;
/// assert_eq!(batch.inputs.get("full_img")?.size()[0], 4);
/// ```
pub fn fetch_batch<D>(dataset: &D, indices: &[usize]) -> Result<PairBatch>
where
    D: MapDataset<Item = (Sample, Tensor)>,
{
    let items: Vec<(Sample, Tensor)> = indices
        .par_iter()
        .map(|&index| {
            dataset
                .get(index)
                .with_context(|| format!("Failed to fetch index {}", index))
        })
        .collect::<Result<_>>()?;

    let (samples, labels): (Vec<Sample>, Vec<Tensor>) = items.into_iter().unzip();
    let inputs = StackCollator.collate(&samples)?;
    let labels = stack_same_shape(&labels).context("Failed to stack labels")?;

    log::trace!("assembled batch of {}", samples.len());
    Ok(PairBatch { inputs, labels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PairError;
    use tch::Kind;

    /// Synthetic dataset: item `i` is filled with `i`, label `i % 2`.
    struct Counting(usize);

    impl MapDataset for Counting {
        type Item = (Sample, Tensor);

        fn get(&self, index: usize) -> Result<Self::Item> {
            if index >= self.0 {
                return Err(PairError::IndexOutOfBounds {
                    index,
                    len: self.0,
                }
                .into());
            }
            let fill = index as f64;
            Ok((
                Sample::pair(
                    Tensor::full(&[3, 4, 4], fill, (Kind::Float, Device::Cpu)),
                    Tensor::full(&[3, 2, 2], fill, (Kind::Float, Device::Cpu)),
                ),
                Tensor::from((index % 2) as f32),
            ))
        }

        fn len(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn test_fetch_batch_keeps_order() -> Result<()> {
        let batch = fetch_batch(&Counting(10), &[7, 2, 9, 4])?;

        assert_eq!(batch.len(), 4);
        assert_eq!(batch.inputs.get("full_img")?.size(), vec![4, 3, 4, 4]);
        assert_eq!(batch.inputs.get("crop_img")?.size(), vec![4, 3, 2, 2]);

        let firsts: Vec<f64> = (0..4)
            .map(|i| batch.inputs.get("full_img").map(|t| t.double_value(&[i, 0, 0, 0])))
            .collect::<Result<_>>()?;
        assert_eq!(firsts, vec![7.0, 2.0, 9.0, 4.0]);

        let labels: Vec<f32> = Vec::try_from(&batch.labels)?;
        assert_eq!(labels, vec![1.0, 0.0, 1.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_fetch_batch_fails_whole_batch() {
        let err = fetch_batch(&Counting(3), &[0, 1, 3]).unwrap_err();
        assert!(err.to_string().contains("index 3"));
        assert_eq!(
            err.downcast_ref::<PairError>(),
            Some(&PairError::IndexOutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_fetch_batch_empty_indices() {
        assert!(fetch_batch(&Counting(3), &[]).is_err());
    }
}

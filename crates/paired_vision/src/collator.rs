use crate::minibatch::MiniBatch;
use crate::sample::Sample;
use anyhow::{bail, Context, Result};
use std::collections::{HashMap, HashSet};
use tch::Tensor;

/// A `Collator` defines how to combine multiple [`Sample`]s into a [`MiniBatch`].
pub trait Collator {
    fn collate(&self, samples: &[Sample]) -> Result<MiniBatch>;
}

/// A `Collator` that stacks tensors with identical shapes along the batch
/// dimension (dim 0). There is no padding: every sample must carry the same
/// feature names, and each feature must have the same shape in every sample.
///
/// Image-pair samples satisfy this as long as both pipelines resize to a
/// fixed size (the standard presets do).
#[derive(Debug, Clone, Copy, Default)]
pub struct StackCollator;

impl Collator for StackCollator {
    fn collate(&self, samples: &[Sample]) -> Result<MiniBatch> {
        let Some(first) = samples.first() else {
            bail!("Cannot collate empty sample list");
        };

        // Validate feature keys
        let first_keys: HashSet<&String> = first.features.keys().collect();
        for (i, sample) in samples.iter().enumerate().skip(1) {
            let keys: HashSet<&String> = sample.features.keys().collect();
            if keys != first_keys {
                let missing: Vec<_> = first_keys.difference(&keys).collect();
                let extra: Vec<_> = keys.difference(&first_keys).collect();
                bail!(
                    "Sample #{} has mismatch feature keys:\n -Missing: {:?}\n -Extra: {:?}",
                    i,
                    missing,
                    extra
                )
            }
        }

        let mut tensors = HashMap::with_capacity(first_keys.len());
        for key in first_keys {
            let tensors_to_stack: Vec<&Tensor> = samples
                .iter()
                .map(|s| s.get(key))
                .collect::<Result<_>>()?;
            let stacked = stack_same_shape(&tensors_to_stack)
                .with_context(|| format!("Failed to stack feature '{}'", key))?;
            tensors.insert(key.clone(), stacked);
        }
        Ok(MiniBatch { tensors })
    }
}

/// Stacks tensors along a new dim 0 after checking their shapes agree.
pub fn stack_same_shape<T: std::borrow::Borrow<Tensor>>(tensors: &[T]) -> Result<Tensor> {
    let Some(first) = tensors.first() else {
        bail!("Cannot stack an empty tensor list");
    };
    let reference_shape = first.borrow().size();
    for (i, tensor) in tensors.iter().enumerate() {
        let shape = tensor.borrow().size();
        if shape != reference_shape {
            bail!(
                "Shape mismatch in sample {}: expected {:?}, got {:?}",
                i,
                reference_shape,
                shape
            );
        }
    }
    Ok(Tensor::stack(tensors, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    fn pair(side: i64, fill: f64) -> Sample {
        Sample::pair(
            Tensor::full(&[3, side, side], fill, (Kind::Float, Device::Cpu)),
            Tensor::full(&[3, side / 2, side / 2], fill, (Kind::Float, Device::Cpu)),
        )
    }

    #[test]
    fn test_stack_pairs() -> Result<()> {
        let batch = StackCollator.collate(&[pair(4, 0.0), pair(4, 1.0), pair(4, 2.0)])?;

        assert_eq!(batch.batch_size()?, 3);
        assert_eq!(batch.get("full_img")?.size(), vec![3, 3, 4, 4]);
        assert_eq!(batch.get("crop_img")?.size(), vec![3, 3, 2, 2]);
        assert_eq!(batch.get("crop_img")?.double_value(&[2, 0, 0, 0]), 2.0);
        Ok(())
    }

    #[test]
    fn test_stack_rejects_mismatches() {
        assert!(StackCollator.collate(&[]).is_err());
        assert!(StackCollator.collate(&[pair(4, 0.0), pair(6, 0.0)]).is_err());

        let other = Sample::from_single(
            "full_img",
            Tensor::zeros(&[3, 4, 4], (Kind::Float, Device::Cpu)),
        );
        let err = StackCollator.collate(&[pair(4, 0.0), other]).unwrap_err();
        assert!(err.to_string().contains("mismatch feature keys"));
    }
}

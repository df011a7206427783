use anyhow::{Context, Result};
use image::DynamicImage;
use std::marker::PhantomData;
use std::sync::Arc;
use tch::Tensor;

/// Defines the core `Transform` trait for composable preprocessing pipelines.
///
/// The `Transform<I, O>` trait represents an operation converting an input
/// of type `I` to an output of type `O`. Steps are chained with `.then(...)`
/// into a single, statically dispatched pipeline.
///
/// Note: `then()` works only when:
/// 1. **Types align**: `self: Transform<I, O>`, `next: Transform<O, M>`
/// 2. **Owned**: `Self::Sized` (no trait objects, must be concrete)
/// 3. **Thread-safe**: intermediate and output types must be `Send`
pub trait Transform<I, O>: Send + Sync {
    /// Applies the transformation to the input
    fn apply(&self, input: I) -> Result<O>;

    #[inline]
    fn then<T, M>(self, next: T) -> Chain<Self, T, O>
    where
        Self: Sized,
        T: Transform<O, M>,
        O: Send,
        M: Send,
    {
        Chain {
            first: self,
            second: next,
            _marker: PhantomData,
        }
    }
}

/// A type-erased image pipeline: `DynamicImage` in, model-ready `Tensor` out.
///
/// Presets and custom pipelines both resolve to this type, so a dataset can
/// hold either without being generic over the concrete chain.
pub type ImagePipeline = Arc<dyn Transform<DynamicImage, Tensor>>;

/// Erases a concrete transform chain into an [`ImagePipeline`].
///
/// ```ignore
/// let custom = pipeline(Resize::exact(64, 64, FilterType::Nearest)?.then(ToTensor));
/// ```
pub fn pipeline<T>(transform: T) -> ImagePipeline
where
    T: Transform<DynamicImage, Tensor> + 'static,
{
    Arc::new(transform)
}

impl<I, O, T> Transform<I, O> for Arc<T>
where
    T: Transform<I, O> + ?Sized,
{
    fn apply(&self, input: I) -> Result<O> {
        (**self).apply(input)
    }
}

/// A chain of two transforms (`A` -> `B`)
/// - `PhantomData<M>` enforces intermediate type alignment.
#[derive(Debug)]
pub struct Chain<A, B, M> {
    first: A,
    second: B,
    _marker: PhantomData<fn() -> M>,
}

impl<A, B, M> Chain<A, B, M> {
    /// Creates a new transform chain.
    /// Use [`Transform::then`] for better ergonomics.
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            _marker: PhantomData,
        }
    }
}

impl<I, M, O, A, B> Transform<I, O> for Chain<A, B, M>
where
    A: Transform<I, M>,
    B: Transform<M, O>,
    M: Send,
{
    fn apply(&self, input: I) -> Result<O> {
        self.first
            .apply(input)
            .and_then(|mid| self.second.apply(mid))
            .with_context(|| {
                format!(
                    "Transform chain failed: {} → {} → {}",
                    std::any::type_name::<A>(),
                    std::any::type_name::<B>(),
                    std::any::type_name::<O>()
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::vision::ToTensor;
    use anyhow::anyhow;
    use image::RgbImage;

    struct Invert;
    impl Transform<DynamicImage, DynamicImage> for Invert {
        fn apply(&self, mut img: DynamicImage) -> Result<DynamicImage> {
            img.invert();
            Ok(img)
        }
    }

    #[test]
    fn test_pipeline_construction_using_then() -> Result<()> {
        let chain = Invert.then(ToTensor);
        let tensor = chain.apply(DynamicImage::ImageRgb8(RgbImage::new(2, 2)))?;
        assert_eq!(tensor.size(), vec![3, 2, 2]);
        assert_eq!(tensor.double_value(&[0, 0, 0]), 1.0); // black inverted to white
        Ok(())
    }

    #[test]
    fn test_erased_pipeline_is_shareable() -> Result<()> {
        let erased = pipeline(Chain::new(Invert, ToTensor));
        let shared = erased.clone();

        let handle = std::thread::spawn(move || {
            shared
                .apply(DynamicImage::ImageRgb8(RgbImage::new(1, 1)))
                .map(|t| t.size())
        });
        let size = handle.join().map_err(|_| anyhow!("worker panicked"))??;
        assert_eq!(size, vec![3, 1, 1]);
        assert_eq!(Arc::strong_count(&erased), 1);
        Ok(())
    }

    #[test]
    fn test_pipeline_chain_error_context() {
        struct Fail;
        impl Transform<DynamicImage, DynamicImage> for Fail {
            fn apply(&self, _: DynamicImage) -> Result<DynamicImage> {
                Err(anyhow!("Test error"))
            }
        }

        let chain = Chain::new(Fail, ToTensor);
        let err = chain
            .apply(DynamicImage::ImageRgb8(RgbImage::new(1, 1)))
            .unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("Transform chain failed"));
        assert!(msg.contains("Fail"));
        assert!(msg.contains("ToTensor"));
    }
}

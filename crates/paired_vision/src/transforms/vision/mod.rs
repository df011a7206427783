//! Vision transforms for image preprocessing and augmentation.
//!
//! ```text
//! transforms/vision/
//! ├── geometric.rs     → Spatial transformations (rgb, resize, center crop, rotate)
//! ├── photometric.rs   → Per-channel normalization
//! ├── conversion.rs    → image → tensor
//! ├── augmentation.rs  → Random horizontal flip
//! └── io.rs            → Image loading
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use crate::transforms::{pipeline, Transform};
//! use crate::transforms::vision::{Resize, ToTensor, Normalize};
//! use image::imageops::FilterType;
//!
//! let val = pipeline(
//!     Resize::exact(224, 224, FilterType::Triangle)?
//!         .then(ToTensor)
//!         .then(Normalize::imagenet()),
//! );
//! ```

pub mod augmentation;
pub mod conversion;
pub mod geometric;
pub mod io;
pub mod photometric;

pub use augmentation::RandomHorizontalFlip;
pub use conversion::ToTensor;
pub use geometric::{CenterCrop, EnsureRGB, RandomRotation, Resize};
pub use io::LoadImage;
pub use photometric::Normalize;

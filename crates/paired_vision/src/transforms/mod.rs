pub mod core;
pub mod vision;

pub use core::{pipeline, Chain, ImagePipeline, Transform};

pub mod manifest;

pub use manifest::{ManifestEntry, ManifestSource};

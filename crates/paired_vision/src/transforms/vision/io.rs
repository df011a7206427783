use crate::transforms::Transform;
use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

// ============================================================================
// LoadImage
// ============================================================================

/// Loads images from file paths.
///
/// Reads the whole file through a buffered reader, then decodes it with the
/// format guessed from the file content (not the extension). The file handle
/// is closed before this returns; nothing is cached between calls.
///
/// # Input/Output
/// - **Input**: `PathBuf` - File path to image
/// - **Output**: `DynamicImage` - Decoded image in its native colour type
///
/// # Example
/// ```ignore
/// let loader = LoadImage::new();
/// let image = loader.apply(PathBuf::from("photo.jpg"))?;
/// println!("Image size: {:?}", image.dimensions());
/// ```
#[derive(Debug, Clone)]
pub struct LoadImage {
    buffer_size: usize,
}

impl Default for LoadImage {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadImage {
    /// Creates a new image loader with an 8KB read buffer.
    pub fn new() -> Self {
        Self { buffer_size: 8192 }
    }

    /// Loads the image at `path`. Borrowing counterpart of [`Transform::apply`].
    pub fn load(&self, path: &Path) -> Result<DynamicImage> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?;

        let file_size = file
            .metadata()
            .with_context(|| format!("Failed to stat image: {}", path.display()))?
            .len() as usize;
        let mut reader = BufReader::with_capacity(self.buffer_size, file);
        let mut buffer = Vec::with_capacity(file_size);
        reader
            .read_to_end(&mut buffer)
            .with_context(|| format!("Failed to read image: {}", path.display()))?;

        let image = ImageReader::new(Cursor::new(buffer))
            .with_guessed_format()?
            .decode()
            .with_context(|| format!("Failed to decode image: {}", path.display()))?;

        log::trace!(
            "decoded {} ({}x{}, {:?})",
            path.display(),
            image.width(),
            image.height(),
            image.color()
        );
        Ok(image)
    }
}

impl Transform<PathBuf, DynamicImage> for LoadImage {
    fn apply(&self, path: PathBuf) -> Result<DynamicImage> {
        self.load(&path)
    }
}

// ============================================================================
// Tests
// ============================================================================

use crate::label::Label;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

/// One line of a manifest file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub label: Label,
}

/// Reads `(path, label)` pairs from a JSONL manifest.
///
/// Each non-blank line is an object with a `path` string and a numeric
/// (or array-of-numbers) `label`:
/// ```text
/// {"path": "images/0001.jpg", "label": 1}
/// {"path": "images/0002.jpg", "label": [0, 1, 1]}
/// ```
/// Relative paths are joined onto the root given with [`with_root`](Self::with_root).
/// Image files are not touched while reading.
///
/// # Example
/// ```ignore
/// let (paths, labels) = ManifestSource::new("train.jsonl").with_root("data/").load()?;
/// let dataset = ImagePairDataset::new(paths, labels, TransformSpec::train(), TransformSpec::train(), &registry)?;
/// ```
pub struct ManifestSource {
    path: PathBuf,
    root: Option<PathBuf>,
}

impl ManifestSource {
    /// Creates a reader for the manifest at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root: None,
        }
    }

    /// Directory that relative image paths are resolved against.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Streams entries lazily, one per non-blank line.
    ///
    /// # Errors
    /// - Fails if the file cannot be opened.
    /// - Yields an error carrying the line number for invalid JSON or
    ///   a label that is not numeric.
    pub fn stream(&self) -> Result<impl Iterator<Item = Result<ManifestEntry>> + Send + '_> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open manifest {}", self.path.display()))?;
        let reader = BufReader::new(file);

        Ok(reader
            .lines()
            .enumerate()
            .filter_map(move |(line_num, line)| {
                let line = match line {
                    Ok(l) if l.trim().is_empty() => return None, // Skip blanks
                    Ok(l) => l,
                    Err(e) => return Some(Err(e.into())),
                };
                Some(
                    serde_json::from_str::<ManifestEntry>(&line)
                        .map(|entry| self.resolve(entry))
                        .with_context(|| format!("Invalid manifest entry at line {}", line_num + 1)),
                )
            }))
    }

    /// Reads the whole manifest into the parallel sequences the dataset takes.
    pub fn load(&self) -> Result<(Vec<PathBuf>, Vec<Label>)> {
        let mut paths = Vec::new();
        let mut labels = Vec::new();
        for entry in self.stream()? {
            let entry = entry?;
            paths.push(entry.path);
            labels.push(entry.label);
        }
        log::debug!("read {} entries from {}", paths.len(), self.path.display());
        Ok((paths, labels))
    }

    fn resolve(&self, mut entry: ManifestEntry) -> ManifestEntry {
        if let Some(root) = &self.root {
            if entry.path.is_relative() {
                entry.path = root.join(&entry.path);
            }
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_manifest_load() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, r#"{{"path": "a.png", "label": 1}}"#)?;
        writeln!(file)?;
        writeln!(file, r#"{{"path": "/abs/b.png", "label": [0, 1.5]}}"#)?;

        let (paths, labels) = ManifestSource::new(file.path()).with_root("/data").load()?;
        assert_eq!(
            paths,
            vec![PathBuf::from("/data/a.png"), PathBuf::from("/abs/b.png")]
        );
        assert_eq!(
            labels,
            vec![Label::Scalar(1.0), Label::Vector(vec![0.0, 1.5])]
        );
        Ok(())
    }

    #[test]
    fn test_manifest_bad_label_reports_line() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, r#"{{"path": "a.png", "label": 0}}"#)?;
        writeln!(file, r#"{{"path": "b.png", "label": "dog"}}"#)?;

        let err = ManifestSource::new(file.path()).load().unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(format!("{err:#}").contains("not convertible to a numeric array"));
        Ok(())
    }

    #[test]
    fn test_manifest_missing_file() {
        assert!(ManifestSource::new("/no/such/manifest.jsonl").load().is_err());
    }
}

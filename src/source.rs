//! Content source abstraction for reading dashboard documents from the
//! filesystem or from a zipped run bundle.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::io::Read;

/// Trait for abstracting document I/O (filesystem vs. ZIP bundle).
///
/// Every call re-reads the underlying document; sources never cache. Caching
/// of run snapshots is the caller's decision (see [`crate::history`]).
pub trait ContentSource {
    /// Read a document at the given logical path and return its content.
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String>;
}

impl<S: ContentSource + ?Sized> ContentSource for Box<S> {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        (**self).read_to_string(path)
    }
}

/// Reads documents directly from the local filesystem.
pub struct FsSource;

impl ContentSource for FsSource {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        std::fs::read_to_string(path.as_std_path())
            .with_context(|| format!("Failed to read {}", path))
    }
}

/// Reads documents from a ZIP archive, e.g. an archived run-history bundle.
pub struct ZipSource<R: Read + std::io::Seek> {
    zip: zip::ZipArchive<R>,
}

impl<R: Read + std::io::Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let zip = zip::ZipArchive::new(reader).context("Failed to open zip archive")?;
        Ok(Self { zip })
    }
}

impl ZipSource<std::io::BufReader<std::fs::File>> {
    /// Open a bundle from disk.
    pub fn open(path: &Utf8Path) -> Result<Self> {
        let file = std::fs::File::open(path).with_context(|| format!("Open {}", path))?;
        Self::new(std::io::BufReader::new(file))
    }
}

fn archive_name(path: &Utf8Path) -> String {
    path.as_str()
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_string()
}

impl<R: Read + std::io::Seek> ContentSource for ZipSource<R> {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        let name = archive_name(path);
        let mut entry = self
            .zip
            .by_name(&name)
            .with_context(|| format!("{} is not in the bundle", name))?;
        let mut text = String::with_capacity(entry.size() as usize);
        entry
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to read {} from the bundle", name))?;
        Ok(text)
    }
}

/// Read and parse a JSON document, mapping failures onto the dashboard error
/// taxonomy for `document`.
pub fn read_json<T, S>(
    source: &mut S,
    path: &Utf8Path,
    document: crate::error::DocumentKind,
) -> Result<T, crate::error::DashboardError>
where
    T: serde::de::DeserializeOwned,
    S: ContentSource + ?Sized,
{
    let text = source
        .read_to_string(path)
        .map_err(|e| crate::error::DashboardError::Load {
            document,
            location: path.to_string(),
            reason: format!("{e:#}"),
        })?;
    serde_json::from_str(&text)
        .map_err(|e| crate::error::DashboardError::from_json(document, path.as_str(), e))
}

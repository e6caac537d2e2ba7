use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::foundation::error::{AnnotateError, AnnotateResult};

/// Resolves a base-image reference to encoded image bytes.
///
/// References are opaque to the engine; a host typically uses a relative path such as
/// `teeth-image/18.png`.
pub trait ImageSource {
    /// Fetch the encoded bytes behind `reference`.
    fn load(&self, reference: &str) -> AnnotateResult<Vec<u8>>;
}

/// Reads base images from a directory on disk.
#[derive(Clone, Debug)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    /// Source rooted at `root`; references are resolved relative to it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageSource for FsImageSource {
    fn load(&self, reference: &str) -> AnnotateResult<Vec<u8>> {
        let norm = normalize_rel_path(reference)?;
        let p = self.root.join(Path::new(&norm));
        std::fs::read(&p).map_err(|e| {
            AnnotateError::asset(format!("failed to read image '{}': {e}", p.display()))
        })
    }
}

/// In-memory source, mostly for tests and embedded assets.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageSource {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryImageSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `reference`, replacing any previous entry.
    pub fn insert(&mut self, reference: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(reference.into(), bytes);
    }

    /// Builder form of [`MemoryImageSource::insert`].
    pub fn with(mut self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(reference, bytes);
        self
    }
}

impl ImageSource for MemoryImageSource {
    fn load(&self, reference: &str) -> AnnotateResult<Vec<u8>> {
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| AnnotateError::asset(format!("no image registered for '{reference}'")))
    }
}

/// Normalize and validate a source-relative image path.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> AnnotateResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(AnnotateError::validation("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(AnnotateError::validation("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(AnnotateError::validation("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(AnnotateError::validation(
            "image path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;

//! Providers of the ordered image list a session labels.
//!
//! A provider yields image identifiers in a stable order and can hand back
//! either the bytes or a URL for one identifier. Decoding is left to the
//! presentation layer.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::ImageId;

/// File extensions recognised as images, lowercase and without the dot.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif", "svg",
];

/// Characters that are not allowed in file names on common filesystems.
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// How to obtain the pixels of one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageHandle {
    Bytes {
        #[serde(skip)]
        data: Vec<u8>,
        len: usize,
    },
    Url {
        url: String,
    },
}

impl ImageHandle {
    pub fn bytes(data: Vec<u8>) -> Self {
        let len = data.len();
        Self::Bytes { data, len }
    }
}

pub trait ImageSource: Send + Sync {
    /// Ordered image identifiers.
    fn list(&self) -> Result<Vec<ImageId>, CoreError>;

    fn fetch(&self, image_id: &str) -> Result<ImageHandle, CoreError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whether `name` ends in one of [`IMAGE_EXTENSIONS`], ignoring case.
pub fn is_image_filename(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Trim a file name and replace filesystem-invalid characters with `_`.
pub fn clean_filename(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Parse pasted text into image file names, one per line.
///
/// Lines are cleaned with [`clean_filename`]; blank lines and non-image
/// names are dropped. Order is preserved.
pub fn parse_file_list(text: &str) -> Vec<String> {
    text.lines()
        .map(clean_filename)
        .filter(|name| !name.is_empty() && is_image_filename(name))
        .collect()
}

// ---------------------------------------------------------------------------
// ManualListSource
// ---------------------------------------------------------------------------

/// Image names typed or pasted by the user.
#[derive(Debug, Clone, Default)]
pub struct ManualListSource {
    names: Vec<String>,
    base_url: Option<String>,
}

impl ManualListSource {
    /// Use `names` as given, without cleaning or filtering.
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            base_url: None,
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            names: parse_file_list(text),
            base_url: None,
        }
    }

    /// Serve `fetch` as `<base_url>/<image_id>`, the id percent-encoded.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl ImageSource for ManualListSource {
    fn list(&self) -> Result<Vec<ImageId>, CoreError> {
        Ok(self.names.clone())
    }

    fn fetch(&self, image_id: &str) -> Result<ImageHandle, CoreError> {
        if !self.names.iter().any(|n| n == image_id) {
            return Err(CoreError::NotFound {
                entity: "Image",
                id: image_id.to_string(),
            });
        }
        let base = self.base_url.as_deref().ok_or_else(|| {
            CoreError::Source(format!("no base URL configured to fetch '{image_id}'"))
        })?;
        Ok(ImageHandle::Url {
            url: format!(
                "{}/{}",
                base.trim_end_matches('/'),
                urlencoding::encode(image_id)
            ),
        })
    }

    fn describe(&self) -> String {
        format!("manual list ({} names)", self.names.len())
    }
}

// ---------------------------------------------------------------------------
// DirectorySource
// ---------------------------------------------------------------------------

/// Image files in one local directory, sorted by name. Not recursive.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageSource for DirectorySource {
    fn list(&self) -> Result<Vec<ImageId>, CoreError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            CoreError::Source(format!("cannot read {}: {e}", self.root.display()))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::Source(e.to_string()))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            // Non-UTF-8 names cannot be image ids.
            if let Ok(name) = entry.file_name().into_string() {
                if is_image_filename(&name) {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn fetch(&self, image_id: &str) -> Result<ImageHandle, CoreError> {
        let not_found = || CoreError::NotFound {
            entity: "Image",
            id: image_id.to_string(),
        };
        if image_id.is_empty()
            || image_id.contains(['/', '\\'])
            || image_id == ".."
            || !is_image_filename(image_id)
        {
            return Err(not_found());
        }

        let path = self.root.join(image_id);
        match std::fs::read(&path) {
            Ok(data) => Ok(ImageHandle::bytes(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(CoreError::Source(format!("cannot read {}: {e}", path.display()))),
        }
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

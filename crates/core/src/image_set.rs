//! The ordered list of images being labelled in a session.

use std::collections::HashSet;

use serde::Serialize;

use crate::source::clean_filename;
use crate::types::ImageId;

/// Canonical form of an image id: trimmed, with path separators and other
/// filesystem-invalid characters replaced by `_`.
///
/// Every id entering an image set, the store or a lookup goes through this,
/// so one image always has exactly one key and survives the CSV
/// `label/id` path split.
pub fn normalize_image_id(raw: &str) -> ImageId {
    clean_filename(raw)
}

/// Ordered, duplicate-free sequence of image identifiers.
///
/// Order defines navigation order. The set is immutable once built; a new
/// list means a new `ImageSet`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageSet {
    ids: Vec<ImageId>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from an ordered id list.
    ///
    /// Ids are normalized with [`normalize_image_id`]. Blank ids are dropped
    /// and repeated ids keep their first position.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut duplicates = 0usize;
        for id in ids {
            let id = normalize_image_id(&id.into());
            if id.is_empty() {
                continue;
            }
            if seen.insert(id.clone()) {
                out.push(id);
            } else {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            tracing::warn!(duplicates, "Dropped repeated image ids from image list");
        }
        Self { ids: out }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|i| i == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[ImageId] {
        &self.ids
    }
}

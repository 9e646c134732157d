//! The annotation store: at most one record per image, in insertion order.

use indexmap::IndexMap;

use crate::annotation::{validate_annotation, Annotation, AnnotationDraft};
use crate::error::CoreError;
use crate::image_set::{normalize_image_id, ImageSet};
use crate::types::ImageId;

/// Mutable collection of annotations keyed by image id.
///
/// Iteration follows insertion order. Replacing an existing record keeps
/// its original position.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    records: IndexMap<ImageId, Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `draft` and insert or replace the record for its image.
    ///
    /// The key is the normalized image id. On validation failure the store
    /// is left untouched.
    pub fn save(&mut self, draft: &AnnotationDraft) -> Result<&Annotation, CoreError> {
        let fields = validate_annotation(draft)?;
        let image_id = normalize_image_id(&draft.image_id);
        let annotation = Annotation::new(
            image_id,
            draft.source_label.as_str(),
            fields,
            draft.notes.as_str(),
        );
        Ok(self.upsert(annotation))
    }

    /// Insert or replace an already-validated record.
    pub(crate) fn upsert(&mut self, annotation: Annotation) -> &Annotation {
        let (index, _) = self
            .records
            .insert_full(annotation.image_id.clone(), annotation);
        &self.records[index]
    }

    pub fn get(&self, image_id: &str) -> Option<&Annotation> {
        self.records.get(image_id)
    }

    pub fn contains(&self, image_id: &str) -> bool {
        self.records.contains_key(image_id)
    }

    /// Remove the record for `image_id`. Returns whether one existed.
    pub fn delete(&mut self, image_id: &str) -> bool {
        self.records.shift_remove(image_id).is_some()
    }

    pub fn clear_all(&mut self) {
        self.records.clear();
    }

    /// Every id in `images` without a record, in image-set order.
    pub fn list_unannotated<'a>(&self, images: &'a ImageSet) -> Vec<&'a str> {
        images.iter().filter(|id| !self.contains(id)).collect()
    }

    /// Number of ids in `images` that have a record.
    pub fn annotated_in(&self, images: &ImageSet) -> usize {
        images.iter().filter(|id| self.contains(id)).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

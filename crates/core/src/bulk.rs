//! Bulk labelling of every image that has no record yet.

use serde::{Deserialize, Serialize};

use crate::annotation::{AnnotationDraft, AnnotationFields, Category, Field, Gender, Validity};
use crate::error::CoreError;
use crate::image_set::ImageSet;
use crate::store::AnnotationStore;

/// Label values to stamp onto unannotated images.
///
/// Every field must be set before the template can be applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkTemplate {
    #[serde(default)]
    pub validity: Option<Validity>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub category: Option<Category>,
}

impl BulkTemplate {
    pub fn resolve(&self) -> Result<AnnotationFields, CoreError> {
        Ok(AnnotationFields {
            validity: self.validity.ok_or(CoreError::MissingField(Field::Validity))?,
            gender: self.gender.ok_or(CoreError::MissingField(Field::Gender))?,
            category: self.category.ok_or(CoreError::MissingField(Field::Category))?,
        })
    }
}

impl From<AnnotationFields> for BulkTemplate {
    fn from(fields: AnnotationFields) -> Self {
        Self {
            validity: Some(fields.validity),
            gender: Some(fields.gender),
            category: Some(fields.category),
        }
    }
}

/// Save `fields` for every id in `images` that has no record.
///
/// Existing records are never touched. Returns the number of records
/// created.
pub fn apply_to_unannotated(
    store: &mut AnnotationStore,
    images: &ImageSet,
    fields: AnnotationFields,
    source_label: &str,
) -> usize {
    let targets: Vec<String> = store
        .list_unannotated(images)
        .into_iter()
        .map(str::to_string)
        .collect();
    if targets.is_empty() {
        return 0;
    }

    let mut applied = 0;
    for id in &targets {
        let draft = AnnotationDraft::from_fields(id.as_str(), fields, source_label);
        match store.save(&draft) {
            Ok(_) => applied += 1,
            Err(e) => tracing::warn!(image_id = %id, error = %e, "Bulk apply skipped image"),
        }
    }

    tracing::info!(
        applied,
        candidates = targets.len(),
        validity = %fields.validity,
        gender = %fields.gender,
        category = %fields.category,
        "Bulk apply finished"
    );
    applied
}

//! Annotation record model and validation.
//!
//! Defines the closed value sets for validity, gender and garment category,
//! the raw [`AnnotationDraft`] submitted by a presentation layer, and the
//! validated [`Annotation`] record held by the store.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{ImageId, Timestamp};

// ---------------------------------------------------------------------------
// Wire codes
// ---------------------------------------------------------------------------

pub const VALIDITY_VALID: &str = "Valid";
pub const VALIDITY_INVALID: &str = "Invalid";

pub const GENDER_MALE: &str = "M";
pub const GENDER_FEMALE: &str = "F";
pub const GENDER_BOTH: &str = "M+F";

pub const CATEGORY_TOP: &str = "Top";
pub const CATEGORY_BOTTOM: &str = "Bottom";
pub const CATEGORY_FOOTWEAR: &str = "Footwear";
pub const CATEGORY_HEADWEAR: &str = "Headwear";
pub const CATEGORY_ACCESSORY: &str = "Accessory";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Whether an image is usable for downstream training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Validity {
    Valid,
    Invalid,
}

impl Validity {
    pub const ALL: [Validity; 2] = [Self::Valid, Self::Invalid];

    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            VALIDITY_VALID => Ok(Self::Valid),
            VALIDITY_INVALID => Ok(Self::Invalid),
            _ => Err(CoreError::InvalidEnum {
                field: Field::Validity,
                value: s.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => VALIDITY_VALID,
            Self::Invalid => VALIDITY_INVALID,
        }
    }
}

/// Which gender(s) a garment applies to.
///
/// Only the three non-empty combinations exist; "no gender" is not a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M+F")]
    Both,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Self::Male, Self::Female, Self::Both];

    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            GENDER_MALE => Ok(Self::Male),
            GENDER_FEMALE => Ok(Self::Female),
            GENDER_BOTH => Ok(Self::Both),
            _ => Err(CoreError::InvalidEnum {
                field: Field::Gender,
                value: s.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => GENDER_MALE,
            Self::Female => GENDER_FEMALE,
            Self::Both => GENDER_BOTH,
        }
    }

    /// Build a combination from the two form checkboxes.
    ///
    /// Returns `None` when neither box is checked.
    pub fn from_flags(male: bool, female: bool) -> Option<Self> {
        match (male, female) {
            (true, true) => Some(Self::Both),
            (true, false) => Some(Self::Male),
            (false, true) => Some(Self::Female),
            (false, false) => None,
        }
    }
}

/// Garment category. Exactly one per annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Top,
    Bottom,
    Footwear,
    Headwear,
    Accessory,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Top,
        Self::Bottom,
        Self::Footwear,
        Self::Headwear,
        Self::Accessory,
    ];

    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            CATEGORY_TOP => Ok(Self::Top),
            CATEGORY_BOTTOM => Ok(Self::Bottom),
            CATEGORY_FOOTWEAR => Ok(Self::Footwear),
            CATEGORY_HEADWEAR => Ok(Self::Headwear),
            CATEGORY_ACCESSORY => Ok(Self::Accessory),
            _ => Err(CoreError::InvalidEnum {
                field: Field::Category,
                value: s.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => CATEGORY_TOP,
            Self::Bottom => CATEGORY_BOTTOM,
            Self::Footwear => CATEGORY_FOOTWEAR,
            Self::Headwear => CATEGORY_HEADWEAR,
            Self::Accessory => CATEGORY_ACCESSORY,
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(Validity, Gender, Category, Field);

/// Annotation fields that validation can complain about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ImageId,
    Validity,
    Gender,
    Category,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImageId => "image_id",
            Self::Validity => "validity",
            Self::Gender => "gender",
            Self::Category => "category",
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// The three label values, already validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationFields {
    pub validity: Validity,
    pub gender: Gender,
    pub category: Category,
}

/// A candidate annotation as submitted by a caller, before validation.
///
/// Label values are kept as raw strings so that absent, empty and unknown
/// values can each be reported precisely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationDraft {
    pub image_id: String,
    #[serde(default)]
    pub validity: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source_label: String,
    #[serde(default)]
    pub notes: String,
}

impl AnnotationDraft {
    /// Build a draft from already-typed values.
    pub fn from_fields(
        image_id: impl Into<String>,
        fields: AnnotationFields,
        source_label: impl Into<String>,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            validity: Some(fields.validity.as_str().to_string()),
            gender: Some(fields.gender.as_str().to_string()),
            category: Some(fields.category.as_str().to_string()),
            source_label: source_label.into(),
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// One label record for exactly one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub image_id: ImageId,
    pub source_label: String,
    pub validity: Validity,
    pub gender: Gender,
    pub category: Category,
    pub notes: String,
    export_path: String,
    pub updated_at: Timestamp,
}

impl Annotation {
    pub fn new(
        image_id: impl Into<String>,
        source_label: impl Into<String>,
        fields: AnnotationFields,
        notes: impl Into<String>,
    ) -> Self {
        let image_id = image_id.into();
        let source_label = source_label.into();
        let export_path = export_path_for(&source_label, &image_id);
        Self {
            image_id,
            source_label,
            validity: fields.validity,
            gender: fields.gender,
            category: fields.category,
            notes: notes.into(),
            export_path,
            updated_at: chrono::Utc::now(),
        }
    }

    /// `source_label/image_id`, fixed when the record was saved.
    pub fn export_path(&self) -> &str {
        &self.export_path
    }

    pub fn fields(&self) -> AnnotationFields {
        AnnotationFields {
            validity: self.validity,
            gender: self.gender,
            category: self.category,
        }
    }
}

/// Export path of an image within a labelled group.
pub fn export_path_for(source_label: &str, image_id: &str) -> String {
    format!("{source_label}/{image_id}")
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a draft and return its typed label values.
///
/// Presence of every required field is checked first, then each value is
/// matched against its closed set. Values are trimmed before matching.
pub fn validate_annotation(draft: &AnnotationDraft) -> Result<AnnotationFields, CoreError> {
    if draft.image_id.trim().is_empty() {
        return Err(CoreError::MissingField(Field::ImageId));
    }
    let validity = required(&draft.validity, Field::Validity)?;
    let gender = required(&draft.gender, Field::Gender)?;
    let category = required(&draft.category, Field::Category)?;

    Ok(AnnotationFields {
        validity: Validity::from_str_value(validity)?,
        gender: Gender::from_str_value(gender)?,
        category: Category::from_str_value(category)?,
    })
}

fn required(value: &Option<String>, field: Field) -> Result<&str, CoreError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CoreError::MissingField(field)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn draft(validity: &str, gender: &str, category: &str) -> AnnotationDraft {
        AnnotationDraft {
            image_id: "x.jpg".to_string(),
            validity: Some(validity.to_string()),
            gender: Some(gender.to_string()),
            category: Some(category.to_string()),
            source_label: "skirt".to_string(),
            notes: String::new(),
        }
    }

    // -- enums ---------------------------------------------------------------

    #[test]
    fn wire_codes_match_constants() {
        for v in Validity::ALL {
            assert_eq!(Validity::from_str_value(v.as_str()).unwrap(), v);
        }
        for g in Gender::ALL {
            assert_eq!(Gender::from_str_value(g.as_str()).unwrap(), g);
        }
        for c in Category::ALL {
            assert_eq!(Category::from_str_value(c.as_str()).unwrap(), c);
        }
    }

    #[test]
    fn gender_serializes_as_wire_code() {
        assert_eq!(serde_json::to_string(&Gender::Both).unwrap(), "\"M+F\"");
        let parsed: Gender = serde_json::from_str("\"F\"").unwrap();
        assert_eq!(parsed, Gender::Female);
    }

    #[test]
    fn gender_from_flags() {
        assert_eq!(Gender::from_flags(true, true), Some(Gender::Both));
        assert_eq!(Gender::from_flags(true, false), Some(Gender::Male));
        assert_eq!(Gender::from_flags(false, true), Some(Gender::Female));
        assert_eq!(Gender::from_flags(false, false), None);
    }

    #[test]
    fn lowercase_category_rejected() {
        assert_matches!(
            Category::from_str_value("top"),
            Err(CoreError::InvalidEnum { field: Field::Category, .. })
        );
    }

    // -- validate_annotation -------------------------------------------------

    #[test]
    fn valid_draft_accepted() {
        let fields = validate_annotation(&draft("Invalid", "F", "Bottom")).unwrap();
        assert_eq!(fields.validity, Validity::Invalid);
        assert_eq!(fields.gender, Gender::Female);
        assert_eq!(fields.category, Category::Bottom);
    }

    #[test]
    fn values_are_trimmed() {
        let fields = validate_annotation(&draft(" Valid ", "M+F ", " Headwear")).unwrap();
        assert_eq!(fields.gender, Gender::Both);
        assert_eq!(fields.category, Category::Headwear);
    }

    #[test]
    fn empty_gender_is_missing_field() {
        let err = validate_annotation(&draft("Valid", "", "Top")).unwrap_err();
        assert_matches!(err, CoreError::MissingField(Field::Gender));
        assert_eq!(err.field(), Some(Field::Gender));
    }

    #[test]
    fn absent_fields_are_missing() {
        let mut d = draft("Valid", "M", "Top");
        d.validity = None;
        assert_matches!(
            validate_annotation(&d),
            Err(CoreError::MissingField(Field::Validity))
        );

        let mut d = draft("Valid", "M", "Top");
        d.category = None;
        assert_matches!(
            validate_annotation(&d),
            Err(CoreError::MissingField(Field::Category))
        );
    }

    #[test]
    fn empty_image_id_is_missing() {
        let mut d = draft("Valid", "M", "Top");
        d.image_id = "  ".to_string();
        assert_matches!(
            validate_annotation(&d),
            Err(CoreError::MissingField(Field::ImageId))
        );
    }

    #[test]
    fn unknown_values_are_invalid_enum() {
        assert_matches!(
            validate_annotation(&draft("Maybe", "M", "Top")),
            Err(CoreError::InvalidEnum { field: Field::Validity, .. })
        );
        assert_matches!(
            validate_annotation(&draft("Valid", "M/F", "Top")),
            Err(CoreError::InvalidEnum { field: Field::Gender, .. })
        );
        let err = validate_annotation(&draft("Valid", "M", "Outerwear")).unwrap_err();
        assert!(err.to_string().contains("Outerwear"));
    }

    #[test]
    fn missing_fields_reported_before_invalid_values() {
        assert_matches!(
            validate_annotation(&draft("Maybe", "", "Top")),
            Err(CoreError::MissingField(Field::Gender))
        );
    }

    // -- Annotation ------------------------------------------------------------

    #[test]
    fn export_path_is_derived() {
        let fields = AnnotationFields {
            validity: Validity::Invalid,
            gender: Gender::Female,
            category: Category::Bottom,
        };
        let ann = Annotation::new("x.jpg", "skirt", fields, "");
        assert_eq!(ann.export_path(), "skirt/x.jpg");
        assert_eq!(ann.fields(), fields);
    }

    #[test]
    fn draft_from_fields_validates_back() {
        let fields = AnnotationFields {
            validity: Validity::Valid,
            gender: Gender::Both,
            category: Category::Accessory,
        };
        let d = AnnotationDraft::from_fields("a.png", fields, "bags").with_notes("strap");
        assert_eq!(validate_annotation(&d).unwrap(), fields);
        assert_eq!(d.notes, "strap");
    }
}

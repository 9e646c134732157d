use crate::annotation::Field;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Missing required field: {0}")]
    MissingField(Field),

    #[error("Invalid value '{value}' for field {field}")]
    InvalidEnum { field: Field, value: String },

    #[error("Index {index} is out of range for {len} images")]
    OutOfRange { index: usize, len: usize },

    #[error("CSV schema mismatch: missing columns {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Image source error: {0}")]
    Source(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The field a validation error refers to, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::MissingField(field) | Self::InvalidEnum { field, .. } => Some(*field),
            _ => None,
        }
    }
}

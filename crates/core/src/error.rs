use crate::validation::FieldViolation;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("Validation failed for item at index {index}")]
    BatchValidation {
        index: usize,
        violations: Vec<FieldViolation>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

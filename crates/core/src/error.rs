use crate::generation::GenerationError;

#[derive(Debug, thiserror::Error)]
pub enum ScribeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("consult section has a label without a message: {label}")]
    MalformedConsultSection { label: String },
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
}

pub type ScribeResult<T> = std::result::Result<T, ScribeError>;

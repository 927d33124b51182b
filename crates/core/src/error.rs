use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("homolog not found: {0}")]
    NotFound(String),

    #[error("duplicate homolog id: {0}")]
    DuplicateId(String),

    #[error("arity mismatch: {tags} tags but {values} values")]
    ArityMismatch { tags: usize, values: usize },

    #[error("homolog {id} has no attribute {attribute}")]
    MissingAttribute { id: String, attribute: String },

    #[error("invalid homolog id: {0}")]
    InvalidId(String),

    #[error("invalid id prefix: {0:?} (expected two ASCII uppercase letters)")]
    InvalidPrefix(String),

    #[error("id counter exhausted for prefix {0}")]
    IdSpaceExhausted(String),

    #[error("factory built homolog {actual} when asked for {expected}")]
    FactoryIdMismatch { expected: String, actual: String },
}

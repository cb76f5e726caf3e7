#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Incomplete draft: missing {0}")]
    Incomplete(&'static str),

    #[error("Unknown {field} value: {value}")]
    UnknownValue { field: &'static str, value: String },
}

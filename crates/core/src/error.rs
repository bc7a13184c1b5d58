use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobyError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("unknown source: {0}")]
    UnknownSource(String),
}

impl JobyError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        JobyError::Validation {
            field,
            message: message.into(),
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("unknown codeset type: {code}")]
    UnknownCategory { code: String },
    #[error("unknown code status: {status}")]
    UnknownStatus { status: String },
    #[error("invalid date '{value}' (expected YYYYMMDD)")]
    InvalidDate { value: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;

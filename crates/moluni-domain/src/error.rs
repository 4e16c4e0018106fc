use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown calculation status: {0}")]
    UnknownStatus(String),
    #[error("unknown calculation type: {0}")]
    UnknownCalculationType(String),
    #[error("{0}")]
    ValidationError(String),
}

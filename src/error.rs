use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoarsenError {
    #[error("Strength error: {0}")]
    Strength(String),

    #[error("Splitting error: {0}")]
    Splitting(String),

    #[error("Interpolation error: {0}")]
    Interpolation(String),

    #[error("Restriction error: {0}")]
    Restriction(String),
}

pub type Result<T> = std::result::Result<T, CoarsenError>;

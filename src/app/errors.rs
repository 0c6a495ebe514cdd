use crate::{documents::StoreError, semantic::RetrievalError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<RetrievalError> for AppError {
    fn from(err: RetrievalError) -> Self {
        AppError::Validation(err.to_string())
    }
}

use thiserror::Error;

use crate::api_connection::ApiConnectionError;
use crate::validator::ValidationError;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider call failed: {0}")]
    Failure(#[from] ApiConnectionError),
    #[error("provider response does not match the expected schema: {0}")]
    SchemaViolation(String),
}

/// Failures of the core pipeline. Validation and empty results are
/// user-correctable; provider errors are not shown raw.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("{0}")]
    EmptyResult(String),
}

impl RecipeError {
    pub fn is_user_correctable(&self) -> bool {
        !matches!(self, RecipeError::Provider(_))
    }
}

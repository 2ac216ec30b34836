use thiserror::Error;

/// Errors surfaced by catalog actions.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl CatalogError {
    pub fn movie_not_found(title: &str) -> Self {
        CatalogError::NotFound(format!("Movie '{}' not found.", title))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

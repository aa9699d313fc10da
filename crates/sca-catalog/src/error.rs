use thiserror::Error;

/// Errors raised by rule catalog mutations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("rule with id {id} already exists")]
    DuplicateRule { id: String },

    #[error("rule with id {id} not found")]
    NotFound { id: String },
}

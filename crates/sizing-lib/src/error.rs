//! Error types for the sizing engines

use thiserror::Error;

/// Errors raised by catalog lookups and input validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizingError {
    /// A catalog table has no entry for the requested key.
    /// Indicates an incomplete catalog rather than bad user input.
    #[error("no {table} entry for {key}")]
    NotFound { table: &'static str, key: String },

    /// A catalog entry exists but cannot be sized against
    #[error("unusable {table} catalog entry: {reason}")]
    InvalidCatalog { table: &'static str, reason: String },

    /// The caller supplied input that violates a business rule
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl SizingError {
    pub fn not_found(table: &'static str, key: impl Into<String>) -> Self {
        SizingError::NotFound { table, key: key.into() }
    }

    pub fn invalid_catalog(table: &'static str, reason: impl Into<String>) -> Self {
        SizingError::InvalidCatalog { table, reason: reason.into() }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SizingError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SizingError::InvalidInput { .. })
    }

    /// Lookup and catalog failures point at the deployment, not the caller
    pub fn is_catalog_defect(&self) -> bool {
        matches!(
            self,
            SizingError::NotFound { .. } | SizingError::InvalidCatalog { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SizingError>;

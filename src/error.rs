//! Error types for catalog operations.
//!
//! Two layers, mirroring the split between the record store and the service
//! code that drives it: [`StoreError`] is what a store implementation
//! surfaces (including unique-constraint violations, which callers treat as
//! retryable), and [`CatalogError`] is the service-level taxonomy: validation
//! failures with field-level messages, conflicts, missing rows, and store
//! failures passed through.
//!
//! Malformed list parameters are deliberately NOT an error anywhere in this
//! crate; the query parser degrades them to defaults instead.

use std::fmt;

/// Error surfaced by a [`crate::store::CatalogStore`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or the operation failed wholesale.
    Unavailable(String),
    /// A column-level uniqueness constraint rejected a write.
    ///
    /// The slug allocator's probe is not atomic, so this is the authoritative
    /// signal for a slug race; callers retry with a fresh probe rather than
    /// treating it as fatal.
    UniqueViolation {
        /// The constrained column, e.g. `"slug"` or `"sku"`.
        field: &'static str,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => {
                write!(f, "store unavailable: {msg}")
            }
            StoreError::UniqueViolation { field } => {
                write!(f, "unique constraint violation on {field}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// A single field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Service-level error for catalog operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Input failed validation; one entry per offending field.
    Validation(Vec<FieldError>),
    /// A create/update violated a uniqueness rule (sku, or a lost slug race).
    Conflict {
        field: &'static str,
        message: String,
    },
    /// Lookup by id-or-slug found no row. Carries the entity kind.
    NotFound(&'static str),
    /// The record store failed; surfaced as-is.
    Store(StoreError),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Validation(errors) => {
                write!(f, "validation failed: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            }
            CatalogError::Conflict { field, message } => {
                write!(f, "conflict on {field}: {message}")
            }
            CatalogError::NotFound(kind) => {
                write!(f, "{kind} not found")
            }
            CatalogError::Store(e) => {
                write!(f, "store error: {e}")
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        CatalogError::Store(err)
    }
}

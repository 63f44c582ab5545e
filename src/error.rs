//! Hard failures raised by catalog operations.
//!
//! Anything that leaves the catalog untouched but is still worth telling the
//! caller about is a [`crate::CatalogEvent`] instead.

use thiserror::Error;

use crate::book::BookId;

/// Errors returned by entity constructors, setters and catalog operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// An argument failed validation
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Name of the offending argument
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// A different book already holds this ISBN
    #[error("isbn {isbn} is already associated with book {existing}, cannot register {attempted}")]
    DuplicateIsbn {
        /// The contested ISBN
        isbn: u64,
        /// Title of the book that already holds it
        existing: String,
        /// Title of the book being registered or updated
        attempted: String,
    },

    /// The handle was not issued by this catalog
    #[error("no book registered under {0}")]
    UnknownBook(BookId),

    /// Another user is already registered under this email
    #[error("email {0} is already registered to another user")]
    EmailTaken(String),

    /// A configuration document could not be parsed
    #[error("invalid catalog configuration: {0}")]
    Config(String),
}

impl CatalogError {
    /// Shorthand for a [`CatalogError::Validation`]
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation { field, reason: reason.into() }
    }
}

//! Error types for the structure tree reader.
//!
//! Structure-tree accessors never surface these to callers: malformed input is
//! recovered locally and recorded as a [`Diagnostic`](crate::diagnostics::Diagnostic).
//! Errors are returned by the object model and by document construction.

use crate::object::ObjectRef;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading a document.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// Referenced object not found in the object store
    #[error("Object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// Invalid PDF structure (generic)
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// No page with the given object id exists in the page table
    #[error("Page not found: {0}")]
    PageNotFound(ObjectRef),

    /// The document behind a weak handle has been released
    #[error("Document has been released")]
    DocumentReleased,

    /// Content interpretation failed
    #[error("Content interpretation failed: {0}")]
    Interpretation(String),

    /// Circular reference detected in object graph
    #[error("Circular reference detected: object {0}")]
    CircularReference(ObjectRef),

    /// Recursion depth limit exceeded
    #[error("Recursion depth limit exceeded (max: {0})")]
    RecursionLimitExceeded(u32),

    /// Snapshot serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

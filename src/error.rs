//! Error types for the PDF library.
//!
//! This module defines all error types that can occur during PDF parsing and processing.

/// Result type alias for PDF library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during PDF processing.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)] // "Invalid" prefix is intentional for clarity
pub enum Error {
    /// Invalid PDF header (expected '%PDF-')
    #[error("Invalid PDF header: expected '%PDF-', found '{0}'")]
    InvalidHeader(String),

    /// Unsupported PDF version
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Parse error at specific byte offset
    #[error("Failed to parse object at byte {offset}: {reason}")]
    ParseError {
        /// Byte offset where error occurred
        offset: usize,
        /// Reason for parse failure
        reason: String,
    },

    /// Parse warning (non-fatal)
    #[error("Parse warning at byte {offset}: {message}")]
    ParseWarning {
        /// Byte offset where warning occurred
        offset: usize,
        /// Warning message
        message: String,
    },

    /// No `startxref` offset found and no fallback `xref`/indirect-object marker either.
    #[error("Cross-reference table not found")]
    XrefNotFound,

    /// A cross-reference section was located but its subsection or entry formatting is invalid.
    #[error("Malformed cross-reference table: {0}")]
    XrefMalformed(String),

    /// Invalid cross-reference table (generic; kept for compatibility with early-stage callers)
    #[error("Invalid cross-reference table")]
    InvalidXref,

    /// No trailer dictionary could be located or reconstructed.
    #[error("Trailer dictionary not found")]
    TrailerMissing,

    /// A cross-reference stream failed validation: wrong `/Type`, malformed `/W`, or a predictor
    /// failure while decoding its rows.
    #[error("Invalid cross-reference stream: {0}")]
    InvalidXrefStream(String),

    /// Referenced object not found in cross-reference table
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

    /// Unexpected end of file
    #[error("End of file reached unexpectedly")]
    UnexpectedEof,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error
    #[error("UTF-8 decoding error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    // Additional error types for later phases
    /// Invalid PDF structure (generic)
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Stream decoding error
    #[error("Stream decoding error: {0}")]
    Decode(String),

    /// Unsupported stream filter
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// Document declares `/Encrypt` in its trailer. Decryption is out of scope; this is raised
    /// rather than attempting to read garbage from an encrypted stream.
    #[error("Document is encrypted ({0}); decryption is not supported")]
    Encrypted(String),

    /// A Reader operation was short-circuited by a caller-supplied cancellation token.
    #[error("Reader operation aborted: {0}")]
    ReaderAborted(String),

    /// Circular reference detected in object graph
    #[error("Circular reference detected: object {0}")]
    CircularReference(crate::object::ObjectRef),

    /// Recursion depth limit exceeded
    #[error("Recursion depth limit exceeded (max: {0})")]
    RecursionLimitExceeded(u32),

    /// CCITT run-length or mode code could not be matched and the damaged-rows budget was
    /// exhausted.
    #[error("Damaged CCITT stream at row {row}: {reason}")]
    DamagedStream {
        /// Row at which decoding could not continue
        row: usize,
        /// Description of the failure
        reason: String,
    },
}

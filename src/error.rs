//! Error types for the PDF rebuild library

use std::io;
use thiserror::Error;

/// Main error type for PDF rebuild operations
#[derive(Error, Debug)]
pub enum PDFRebuildError {
    /// The source reader could not load the document
    #[error("Cannot open document: {0}")]
    LoadError(String),

    /// Malformed PDF structure
    #[error("Malformed PDF structure: {0}")]
    MalformedPDF(String),

    /// A single source object could not be read as its declared type
    #[error("Malformed source object: {0}")]
    MalformedObject(String),

    /// Invalid object type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        expected: &'static str,
        found: &'static str,
    },

    /// Document has no catalog
    #[error("Document has no root catalog")]
    MissingRoot,

    /// Unparsable version string
    #[error("Invalid PDF version: {0}")]
    InvalidVersion(String),

    /// Unsupported stream filter chain
    #[error("Unsupported filter chain: {0}")]
    UnsupportedFilter(String),

    /// Cross reference table error
    #[error("Cross reference table error: {0}")]
    XRefError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Integer parsing error
    #[error("Integer parsing error: {0}")]
    ParseIntError(#[from] std::num::ParseIntError),
}

/// Result type for PDF rebuild operations
pub type PDFRebuildResult<T> = Result<T, PDFRebuildError>;

impl PDFRebuildError {
    /// Create a new malformed PDF error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPDF(msg.into())
    }

    /// Create a new malformed object error
    pub fn malformed_object(msg: impl Into<String>) -> Self {
        Self::MalformedObject(msg.into())
    }

    /// Check if error is related to document structure
    pub fn is_structure_error(&self) -> bool {
        matches!(self,
            Self::MalformedPDF(_) |
            Self::MissingRoot |
            Self::XRefError(_) |
            Self::InvalidVersion(_)
        )
    }

    /// Check if error is confined to a single object
    pub fn is_object_error(&self) -> bool {
        matches!(self,
            Self::MalformedObject(_) |
            Self::InvalidObjectType { .. } |
            Self::UnsupportedFilter(_)
        )
    }
}

impl From<lopdf::Error> for PDFRebuildError {
    fn from(err: lopdf::Error) -> Self {
        Self::LoadError(err.to_string())
    }
}

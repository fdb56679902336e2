//! # Document Error Types Module
//!
//! Errors raised while serving the document buttons. Their `Display`
//! output is what the operator sees in the callback alert.

use crate::db::DocumentSide;

/// Failure modes of the document menu and download flows
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The submission id from the button no longer resolves to a row
    SubmissionNotFound(i64),
    /// The requested side has no document URL
    MissingDocumentUrl(DocumentSide),
    /// Remote query failed
    Query(String),
    /// Fetching the remote document failed
    Download(String),
    /// Relaying the file to the chat failed
    Delivery(String),
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::SubmissionNotFound(_) => write!(f, "Submission not found."),
            DocumentError::MissingDocumentUrl(_) => write!(f, "Document URL not found."),
            DocumentError::Query(msg) => write!(f, "Error fetching documents: {msg}"),
            DocumentError::Download(msg) => write!(f, "Error downloading document: {msg}"),
            DocumentError::Delivery(msg) => write!(f, "Error sending document: {msg}"),
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<anyhow::Error> for DocumentError {
    fn from(err: anyhow::Error) -> Self {
        DocumentError::Query(format!("{err:#}"))
    }
}

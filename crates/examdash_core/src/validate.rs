use std::fmt;
use std::path::PathBuf;

use crate::SelectedFile;

/// Largest file the upload form accepts.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const PDF_MIME: &str = "application/pdf";

/// A file the user picked, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NotPdf { mime: String },
    TooLarge { size: u64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotPdf { .. } => write!(f, "Please select a PDF file only."),
            ValidationError::TooLarge { .. } => write!(f, "File size must be less than 10MB."),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks type and size; both checks happen before any network call.
pub fn validate_pdf(candidate: FileCandidate) -> Result<SelectedFile, ValidationError> {
    if !candidate.mime.eq_ignore_ascii_case(PDF_MIME) {
        return Err(ValidationError::NotPdf {
            mime: candidate.mime,
        });
    }
    if candidate.size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size: candidate.size,
        });
    }
    Ok(SelectedFile {
        path: candidate.path,
        name: candidate.name,
        size: candidate.size,
    })
}

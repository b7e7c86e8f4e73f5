//! Error types for the article cleaner.
//!
//! Every per-file failure maps to one of these variants so the batch driver can
//! count it and move on to the next file.

use std::path::PathBuf;

/// Result type alias for cleaner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting, cleaning or writing an article.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The PDF could not be opened or its text could not be extracted
    #[error("Failed to extract text from {path}: {reason}")]
    Extraction {
        /// Input file
        path: PathBuf,
        /// Reason reported by the PDF backend
        reason: String,
    },

    /// Unexpected fault inside the cleaning pipeline
    #[error("Cleaning failed: {0}")]
    Cleaning(String),

    /// Cleaning left too little text to be worth keeping
    #[error("Insufficient content after cleaning: {chars} characters (minimum {min})")]
    InsufficientContent {
        /// Characters left after cleaning
        chars: usize,
        /// Configured minimum
        min: usize,
    },

    /// The output document could not be written
    #[error("Failed to write {path}: {reason}")]
    Write {
        /// Output file
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// An explicitly requested input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The folder given for batch processing does not exist
    #[error("Folder not found: {0}")]
    FolderNotFound(PathBuf),

    /// A rule-set regex failed to compile
    #[error("Invalid pattern in rule '{rule}': {source}")]
    InvalidPattern {
        /// Name of the offending rule
        rule: String,
        /// Compilation error
        #[source]
        source: regex::Error,
    },

    /// Invalid rule-set or command-line configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP packaging error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error() {
        let err = Error::Extraction {
            path: PathBuf::from("paper.pdf"),
            reason: "encrypted".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("paper.pdf"));
        assert!(msg.contains("encrypted"));
    }

    #[test]
    fn test_insufficient_content_error() {
        let err = Error::InsufficientContent { chars: 120, min: 500 };
        let msg = format!("{}", err);
        assert!(msg.contains("120"));
        assert!(msg.contains("500"));
    }

    #[test]
    fn test_invalid_pattern_error() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = Error::InvalidPattern {
            rule: "footer".to_string(),
            source,
        };
        assert!(format!("{}", err).contains("footer"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}

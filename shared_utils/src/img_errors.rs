//! Conversion Error Types
//!
//! One enum covers every per-file failure; the batch driver logs it and moves
//! on. Only a missing root directory ends a run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Input file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid input {}: {reason}", .path.display())]
    InvalidInput { path: PathBuf, reason: String },

    #[error("Metadata value for key '{key}' is not valid JSON: {source}")]
    MetadataParse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Metadata error: {0}")]
    MetadataLayout(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Filesystem error on {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn invalid_input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConvertError::InvalidInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

impl From<image::ImageError> for ConvertError {
    fn from(e: image::ImageError) -> Self {
        ConvertError::Codec(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_contains_path() {
        let err = ConvertError::NotFound(PathBuf::from("/images/missing.png"));
        assert_eq!(
            err.to_string(),
            "Input file /images/missing.png does not exist"
        );
    }

    #[test]
    fn test_metadata_parse_names_key() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = ConvertError::MetadataParse {
            key: "workflow".to_string(),
            source,
        };
        assert!(err.to_string().contains("'workflow'"));
    }

    #[test]
    fn test_filesystem_error_names_path() {
        let err = ConvertError::filesystem(
            "/images/out.webp",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Filesystem error on /images/out.webp: denied");
    }
}

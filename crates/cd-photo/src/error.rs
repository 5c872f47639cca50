//! Photoevaporation errors.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for photoevaporation operations.
pub type PhotoResult<T> = Result<T, PhotoError>;

#[derive(Error, Debug)]
pub enum PhotoError {
    /// The mass-loss grid directory is absent or holds no `.dat` files.
    #[error("No mass-loss grid found at {path}")]
    MissingTable { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Grid points do not cover every axis combination.
    #[error("Incomplete mass-loss grid: {reason}")]
    IncompleteGrid { reason: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PhotoError::Parse {
            path: PathBuf::from("grid/a.dat"),
            line: 12,
            reason: "expected 5 columns".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("a.dat:12"));
        assert!(msg.contains("5 columns"));
    }
}

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Every failure the pipeline can report.
///
/// Each variant maps to a distinct process exit code so scripts driving
/// `magdriver` can tell a malformed file from a missing one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    /// A line that does not match the expected grammar.
    #[error("{}:{line}: {message}", .path.display())]
    Format {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("File not found: '{}'", .path.display())]
    MissingFile { path: PathBuf },

    /// A configuration the pipeline knowingly does not handle.
    #[error("Unsupported configuration: {0}")]
    Unsupported(String),

    #[error("Failed to access '{}': {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// Inputs that parse on their own but disagree with each other.
    #[error("{0}")]
    Invalid(String),
}

impl AppError {
    pub fn format(path: &Path, line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }

    /// Classify an I/O failure on `path`.
    pub fn from_io(path: &Path, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Format { .. } => 2,
            AppError::MissingFile { .. } => 3,
            AppError::Unsupported(_) => 4,
            AppError::Io { .. } => 5,
            AppError::Invalid(_) => 6,
        }
    }
}

/// Read a whole text file, mapping failures onto [`AppError`].
pub fn read_text(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|e| AppError::from_io(path, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_names_file_and_line() {
        let err = AppError::format(Path::new("run/inv.inp"), 4, "bad token");
        assert_eq!(err.to_string(), "run/inv.inp:4: bad token");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_file_is_classified_from_io_kind() {
        let err = read_text(Path::new("/definitely/not/here.msh")).unwrap_err();
        assert!(matches!(err, AppError::MissingFile { .. }));
        assert_eq!(err.exit_code(), 3);
    }
}

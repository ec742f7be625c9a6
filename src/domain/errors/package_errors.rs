use crate::domain::{errors::ValidationError, value_objects::PackageCode};

/// Errors raised by package lifecycle operations and the package store
#[derive(Debug, Clone)]
pub enum PackageError {
    /// Input rejected by a business rule
    Validation(ValidationError),

    /// No package stored under the code
    NotFound { code: PackageCode },

    /// Package already reached its delivered state
    AlreadyDelivered { code: PackageCode },

    /// Stored version differs from the one the caller read
    Conflict {
        code: PackageCode,
        expected_version: u64,
        actual_version: u64,
    },

    /// A package with the same code is already stored
    DuplicateCode { code: PackageCode },

    /// The backing store failed or is unavailable
    Repository { message: String },
}

impl std::fmt::Display for PackageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageError::Validation(e) => write!(f, "Validation failed: {}", e),
            PackageError::NotFound { code } => write!(f, "Package not found: {}", code),
            PackageError::AlreadyDelivered { code } => {
                write!(f, "Package '{}' is already delivered", code)
            }
            PackageError::Conflict {
                code,
                expected_version,
                actual_version,
            } => {
                write!(
                    f,
                    "Concurrent modification of package '{}': expected version {}, found {}",
                    code, expected_version, actual_version
                )
            }
            PackageError::DuplicateCode { code } => {
                write!(f, "Package code already in use: {}", code)
            }
            PackageError::Repository { message } => write!(f, "Repository error: {}", message),
        }
    }
}

impl std::error::Error for PackageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackageError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for PackageError {
    fn from(error: ValidationError) -> Self {
        PackageError::Validation(error)
    }
}

/// Result type for package operations
pub type PackageResult<T> = Result<T, PackageError>;

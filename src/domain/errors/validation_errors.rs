/// Validation errors for package input and domain value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // PackageTitle validation errors
    TitleTooShort { actual: usize, min: usize },

    // Weight validation errors
    InvalidWeight(f64),

    // PackageCode validation errors
    EmptyPackageCode,
    PackageCodeTooLong { actual: usize, max: usize },
    InvalidPackageCodeCharacter(char),

    // PackageUpdate validation errors
    BlankStatus,
}

impl ValidationError {
    /// Name of the input field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::TitleTooShort { .. } => "title",
            ValidationError::InvalidWeight(_) => "weight",
            ValidationError::EmptyPackageCode
            | ValidationError::PackageCodeTooLong { .. }
            | ValidationError::InvalidPackageCodeCharacter(_) => "code",
            ValidationError::BlankStatus => "status",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::TitleTooShort { actual, min } => {
                write!(
                    f,
                    "Title length must be at least {} characters long (got {})",
                    min, actual
                )
            }
            ValidationError::InvalidWeight(weight) => {
                write!(f, "Weight must be a positive number (got {})", weight)
            }
            ValidationError::EmptyPackageCode => write!(f, "Package code cannot be empty"),
            ValidationError::PackageCodeTooLong { actual, max } => {
                write!(
                    f,
                    "Package code too long: {} characters (max: {})",
                    actual, max
                )
            }
            ValidationError::InvalidPackageCodeCharacter(c) => {
                write!(f, "Invalid character in package code: '{}'", c)
            }
            ValidationError::BlankStatus => write!(f, "Update status cannot be blank"),
        }
    }
}

impl std::error::Error for ValidationError {}

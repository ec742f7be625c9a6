use crate::domain::errors::ValidationError;

/// The externally visible identifier of a package
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageCode(String);

impl PackageCode {
    const MAX_LEN: usize = 64;

    /// Parse a code received from a client or read back from storage
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyPackageCode);
        }

        if value.len() > Self::MAX_LEN {
            return Err(ValidationError::PackageCodeTooLong {
                actual: value.len(),
                max: Self::MAX_LEN,
            });
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' {
                return Err(ValidationError::InvalidPackageCodeCharacter(c));
            }
        }

        Ok(Self(value))
    }

    /// Generate a fresh random code
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for PackageCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        PackageCode::new(value.to_string())
    }
}

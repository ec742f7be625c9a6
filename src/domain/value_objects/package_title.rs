use crate::domain::errors::ValidationError;

/// A package title that satisfies the minimum length rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTitle(String);

impl PackageTitle {
    pub const MIN_LEN: usize = 10;

    pub fn new(value: String) -> Result<Self, ValidationError> {
        // Counted in characters so accented titles are not penalised
        let actual = value.chars().count();
        if actual < Self::MIN_LEN {
            return Err(ValidationError::TitleTooShort {
                actual,
                min: Self::MIN_LEN,
            });
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PackageTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

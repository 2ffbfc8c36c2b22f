//! Coaster short-code primitive.
//!
//! Codes are printed on physical coasters and typed by hand, so the alphabet
//! drops glyphs that read ambiguously in print (I, O, 0, 1).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed 32-symbol alphabet for coaster codes.
pub const CODE_ALPHABET: &str = "23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Fixed length of every coaster code.
pub const CODE_LENGTH: usize = 4;

/// Validation errors returned by [`CoasterCode::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeValidationError {
    WrongLength { expected: usize, actual: usize },
    InvalidCharacter { character: char },
}

impl fmt::Display for CodeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLength { expected, actual } => {
                write!(f, "code must be exactly {expected} characters, got {actual}")
            }
            Self::InvalidCharacter { character } => {
                write!(f, "code contains character {character:?} outside the coaster alphabet")
            }
        }
    }
}

impl std::error::Error for CodeValidationError {}

/// Validated coaster code.
///
/// ## Invariants
/// - Exactly [`CODE_LENGTH`] characters, each drawn from [`CODE_ALPHABET`].
/// - Case-sensitive; lowercase input is rejected rather than folded.
///
/// # Examples
/// ```
/// use coaster_backend::domain::CoasterCode;
///
/// let code = CoasterCode::new("A1B2");
/// assert!(code.is_err()); // '1' is not in the alphabet
/// let code = CoasterCode::new("A2B3").expect("valid code");
/// assert_eq!(code.as_str(), "A2B3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CoasterCode(String);

impl CoasterCode {
    /// Validate and construct a [`CoasterCode`].
    pub fn new(code: impl Into<String>) -> Result<Self, CodeValidationError> {
        Self::from_owned(code.into())
    }

    fn from_owned(code: String) -> Result<Self, CodeValidationError> {
        let actual = code.chars().count();
        if actual != CODE_LENGTH {
            return Err(CodeValidationError::WrongLength {
                expected: CODE_LENGTH,
                actual,
            });
        }
        if let Some(character) = code.chars().find(|c| !CODE_ALPHABET.contains(*c)) {
            return Err(CodeValidationError::InvalidCharacter { character });
        }
        Ok(Self(code))
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for CoasterCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CoasterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CoasterCode> for String {
    fn from(value: CoasterCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for CoasterCode {
    type Error = CodeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

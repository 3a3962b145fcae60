//! Contact phone number used in payment prefill.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input contained no digits.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contained characters other than digits, spaces, dashes or a leading +.
    #[error("phone number contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The number has too few or too many digits.
    #[error("phone number must have between {min} and {max} digits (got {got})")]
    Length {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
        /// Digits found.
        got: usize,
    },
}

/// A phone number normalized to an optional leading `+` followed by digits.
///
/// ```
/// use mithadi_core::Phone;
///
/// let phone = Phone::parse("+91 98765-43210").unwrap();
/// assert_eq!(phone.as_str(), "+919876543210");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits (local numbers without country code).
    pub const MIN_DIGITS: usize = 10;
    /// Maximum number of digits (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] if the input is not a plausible phone number.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        let (plus, rest) = s
            .strip_prefix('+')
            .map_or((false, s), |rest| (true, rest));

        let mut normalized = String::with_capacity(s.len());
        if plus {
            normalized.push('+');
        }
        for c in rest.chars() {
            match c {
                '0'..='9' => normalized.push(c),
                ' ' | '-' | '(' | ')' => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        let digits = normalized.len() - usize::from(plus);
        if digits == 0 {
            return Err(PhoneError::Empty);
        }
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(PhoneError::Length {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                got: digits,
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_separators() {
        assert_eq!(
            Phone::parse("(987) 654-3210").map(|p| p.0),
            Ok("9876543210".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_letters() {
        assert_eq!(
            Phone::parse("98765abc10"),
            Err(PhoneError::InvalidCharacter('a'))
        );
    }

    #[test]
    fn test_parse_length_bounds() {
        assert!(matches!(
            Phone::parse("12345"),
            Err(PhoneError::Length { got: 5, .. })
        ));
        assert_eq!(Phone::parse("+"), Err(PhoneError::Empty));
    }
}

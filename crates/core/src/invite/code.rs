//! Invitation code rules.

use rand::Rng;
use thiserror::Error;

/// Length of every invitation code.
pub const CODE_LENGTH: usize = 8;

/// Code alphabet: uppercase alphanumerics minus 0/O and 1/I.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Errors for malformed invitation codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InviteCodeError {
    /// The code is not exactly [`CODE_LENGTH`] characters.
    #[error("invitation code must be exactly {CODE_LENGTH} characters")]
    BadLength,

    /// The code contains a character outside the code alphabet.
    #[error("invitation code contains an invalid character")]
    BadCharacter,
}

impl InviteCodeError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        400
    }

    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        "invalid_code"
    }
}

/// Generates a fresh random invitation code.
///
/// Uniqueness across books is enforced by the caller (a unique database
/// index plus collision retry), not here.
#[must_use]
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}

/// Normalizes user input into canonical code form.
///
/// Trims surrounding whitespace and uppercases, then validates length and
/// alphabet. Lookup is effectively case-insensitive because stored codes
/// are always canonical.
///
/// # Errors
///
/// Returns [`InviteCodeError`] when the input cannot be a valid code.
pub fn normalize_code(input: &str) -> Result<String, InviteCodeError> {
    let code: String = input.trim().to_uppercase();

    if code.chars().count() != CODE_LENGTH {
        return Err(InviteCodeError::BadLength);
    }
    if !code.bytes().all(|b| ALPHABET.contains(&b)) {
        return Err(InviteCodeError::BadCharacter);
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_alphabet_excludes_confusables() {
        for confusable in [b'0', b'O', b'1', b'I'] {
            assert!(!ALPHABET.contains(&confusable));
        }
        assert_eq!(ALPHABET.len(), 32);
    }

    #[test]
    fn test_normalize_uppercases_and_trims() {
        assert_eq!(normalize_code("  abcdefgh "), Ok("ABCDEFGH".to_string()));
        assert_eq!(normalize_code("ab23cd45"), Ok("AB23CD45".to_string()));
    }

    #[test]
    fn test_normalize_rejects_bad_length() {
        assert_eq!(normalize_code("ABC"), Err(InviteCodeError::BadLength));
        assert_eq!(
            normalize_code("ABCDEFGHJ"),
            Err(InviteCodeError::BadLength)
        );
        assert_eq!(normalize_code(""), Err(InviteCodeError::BadLength));
    }

    #[test]
    fn test_normalize_rejects_bad_characters() {
        // O and 1 are excluded from the alphabet.
        assert_eq!(
            normalize_code("ABCDEFGO"),
            Err(InviteCodeError::BadCharacter)
        );
        assert_eq!(
            normalize_code("ABCDEFG1"),
            Err(InviteCodeError::BadCharacter)
        );
        assert_eq!(
            normalize_code("ABC DEFG"),
            Err(InviteCodeError::BadCharacter)
        );
    }

    #[test]
    fn test_codes_are_random() {
        // Two draws colliding by chance is ~1 in 32^8.
        assert_ne!(generate_code(), generate_code());
    }
}

//! Pure game rules: bulls/cows scoring, candidate validation, and lobby codes.

use std::collections::HashMap;

use rand::Rng;
use thiserror::Error;

/// Alphabet used for shareable lobby codes.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Number of characters in a lobby code.
const CODE_LENGTH: usize = 6;

/// Result of scoring a guess against a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    /// Digits matching both value and position.
    pub bulls: usize,
    /// Digits matching value but not position, after bulls are removed.
    pub cows: usize,
}

/// Error returned when a guess and secret of different lengths are scored.
///
/// Callers must validate lengths up front; hitting this is a programming
/// error, not a user input error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("guess and secret must be the same length (guess {guess_len}, secret {secret_len})")]
pub struct LengthMismatch {
    /// Length of the guess that was submitted.
    pub guess_len: usize,
    /// Length of the secret it was scored against.
    pub secret_len: usize,
}

/// Score `guess` against `secret`.
///
/// Bulls are counted in a single positional pass. For the remaining
/// positions, per-digit leftovers are tallied on both sides and cows are the
/// overlap (`min` of the two counts per digit). Repeated digits are handled
/// correctly even though submitted secrets never contain them.
pub fn calculate_bulls_and_cows(guess: &str, secret: &str) -> Result<Score, LengthMismatch> {
    if guess.chars().count() != secret.chars().count() {
        return Err(LengthMismatch {
            guess_len: guess.chars().count(),
            secret_len: secret.chars().count(),
        });
    }

    let mut bulls = 0;
    let mut guess_counts: HashMap<char, usize> = HashMap::new();
    let mut secret_counts: HashMap<char, usize> = HashMap::new();

    for (g, s) in guess.chars().zip(secret.chars()) {
        if g == s {
            bulls += 1;
        } else {
            *guess_counts.entry(g).or_default() += 1;
            *secret_counts.entry(s).or_default() += 1;
        }
    }

    let cows = guess_counts
        .iter()
        .filter_map(|(digit, count)| secret_counts.get(digit).map(|other| count.min(other)))
        .sum();

    Ok(Score { bulls, cows })
}

/// Whether `number` is a valid candidate for the given length: exactly
/// `length` ASCII digits with no digit repeated. Leading zeros are fine.
pub fn is_valid_number(number: &str, length: usize) -> bool {
    if number.len() != length {
        return false;
    }

    if !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let mut seen = [false; 10];
    for b in number.bytes() {
        let digit = (b - b'0') as usize;
        if seen[digit] {
            return false;
        }
        seen[digit] = true;
    }

    true
}

/// Generate a shareable 6-character lobby code drawn uniformly from `[A-Z0-9]`.
///
/// Codes are not globally unique; collision handling is the session store's
/// responsibility.
pub fn generate_lobby_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn exact_match_scores_all_bulls() {
        assert_eq!(
            calculate_bulls_and_cows("1234", "1234").unwrap(),
            Score { bulls: 4, cows: 0 }
        );
    }

    #[test]
    fn full_reversal_scores_all_cows() {
        assert_eq!(
            calculate_bulls_and_cows("1234", "4321").unwrap(),
            Score { bulls: 0, cows: 4 }
        );
    }

    #[test]
    fn mixed_positions_split_bulls_and_cows() {
        assert_eq!(
            calculate_bulls_and_cows("1234", "1342").unwrap(),
            Score { bulls: 1, cows: 3 }
        );
    }

    #[test]
    fn disjoint_digits_score_nothing() {
        assert_eq!(
            calculate_bulls_and_cows("1234", "5678").unwrap(),
            Score { bulls: 0, cows: 0 }
        );
    }

    #[test]
    fn repeated_digits_count_overlap_once_per_pair() {
        // One leftover '1' on each side pairs into a single cow.
        assert_eq!(
            calculate_bulls_and_cows("1123", "2114").unwrap(),
            Score { bulls: 1, cows: 2 }
        );
        assert_eq!(
            calculate_bulls_and_cows("1111", "1000").unwrap(),
            Score { bulls: 1, cows: 0 }
        );
    }

    #[test]
    fn bulls_plus_cows_never_exceed_length() {
        let cases = [("1234", "4321"), ("1122", "2211"), ("0912", "9021")];
        for (guess, secret) in cases {
            let score = calculate_bulls_and_cows(guess, secret).unwrap();
            assert!(score.bulls + score.cows <= guess.len());
        }
    }

    #[test]
    fn mismatched_lengths_are_a_contract_violation() {
        let err = calculate_bulls_and_cows("123", "1234").unwrap_err();
        assert_eq!(
            err,
            LengthMismatch {
                guess_len: 3,
                secret_len: 4
            }
        );
    }

    #[test]
    fn valid_numbers_accepted() {
        assert!(is_valid_number("0123", 4));
        assert!(is_valid_number("987", 3));
        assert!(is_valid_number("012345", 6));
    }

    #[test]
    fn invalid_numbers_rejected() {
        assert!(!is_valid_number("123", 4)); // too short
        assert!(!is_valid_number("12345", 4)); // too long
        assert!(!is_valid_number("12a4", 4)); // non-digit
        assert!(!is_valid_number("1123", 4)); // duplicate
        assert!(!is_valid_number("", 4)); // empty
    }

    #[test]
    fn lobby_codes_match_alphabet_and_length() {
        for _ in 0..100 {
            let code = generate_lobby_code();
            assert_eq!(code.len(), 6);
            assert!(
                code.bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
            );
        }
    }

    #[test]
    fn lobby_codes_rarely_collide() {
        let codes: HashSet<String> = (0..100).map(|_| generate_lobby_code()).collect();
        assert_eq!(codes.len(), 100);
    }
}

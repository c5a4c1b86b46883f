//! Random values for the OAuth `state` parameter.

use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};

/// Length of the anti-CSRF state value sent to the provider
pub const STATE_LENGTH: usize = 32;

/// Generate a random alphanumeric string from the operating system CSPRNG
pub fn generate_token(length: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generate a fresh OAuth state value
pub fn generate_state() -> String {
    generate_token(STATE_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_token_length_and_alphabet() {
        for length in [0, 1, 16, 32, 128] {
            let token = generate_token(length);
            assert_eq!(token.len(), length);
            assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_generate_state_values_are_distinct() {
        let values: HashSet<String> = (0..1000).map(|_| generate_state()).collect();
        assert_eq!(values.len(), 1000);
    }
}

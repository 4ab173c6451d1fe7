//! Random identifiers for collision-avoiding file names.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::Result;

/// Symbols used for generated names. Exactly 64 entries.
pub const ALPHABET: &[u8; 64] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_+";

/// Length of the stem used when renaming uploads.
pub const RENAMED_STEM_LENGTH: usize = 10;

/// Generates random names from [`ALPHABET`] using the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameGenerator;

impl NameGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate `length` symbols drawn uniformly from [`ALPHABET`].
    pub fn generate(&self, length: usize) -> Result<String> {
        generate_with(&mut OsRng, length)
    }
}

/// Generate `length` symbols from [`ALPHABET`] using the given cryptographic RNG.
///
/// One random byte per symbol; the low 6 bits index the alphabet. Since 64 divides
/// 256 every symbol is equally likely.
pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R, length: usize) -> Result<String> {
    let mut bytes = vec![0u8; length];
    rng.try_fill_bytes(&mut bytes)?;

    Ok(bytes
        .into_iter()
        .map(|b| ALPHABET[(b & 0x3f) as usize] as char)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    /// RNG whose entropy source always fails.
    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no entropy",
            )))
        }
    }

    impl CryptoRng for BrokenRng {}

    #[test]
    fn test_alphabet_has_unique_symbols() {
        let unique: HashSet<u8> = ALPHABET.iter().copied().collect();
        assert_eq!(unique.len(), 64);
    }

    #[test]
    fn test_generate_length() {
        let names = NameGenerator::new();
        for length in [0, 1, 10, 64, 257] {
            let s = names.generate(length).unwrap();
            assert_eq!(s.chars().count(), length);
            assert!(s.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_generate_is_not_repeating() {
        let names = NameGenerator::new();
        let samples: HashSet<String> = (0..32).map(|_| names.generate(10).unwrap()).collect();
        // 64^10 possible names; a duplicate among 32 samples is practically impossible.
        assert!(samples.len() >= 31);
    }

    #[test]
    fn test_generate_with_covers_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        let s = generate_with(&mut rng, 20_000).unwrap();
        let seen: HashSet<u8> = s.bytes().collect();
        assert_eq!(seen.len(), 64);
    }

    #[test]
    fn test_entropy_failure() {
        let err = generate_with(&mut BrokenRng, 10).unwrap_err();
        assert!(matches!(err, Error::EntropySourceUnavailable(_)));
    }
}

//! Short code generation and validation.
//!
//! Generated codes are drawn uniformly from `[A-Za-z0-9]`. User-suggested
//! codes must match [`SHORT_CODE_PATTERN`]. Uniqueness is not checked here;
//! the store enforces it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::sync::{LazyLock, Mutex, PoisonError};

/// Format rule for user-suggested short codes.
pub const SHORT_CODE_PATTERN: &str = r"^[0-9a-zA-Z_]{4,}$";

/// Length of generated codes when none is configured.
pub const DEFAULT_CODE_LENGTH: usize = 6;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

static SHORT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SHORT_CODE_PATTERN).expect("short code pattern compiles"));

/// Returns `true` if `candidate` fully matches `pattern`.
pub fn is_valid(candidate: &str, pattern: &Regex) -> bool {
    pattern.is_match(candidate)
}

/// Checks a user-suggested code against [`SHORT_CODE_PATTERN`].
pub fn is_valid_code(candidate: &str) -> bool {
    is_valid(candidate, &SHORT_CODE_REGEX)
}

/// Draws `length` characters independently from the 62-symbol alphabet.
pub fn generate_random_code<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Random code source owned by the service.
///
/// Seed it with [`CodeGenerator::seeded`] to get a reproducible sequence.
#[derive(Debug)]
pub struct CodeGenerator {
    rng: Mutex<StdRng>,
    length: usize,
}

impl CodeGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new(length: usize) -> Self {
        Self::from_rng(StdRng::from_os_rng(), length)
    }

    pub fn seeded(seed: u64, length: usize) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), length)
    }

    fn from_rng(rng: StdRng, length: usize) -> Self {
        Self {
            rng: Mutex::new(rng),
            length,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn generate(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        generate_random_code(&mut *rng, self.length)
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

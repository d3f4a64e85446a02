//! Password generation.
//!
//! Two generation modes share one post-pass:
//! - **random**: every character drawn from the enabled alphabets
//! - **personal words**: user words, leetspeak-substituted and re-cased,
//!   then truncated or padded with digits and symbols
//!
//! Both end with a requirements pass that places a character of every
//! enabled class that is still missing. All randomness comes from the
//! caller's [`RandomSource`].

pub mod strength;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::random::{RandomSource, Sampling};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum allowed password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum allowed password length.
pub const MAX_PASSWORD_LENGTH: usize = 64;

/// Default password length.
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

// Character sets
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Symbols used to pad personal-word passwords.
const PADDING_SYMBOLS: &[u8] = b"!@#$%^&*";

/// Chance, in tenths, that an eligible letter gets its leetspeak form.
const LEET_TENTHS: usize = 4;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Configuration for which character classes a generated password uses.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharsetConfig {
    /// Include uppercase letters (A-Z).
    pub uppercase: bool,
    /// Include lowercase letters (a-z).
    pub lowercase: bool,
    /// Include digits (0-9).
    pub digits: bool,
    /// Include symbols (`!@#$%^&*()_+-=[]{}|;:,.<>?`).
    pub symbols: bool,
}

impl Default for CharsetConfig {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
        }
    }
}

impl CharsetConfig {
    /// The classes actually used: all four when none is enabled.
    #[must_use]
    pub const fn effective(self) -> Self {
        if self.uppercase || self.lowercase || self.digits || self.symbols {
            self
        } else {
            Self {
                uppercase: true,
                lowercase: true,
                digits: true,
                symbols: true,
            }
        }
    }

    fn enabled_classes(self) -> impl Iterator<Item = CharClass> {
        [
            (self.uppercase, CharClass::Upper),
            (self.lowercase, CharClass::Lower),
            (self.digits, CharClass::Digit),
            (self.symbols, CharClass::Symbol),
        ]
        .into_iter()
        .filter_map(|(enabled, class)| enabled.then_some(class))
    }
}

/// Options for [`generate_password`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorOptions {
    /// Length in characters, within
    /// [`MIN_PASSWORD_LENGTH`]..=[`MAX_PASSWORD_LENGTH`].
    pub length: usize,
    /// Enabled character classes.
    pub charsets: CharsetConfig,
    /// Words to build a memorable password from. Blank words are ignored.
    pub personal_words: Vec<String>,
    /// How random bytes map onto alphabet positions.
    pub sampling: Sampling,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_PASSWORD_LENGTH,
            charsets: CharsetConfig::default(),
            personal_words: Vec::new(),
            sampling: Sampling::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Upper,
    Lower,
    Digit,
    Symbol,
}

impl CharClass {
    const fn alphabet(self) -> &'static [u8] {
        match self {
            Self::Upper => UPPERCASE,
            Self::Lower => LOWERCASE,
            Self::Digit => DIGITS,
            Self::Symbol => SYMBOLS,
        }
    }

    fn contains(self, c: char) -> bool {
        match self {
            Self::Upper => c.is_ascii_uppercase(),
            Self::Lower => c.is_ascii_lowercase(),
            Self::Digit => c.is_ascii_digit(),
            Self::Symbol => u8::try_from(c).is_ok_and(|b| SYMBOLS.contains(&b)),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate a password according to `options`.
///
/// With no personal words, each character is drawn from the concatenation
/// of the enabled alphabets. With personal words, the words are joined,
/// about 40% of `a e i o s t` letters become `@ 3 1 0 $ 7`, letters are
/// re-cased, and the result is cut to `length` or padded with
/// `ceil(remaining / 2)` digits followed by symbols (or more digits when
/// symbols are off).
///
/// Every enabled class ends up represented: a missing class overwrites a
/// random position that is not the only character of another enabled
/// class.
///
/// # Errors
///
/// Returns [`CryptoError::PasswordGeneration`] if `length` is outside
/// [`MIN_PASSWORD_LENGTH`]..=[`MAX_PASSWORD_LENGTH`], or
/// [`CryptoError::Random`] if the source fails.
pub fn generate_password(
    options: &GeneratorOptions,
    rng: &dyn RandomSource,
) -> Result<String, CryptoError> {
    let length = options.length;
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(CryptoError::PasswordGeneration(format!(
            "length must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}, got {length}"
        )));
    }

    let charsets = options.charsets.effective();
    let sampling = options.sampling;

    let mut chars = match personal_base(&options.personal_words, length, charsets, sampling, rng)? {
        Some(chars) => chars,
        None => random_chars(length, charsets, sampling, rng)?,
    };

    ensure_requirements(&mut chars, charsets, sampling, rng)?;
    Ok(chars.into_iter().collect())
}

// ---------------------------------------------------------------------------
// Generation steps
// ---------------------------------------------------------------------------

fn random_chars(
    length: usize,
    charsets: CharsetConfig,
    sampling: Sampling,
    rng: &dyn RandomSource,
) -> Result<Vec<char>, CryptoError> {
    let pool: Vec<u8> = charsets
        .enabled_classes()
        .flat_map(|class| class.alphabet().iter().copied())
        .collect();

    (0..length)
        .map(|_| pick(pool.as_slice(), sampling, rng))
        .collect()
}

/// Build the personal-word body, or `None` when every word is blank.
fn personal_base(
    words: &[String],
    length: usize,
    charsets: CharsetConfig,
    sampling: Sampling,
    rng: &dyn RandomSource,
) -> Result<Option<Vec<char>>, CryptoError> {
    let joined: String = words.iter().map(|w| w.trim()).collect();
    if joined.is_empty() {
        return Ok(None);
    }

    let mut substituted = String::with_capacity(joined.len());
    for c in joined.chars() {
        match leet(c) {
            Some(sub) if sampling.index(rng, 10)? < LEET_TENTHS => substituted.push(sub),
            _ => substituted.push(c),
        }
    }

    let mut chars = recase(&substituted, charsets);

    if chars.len() >= length {
        chars.truncate(length);
        return Ok(Some(chars));
    }

    let remaining = length.saturating_sub(chars.len());
    let digit_count = remaining.div_ceil(2);
    for _ in 0..digit_count {
        chars.push(pick(DIGITS, sampling, rng)?);
    }
    let tail = if charsets.symbols { PADDING_SYMBOLS } else { DIGITS };
    for _ in digit_count..remaining {
        chars.push(pick(tail, sampling, rng)?);
    }

    Ok(Some(chars))
}

const fn leet(c: char) -> Option<char> {
    match c {
        'a' | 'A' => Some('@'),
        'e' | 'E' => Some('3'),
        'i' | 'I' => Some('1'),
        'o' | 'O' => Some('0'),
        's' | 'S' => Some('$'),
        't' | 'T' => Some('7'),
        _ => None,
    }
}

/// Mixed case upper-cases positions where `i % 2 == 1 || i % 3 == 0`.
#[allow(clippy::arithmetic_side_effects)]
fn recase(word: &str, charsets: CharsetConfig) -> Vec<char> {
    match (charsets.uppercase, charsets.lowercase) {
        (true, true) => word
            .chars()
            .enumerate()
            .flat_map(|(i, c)| {
                let upper = i % 2 == 1 || i % 3 == 0;
                let mapped: Vec<char> = if upper {
                    c.to_uppercase().collect()
                } else {
                    c.to_lowercase().collect()
                };
                mapped
            })
            .collect(),
        (true, false) => word.chars().flat_map(char::to_uppercase).collect(),
        (false, true) => word.chars().flat_map(char::to_lowercase).collect(),
        (false, false) => word.chars().collect(),
    }
}

/// Place one character of every enabled class that is absent.
///
/// Overwrites only positions whose character is not the sole member of an
/// enabled class, so each insertion keeps earlier classes present.
fn ensure_requirements(
    chars: &mut [char],
    charsets: CharsetConfig,
    sampling: Sampling,
    rng: &dyn RandomSource,
) -> Result<(), CryptoError> {
    let classes: Vec<CharClass> = charsets.enabled_classes().collect();

    for &missing in &classes {
        if chars.iter().any(|&c| missing.contains(c)) {
            continue;
        }

        let candidates: Vec<usize> = (0..chars.len())
            .filter(|&pos| {
                classes.iter().all(|class| {
                    !class.contains(chars[pos])
                        || chars.iter().filter(|&&c| class.contains(c)).count() > 1
                })
            })
            .collect();

        let slot = sampling.index(rng, candidates.len()).map_err(|_| {
            CryptoError::PasswordGeneration(
                "no free position left to satisfy character requirements".into(),
            )
        })?;
        chars[candidates[slot]] = pick(missing.alphabet(), sampling, rng)?;
    }

    Ok(())
}

fn pick(alphabet: &[u8], sampling: Sampling, rng: &dyn RandomSource) -> Result<char, CryptoError> {
    let index = sampling.index(rng, alphabet.len())?;
    Ok(char::from(alphabet[index]))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{OsRandom, SeededRandom};
    use std::collections::HashSet;

    fn options(length: usize, charsets: CharsetConfig) -> GeneratorOptions {
        GeneratorOptions {
            length,
            charsets,
            ..GeneratorOptions::default()
        }
    }

    fn only(upper: bool, lower: bool, digits: bool, symbols: bool) -> CharsetConfig {
        CharsetConfig {
            uppercase: upper,
            lowercase: lower,
            digits,
            symbols,
        }
    }

    fn has_all_classes(pw: &str) -> bool {
        pw.chars().any(|c| c.is_ascii_uppercase())
            && pw.chars().any(|c| c.is_ascii_lowercase())
            && pw.chars().any(|c| c.is_ascii_digit())
            && pw.bytes().any(|b| SYMBOLS.contains(&b))
    }

    // ── Random mode ────────────────────────────────────────────────

    #[test]
    fn default_length_password() {
        let pw = generate_password(&GeneratorOptions::default(), &OsRandom).unwrap();
        assert_eq!(pw.chars().count(), DEFAULT_PASSWORD_LENGTH);
    }

    #[test]
    fn length_bounds_are_inclusive() {
        for length in [MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH] {
            let pw = generate_password(&options(length, CharsetConfig::default()), &OsRandom)
                .unwrap();
            assert_eq!(pw.len(), length);
        }
    }

    #[test]
    fn out_of_range_length_rejected() {
        for length in [0, MIN_PASSWORD_LENGTH - 1, MAX_PASSWORD_LENGTH + 1] {
            let result = generate_password(&options(length, CharsetConfig::default()), &OsRandom);
            let err = result.unwrap_err();
            assert!(matches!(err, CryptoError::PasswordGeneration(_)));
            assert!(err.to_string().contains("length must be between"));
        }
    }

    #[test]
    fn twelve_chars_contain_every_class() {
        for seed in 0..200 {
            let pw = generate_password(
                &options(12, CharsetConfig::default()),
                &SeededRandom::new(seed),
            )
            .unwrap();
            assert_eq!(pw.len(), 12);
            assert!(has_all_classes(&pw), "missing class in: {pw}");
        }
    }

    #[test]
    fn minimum_length_contains_every_class() {
        for seed in 0..200 {
            let mut opts = options(MIN_PASSWORD_LENGTH, CharsetConfig::default());
            opts.sampling = Sampling::Modulo;
            let pw = generate_password(&opts, &SeededRandom::new(seed)).unwrap();
            assert!(has_all_classes(&pw), "missing class in: {pw}");
        }
    }

    #[test]
    fn single_class_stays_in_class() {
        let cases: [(CharsetConfig, fn(char) -> bool); 3] = [
            (only(true, false, false, false), |c| c.is_ascii_uppercase()),
            (only(false, true, false, false), |c| c.is_ascii_lowercase()),
            (only(false, false, true, false), |c| c.is_ascii_digit()),
        ];
        for (charsets, check) in cases {
            let pw = generate_password(&options(20, charsets), &OsRandom).unwrap();
            assert!(pw.chars().all(check), "unexpected character in: {pw}");
        }
    }

    #[test]
    fn symbols_only_uses_symbol_alphabet() {
        let pw = generate_password(&options(20, only(false, false, false, true)), &OsRandom)
            .unwrap();
        assert!(pw.bytes().all(|b| SYMBOLS.contains(&b)), "{pw}");
    }

    #[test]
    fn no_class_enabled_means_all_classes() {
        let none = only(false, false, false, false);
        assert_eq!(none.effective(), CharsetConfig::default());
        let pw = generate_password(&options(16, none), &SeededRandom::new(5)).unwrap();
        assert!(has_all_classes(&pw), "{pw}");
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let opts = GeneratorOptions::default();
        let a = generate_password(&opts, &SeededRandom::new(11)).unwrap();
        let b = generate_password(&opts, &SeededRandom::new(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn uniqueness_random() {
        let passwords: HashSet<String> = (0..100)
            .map(|_| generate_password(&GeneratorOptions::default(), &OsRandom).unwrap())
            .collect();
        assert_eq!(passwords.len(), 100, "generated duplicate passwords");
    }

    // ── Personal words ─────────────────────────────────────────────

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn personal_words_are_padded_to_length() {
        let opts = GeneratorOptions {
            length: 16,
            personal_words: words(&["blue", "river"]),
            ..GeneratorOptions::default()
        };
        for seed in 0..50 {
            let pw = generate_password(&opts, &SeededRandom::new(seed)).unwrap();
            assert_eq!(pw.chars().count(), 16);
            assert!(has_all_classes(&pw), "{pw}");
        }
    }

    #[test]
    fn personal_words_are_truncated_to_length() {
        let opts = GeneratorOptions {
            length: 8,
            personal_words: words(&["extraordinarily", "longwords"]),
            ..GeneratorOptions::default()
        };
        let pw = generate_password(&opts, &SeededRandom::new(2)).unwrap();
        assert_eq!(pw.chars().count(), 8);
    }

    #[test]
    fn personal_word_letters_stay_recognizable() {
        // "bcdfgh" has no leetspeak letters, so only case changes.
        let opts = GeneratorOptions {
            length: 12,
            charsets: only(true, true, true, false),
            personal_words: words(&["  bcdfgh "]),
            ..GeneratorOptions::default()
        };
        let pw = generate_password(&opts, &SeededRandom::new(3)).unwrap();
        assert!(
            pw.to_lowercase().starts_with("bcdfgh"),
            "word not recognizable in: {pw}"
        );
    }

    #[test]
    fn blank_personal_words_fall_back_to_random() {
        let opts = GeneratorOptions {
            length: 20,
            personal_words: words(&["", "   "]),
            ..GeneratorOptions::default()
        };
        let pw = generate_password(&opts, &SeededRandom::new(4)).unwrap();
        assert_eq!(pw.len(), 20);
    }

    #[test]
    fn padding_without_symbols_is_digits() {
        let opts = GeneratorOptions {
            length: 12,
            charsets: only(false, true, true, false),
            personal_words: words(&["bcd"]),
            ..GeneratorOptions::default()
        };
        let pw = generate_password(&opts, &SeededRandom::new(6)).unwrap();
        assert!(pw.starts_with("bcd"), "{pw}");
        assert!(pw[3..].chars().all(|c| c.is_ascii_digit()), "{pw}");
    }

    #[test]
    fn padding_splits_digits_then_symbols() {
        // 3-letter word, length 10: 4 digits then 3 symbols from the padding set.
        let opts = GeneratorOptions {
            length: 10,
            charsets: only(false, true, true, true),
            personal_words: words(&["bcd"]),
            ..GeneratorOptions::default()
        };
        let pw = generate_password(&opts, &SeededRandom::new(8)).unwrap();
        assert_eq!(&pw[..3], "bcd");
        assert!(pw[3..7].chars().all(|c| c.is_ascii_digit()), "{pw}");
        assert!(pw[7..].bytes().all(|b| PADDING_SYMBOLS.contains(&b)), "{pw}");
    }

    // ── Helpers ────────────────────────────────────────────────────

    #[test]
    fn mixed_case_follows_position_rule() {
        let cased: String = recase("bbbbbbb", CharsetConfig::default()).into_iter().collect();
        // Upper at i = 0, 1, 3, 5, 6.
        assert_eq!(cased, "BBbBbBB");
    }

    #[test]
    fn single_case_forces_case() {
        let upper: String = recase("MiXeD", only(true, false, true, true)).into_iter().collect();
        let lower: String = recase("MiXeD", only(false, true, true, true)).into_iter().collect();
        assert_eq!(upper, "MIXED");
        assert_eq!(lower, "mixed");
    }

    #[test]
    fn leet_map_covers_both_cases() {
        for (from, to) in [('a', '@'), ('E', '3'), ('i', '1'), ('O', '0'), ('s', '$'), ('T', '7')] {
            assert_eq!(leet(from), Some(to));
        }
        assert_eq!(leet('b'), None);
    }

    #[test]
    fn requirements_keep_sole_representatives() {
        // One uppercase, one digit, the rest lowercase; symbols missing.
        let chars: Vec<char> = "Aabcdef1".chars().collect();
        for seed in 0..100 {
            let mut attempt = chars.clone();
            ensure_requirements(
                &mut attempt,
                CharsetConfig::default(),
                Sampling::Uniform,
                &SeededRandom::new(seed),
            )
            .unwrap();
            let pw: String = attempt.iter().collect();
            assert!(has_all_classes(&pw), "{pw}");
        }
    }

    #[test]
    fn requirements_overwrite_only_redundant_positions() {
        let chars: Vec<char> = "Aabcdef1".chars().collect();
        let mut overwritten = std::collections::BTreeSet::new();
        for seed in 0..2_000 {
            let mut attempt = chars.clone();
            ensure_requirements(
                &mut attempt,
                CharsetConfig::default(),
                Sampling::Uniform,
                &SeededRandom::new(seed),
            )
            .unwrap();
            for (pos, (before, after)) in chars.iter().zip(&attempt).enumerate() {
                if before != after {
                    overwritten.insert(pos);
                }
            }
        }
        // 'A' and '1' are the only members of their classes.
        assert_eq!(overwritten.into_iter().collect::<Vec<_>>(), [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn requirements_leave_complete_passwords_alone() {
        let mut chars: Vec<char> = "Ab1!cdef".chars().collect();
        ensure_requirements(
            &mut chars,
            CharsetConfig::default(),
            Sampling::Uniform,
            &SeededRandom::new(7),
        )
        .unwrap();
        assert_eq!(chars.iter().collect::<String>(), "Ab1!cdef");
    }
}

//! Password strength scoring.
//!
//! [`assess_strength`] is a pure function of the password string. It builds
//! a 0–10 point total from length, character variety, pattern penalties,
//! and an entropy adjustment, then maps the total onto five levels.

use serde::Serialize;

/// Score at or above which a password counts as strong.
pub const STRONG_SCORE: u8 = 3;

/// Ceiling for the running point total.
const MAX_POINTS: i32 = 10;

const COMMON_PATTERNS: &[&str] = &[
    "password", "12345", "qwerty", "abc123", "admin", "letmein", "welcome", "monkey", "dragon",
    "master",
];

const SEQUENCES: &[&str] = &[
    "abcdefghijklmnopqrstuvwxyz",
    "0123456789",
    "qwertyuiop",
    "asdfghjkl",
    "zxcvbnm",
];

/// Symbols counted toward character variety.
const VARIETY_SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?/\\";

// Feedback messages
const FEEDBACK_EMPTY: &str = "Enter a password";
const FEEDBACK_LENGTH: &str = "Use at least 8 characters";
const FEEDBACK_VARIETY: &str = "Use a mix of character types";
const FEEDBACK_COMMON: &str = "Avoid common patterns";
const FEEDBACK_REPEATED: &str = "Avoid repeated characters";
const FEEDBACK_SEQUENTIAL: &str = "Avoid sequential characters";
const FEEDBACK_GREAT: &str = "Great password!";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Five-level strength scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StrengthLevel {
    TooWeak,
    Weak,
    Fair,
    Strong,
    VeryStrong,
}

impl StrengthLevel {
    /// Numeric score, 0 through 4.
    #[must_use]
    pub const fn score(self) -> u8 {
        match self {
            Self::TooWeak => 0,
            Self::Weak => 1,
            Self::Fair => 2,
            Self::Strong => 3,
            Self::VeryStrong => 4,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TooWeak => "Too weak",
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very strong",
        }
    }

    /// Meter fill percentage.
    #[must_use]
    pub const fn percentage(self) -> u8 {
        match self {
            Self::TooWeak => 0,
            Self::Weak => 25,
            Self::Fair => 50,
            Self::Strong => 75,
            Self::VeryStrong => 100,
        }
    }

    const fn from_points(points: i32) -> Self {
        match points {
            i32::MIN..=2 => Self::TooWeak,
            3..=4 => Self::Weak,
            5..=6 => Self::Fair,
            7..=8 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }
}

/// Result of [`assess_strength`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthAssessment {
    /// 0 (too weak) through 4 (very strong).
    pub score: u8,
    /// Label for `score`.
    pub label: &'static str,
    /// 0, 25, 50, 75, or 100.
    pub percentage: u8,
    /// Estimated entropy in bits, rounded.
    pub entropy: u32,
    /// Suggestions, or a single "Great password!".
    pub feedback: Vec<&'static str>,
}

impl StrengthAssessment {
    fn from_level(level: StrengthLevel, entropy: u32, feedback: Vec<&'static str>) -> Self {
        Self {
            score: level.score(),
            label: level.label(),
            percentage: level.percentage(),
            entropy,
            feedback,
        }
    }

    /// Whether the score reaches [`STRONG_SCORE`].
    #[must_use]
    pub const fn is_strong(&self) -> bool {
        self.score >= STRONG_SCORE
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score a password.
///
/// 1. Length (in characters): <8 → 0, <12 → 1, <16 → 2, <20 → 3, else 4.
/// 2. Variety over lower/upper/digit/symbol: <2 → 0, 2 → 1, 3 → 2, 4 → 3.
/// 3. Penalties, each floored at 0: common pattern −2, three identical
///    characters in a row −1, three-character run from an alphabet, digit,
///    or keyboard-row sequence (either direction) −1.
/// 4. Entropy: <28 bits −1 (floored), ≥60 +2, ≥50 +1, capped at 10.
/// 5. Total ≤2 → 0, ≤4 → 1, ≤6 → 2, ≤8 → 3, else 4.
#[must_use]
pub fn assess_strength(password: &str) -> StrengthAssessment {
    if password.is_empty() {
        return StrengthAssessment::from_level(StrengthLevel::TooWeak, 0, vec![FEEDBACK_EMPTY]);
    }

    let mut feedback = Vec::new();
    let length = password.chars().count();

    let mut points: i32 = match length {
        0..=7 => {
            feedback.push(FEEDBACK_LENGTH);
            0
        }
        8..=11 => 1,
        12..=15 => 2,
        16..=19 => 3,
        _ => 4,
    };

    let variety = [
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| VARIETY_SYMBOLS.contains(c)),
    ]
    .into_iter()
    .filter(|present| *present)
    .count();

    points = points.saturating_add(match variety {
        0 | 1 => {
            feedback.push(FEEDBACK_VARIETY);
            0
        }
        2 => 1,
        3 => 2,
        _ => 3,
    });

    if has_common_pattern(password) {
        points = points.saturating_sub(2).max(0);
        feedback.push(FEEDBACK_COMMON);
    }
    if has_repeated_run(password) {
        points = points.saturating_sub(1).max(0);
        feedback.push(FEEDBACK_REPEATED);
    }
    if has_sequential_run(password) {
        points = points.saturating_sub(1).max(0);
        feedback.push(FEEDBACK_SEQUENTIAL);
    }

    let entropy = entropy_bits(password);
    if entropy < 28.0 {
        points = points.saturating_sub(1).max(0);
    } else if entropy >= 60.0 {
        points = points.saturating_add(2).min(MAX_POINTS);
    } else if entropy >= 50.0 {
        points = points.saturating_add(1).min(MAX_POINTS);
    }

    if feedback.is_empty() {
        feedback.push(FEEDBACK_GREAT);
    }

    StrengthAssessment::from_level(
        StrengthLevel::from_points(points),
        round_bits(entropy),
        feedback,
    )
}

/// `length × log2(charset)`, where the charset adds 26 for lowercase, 26 for
/// uppercase, 10 for digits, and 32 for any other character.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn entropy_bits(password: &str) -> f64 {
    let mut charset: u32 = 0;
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        charset = charset.saturating_add(26);
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        charset = charset.saturating_add(26);
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        charset = charset.saturating_add(10);
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        charset = charset.saturating_add(32);
    }
    if charset == 0 {
        return 0.0;
    }

    password.chars().count() as f64 * f64::from(charset).log2()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_bits(bits: f64) -> u32 {
    bits.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

fn has_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();
    COMMON_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

fn has_repeated_run(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars
        .windows(3)
        .any(|w| w[0] == w[1] && w[1] == w[2])
}

fn has_sequential_run(password: &str) -> bool {
    let lower = password.to_lowercase();
    SEQUENCES.iter().any(|seq| {
        seq.as_bytes().windows(3).any(|run| {
            let forward = [run[0], run[1], run[2]];
            let reverse = [run[2], run[1], run[0]];
            [forward, reverse].iter().any(|pattern| {
                std::str::from_utf8(pattern).is_ok_and(|p| lower.contains(p))
            })
        })
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

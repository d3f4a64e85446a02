//! Vault security audit: weak, reused, old, and breached passwords.
//!
//! - [`SecurityAuditor::perform_audit`] is synchronous and offline.
//! - [`SecurityAuditor::batch_check_breaches`] is opt-in, strictly serial,
//!   rate limited, and cancellable. Its result is merged into a report with
//!   [`AuditReport::apply_breaches`].
//!
//! Reports carry entry ids, names, and usernames only. Passwords never
//! appear in a report.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vaultguard_crypto_core::{assess_strength, StrengthAssessment};

use crate::clock::Clock;
use crate::config::VaultConfig;
use crate::entries::VaultEntry;
use crate::intelligence::PasswordIntelligence;
use crate::rate_limit::RateLimiter;

// ---------------------------------------------------------------------------
// Scoring constants
// ---------------------------------------------------------------------------

const WEAK_WEIGHT: f64 = 30.0;
const REUSED_WEIGHT: f64 = 25.0;
const OLD_WEIGHT: f64 = 20.0;
const BREACHED_WEIGHT: f64 = 25.0;

/// Strength scores below this are reported as weak.
const WEAK_BELOW: u8 = vaultguard_crypto_core::STRONG_SCORE;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Letter summary of an audit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            90.. => Self::A,
            80..=89 => Self::B,
            70..=79 => Self::C,
            60..=69 => Self::D,
            _ => Self::F,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakItem {
    pub id: String,
    pub name: String,
    pub username: String,
    pub strength: StrengthAssessment,
    pub issue: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReusedItem {
    pub id: String,
    pub name: String,
    pub username: String,
    /// Size of the group this entry's password is shared within.
    pub reused_count: usize,
    pub issue: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OldItem {
    pub id: String,
    pub name: String,
    pub username: String,
    pub days_since_update: i64,
    pub last_updated: DateTime<Utc>,
    pub issue: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreachedItem {
    pub id: String,
    pub name: String,
    pub username: String,
    pub breach_count: u64,
    pub issue: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecommendationKind {
    Weak,
    Reused,
    Breached,
    Old,
    Success,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub message: String,
    pub action: String,
}

/// Vault-wide audit result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// 0 through 100.
    pub score: u8,
    pub grade: Grade,
    pub total_passwords: usize,
    pub weak_passwords: Vec<WeakItem>,
    pub reused_passwords: Vec<ReusedItem>,
    pub old_passwords: Vec<OldItem>,
    pub breached_passwords: Vec<BreachedItem>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip)]
    old_threshold_days: u32,
}

impl AuditReport {
    #[must_use]
    pub fn weak_count(&self) -> usize {
        self.weak_passwords.len()
    }

    #[must_use]
    pub fn reused_count(&self) -> usize {
        self.reused_passwords.len()
    }

    #[must_use]
    pub fn old_count(&self) -> usize {
        self.old_passwords.len()
    }

    #[must_use]
    pub fn breached_count(&self) -> usize {
        self.breached_passwords.len()
    }

    /// Merge batch breach results, then rescore.
    pub fn apply_breaches(&mut self, breached: Vec<BreachedItem>) {
        self.breached_passwords = breached;
        self.rescore();
    }

    fn rescore(&mut self) {
        if self.total_passwords == 0 {
            self.score = 100;
            self.grade = Grade::A;
            self.recommendations = vec![Recommendation {
                kind: RecommendationKind::Info,
                priority: Priority::Info,
                message: "No passwords to audit yet".into(),
                action: "Start adding passwords to your vault".into(),
            }];
            return;
        }
        self.score = security_score(
            self.total_passwords,
            [
                (self.weak_count(), WEAK_WEIGHT),
                (self.reused_count(), REUSED_WEIGHT),
                (self.old_count(), OLD_WEIGHT),
                (self.breached_count(), BREACHED_WEIGHT),
            ],
        );
        self.grade = Grade::from_score(self.score);
        self.recommendations = self.build_recommendations();
    }

    fn build_recommendations(&self) -> Vec<Recommendation> {
        let mut out = Vec::new();
        if self.weak_count() > 0 {
            out.push(Recommendation {
                kind: RecommendationKind::Weak,
                priority: Priority::High,
                message: format!("{} weak password(s) detected", self.weak_count()),
                action: "Generate stronger passwords with at least 12 characters and mixed character types".into(),
            });
        }
        if self.reused_count() > 0 {
            out.push(Recommendation {
                kind: RecommendationKind::Reused,
                priority: Priority::High,
                message: format!("{} reused password(s) detected", self.reused_count()),
                action: "Use unique passwords for each account to prevent credential stuffing attacks".into(),
            });
        }
        if self.breached_count() > 0 {
            out.push(Recommendation {
                kind: RecommendationKind::Breached,
                priority: Priority::Critical,
                message: format!("{} breached password(s) detected", self.breached_count()),
                action: "Change these passwords immediately - they have appeared in known data breaches".into(),
            });
        }
        if self.old_count() > 0 {
            out.push(Recommendation {
                kind: RecommendationKind::Old,
                priority: Priority::Medium,
                message: format!("{} old password(s) detected", self.old_count()),
                action: format!(
                    "Consider updating passwords that haven't been changed in over {} days",
                    self.old_threshold_days
                ),
            });
        }
        if out.is_empty() {
            out.push(Recommendation {
                kind: RecommendationKind::Success,
                priority: Priority::Info,
                message: "Your password security looks great!".into(),
                action: "Keep monitoring and updating passwords regularly".into(),
            });
        }
        out
    }
}

/// `100 - sum(count / total * weight)`, floored at 0 and rounded.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn security_score(total: usize, issues: [(usize, f64); 4]) -> u8 {
    if total == 0 {
        return 100;
    }
    let total = total as f64;
    let penalty: f64 = issues
        .iter()
        .map(|&(count, weight)| count as f64 / total * weight)
        .sum();
    (100.0 - penalty).max(0.0).round() as u8
}

// ---------------------------------------------------------------------------
// Offline audit
// ---------------------------------------------------------------------------

/// Audit `entries` as of `now`. Pure: no I/O, no breach data.
#[must_use]
pub fn audit(entries: &[VaultEntry], now: DateTime<Utc>, old_threshold_days: u32) -> AuditReport {
    let mut report = AuditReport {
        score: 100,
        grade: Grade::A,
        total_passwords: entries.len(),
        weak_passwords: weak_items(entries),
        reused_passwords: reused_items(entries),
        old_passwords: old_items(entries, now, old_threshold_days),
        breached_passwords: Vec::new(),
        recommendations: Vec::new(),
        old_threshold_days,
    };
    report.rescore();
    report
}

fn weak_items(entries: &[VaultEntry]) -> Vec<WeakItem> {
    entries
        .iter()
        .filter_map(|entry| {
            let strength = assess_strength(&entry.password);
            (strength.score < WEAK_BELOW).then(|| WeakItem {
                id: entry.id.clone(),
                name: entry.name.clone(),
                username: entry.username.clone(),
                strength,
                issue: "Weak password".into(),
            })
        })
        .collect()
}

/// Group identical passwords by BLAKE3 digest. Groups come out in order of
/// first appearance, members in entry order.
fn reused_items(entries: &[VaultEntry]) -> Vec<ReusedItem> {
    let mut index: HashMap<[u8; 32], usize> = HashMap::new();
    let mut groups: Vec<Vec<&VaultEntry>> = Vec::new();

    for entry in entries {
        let digest: [u8; 32] = blake3::hash(entry.password.as_bytes()).into();
        let slot = *index.entry(digest).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len().saturating_sub(1)
        });
        if let Some(group) = groups.get_mut(slot) {
            group.push(entry);
        }
    }

    groups
        .into_iter()
        .filter(|group| group.len() >= 2)
        .flat_map(|group| {
            let size = group.len();
            group.into_iter().map(move |entry| ReusedItem {
                id: entry.id.clone(),
                name: entry.name.clone(),
                username: entry.username.clone(),
                reused_count: size,
                issue: format!("Reused in {size} accounts"),
            })
        })
        .collect()
}

/// Entries unchanged for more than `threshold` whole days.
fn old_items(entries: &[VaultEntry], now: DateTime<Utc>, threshold: u32) -> Vec<OldItem> {
    entries
        .iter()
        .filter_map(|entry| {
            let days = now
                .signed_duration_since(entry.last_updated_at)
                .num_days();
            (days > i64::from(threshold)).then(|| OldItem {
                id: entry.id.clone(),
                name: entry.name.clone(),
                username: entry.username.clone(),
                days_since_update: days,
                last_updated: entry.last_updated_at,
                issue: format!("Not changed in {days} days"),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Dashboard summary of a vault.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultStatistics {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
    /// Mean strength score, 0.0 through 4.0.
    pub average_strength: f64,
    pub strong_count: usize,
    pub strong_percentage: u8,
}

/// Counts by category and strength.
#[must_use]
#[allow(
    clippy::arithmetic_side_effects,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn statistics(entries: &[VaultEntry]) -> VaultStatistics {
    let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
    let mut strength_total: u64 = 0;
    let mut strong_count = 0usize;

    for entry in entries {
        *by_category.entry(entry.category.clone()).or_default() += 1;
        let strength = assess_strength(&entry.password);
        strength_total += u64::from(strength.score);
        if strength.is_strong() {
            strong_count += 1;
        }
    }

    let total = entries.len();
    let (average_strength, strong_percentage) = if total == 0 {
        (0.0, 0)
    } else {
        (
            strength_total as f64 / total as f64,
            (strong_count as f64 / total as f64 * 100.0).round() as u8,
        )
    };

    VaultStatistics {
        total,
        by_category,
        average_strength,
        strong_count,
        strong_percentage,
    }
}

// ---------------------------------------------------------------------------
// Auditor service
// ---------------------------------------------------------------------------

/// Outcome of [`SecurityAuditor::batch_check_breaches`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreachBatchReport {
    pub breached: Vec<BreachedItem>,
    /// Ids of entries whose lookup failed.
    pub unknown: Vec<String>,
    /// Entries with a definite answer.
    pub checked: usize,
    /// Whether the batch stopped early on cancellation.
    pub cancelled: bool,
}

/// Audit service bound to a clock, a breach lookup, and a rate limiter.
pub struct SecurityAuditor {
    intelligence: PasswordIntelligence,
    clock: Arc<dyn Clock>,
    old_password_days: u32,
    limiter: RateLimiter,
}

impl std::fmt::Debug for SecurityAuditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityAuditor")
            .field("old_password_days", &self.old_password_days)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl SecurityAuditor {
    #[must_use]
    pub fn new(intelligence: PasswordIntelligence, clock: Arc<dyn Clock>, config: &VaultConfig) -> Self {
        Self {
            intelligence,
            clock,
            old_password_days: config.old_password_days,
            limiter: RateLimiter::new(config.breach_interval()),
        }
    }

    /// Offline audit as of the auditor's clock.
    #[must_use]
    pub fn perform_audit(&self, entries: &[VaultEntry]) -> AuditReport {
        audit(entries, self.clock.now(), self.old_password_days)
    }

    #[must_use]
    pub fn statistics(&self, entries: &[VaultEntry]) -> VaultStatistics {
        statistics(entries)
    }

    /// Check every entry against the breach corpus, one lookup at a time.
    ///
    /// Lookups are spaced by the configured interval. A failed lookup is
    /// logged and recorded in `unknown`. Identical passwords are looked up
    /// once. When `cancel` fires the batch stops and returns what it has.
    #[allow(clippy::arithmetic_side_effects)]
    pub async fn batch_check_breaches(
        &self,
        entries: &[VaultEntry],
        cancel: &CancellationToken,
    ) -> BreachBatchReport {
        let mut report = BreachBatchReport::default();
        let mut seen: HashMap<[u8; 32], u64> = HashMap::new();

        for entry in entries {
            let digest: [u8; 32] = blake3::hash(entry.password.as_bytes()).into();

            let count = if let Some(&count) = seen.get(&digest) {
                count
            } else {
                if !self.limiter.acquire(cancel).await {
                    report.cancelled = true;
                    break;
                }
                let lookup = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        report.cancelled = true;
                        break;
                    }
                    result = self.intelligence.breach_count(&entry.password) => result,
                };
                match lookup {
                    Ok(count) => {
                        seen.insert(digest, count);
                        count
                    }
                    Err(e) => {
                        warn!(entry_id = %entry.id, error = %e, "breach lookup failed, skipping");
                        report.unknown.push(entry.id.clone());
                        continue;
                    }
                }
            };

            report.checked = report.checked.saturating_add(1);
            if count > 0 {
                report.breached.push(BreachedItem {
                    id: entry.id.clone(),
                    name: entry.name.clone(),
                    username: entry.username.clone(),
                    breach_count: count,
                    issue: format!("Found in {} breaches", group_thousands(count)),
                });
            }
        }

        if report.cancelled {
            info!(checked = report.checked, "breach batch cancelled");
        }
        report
    }
}

/// `3861493` → `"3,861,493"`.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len().saturating_add(digits.len() / 3));
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len().saturating_sub(i)) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

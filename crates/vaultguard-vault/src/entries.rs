//! Vault entries and the plaintext vault contents.
//!
//! Everything here lives only in memory while the vault is unlocked. The
//! whole [`VaultContents`] is serialized, encrypted, and stored as a single
//! [`crate::record::EncryptedVaultRecord`].

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Category given to entries created without one.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Category name that matches every entry in [`filter_by_category`].
pub const ALL_CATEGORIES: &str = "All";

/// Vault contents format version.
pub const CONTENTS_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A stored credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEntry {
    /// Immutable identifier (UUID v4).
    pub id: String,
    pub name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    /// Moves only when the password changes.
    pub last_updated_at: DateTime<Utc>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.into()
}

impl VaultEntry {
    /// Build an entry from user input, filling in defaults.
    #[must_use]
    pub fn create(id: String, new: NewEntry, now: DateTime<Utc>) -> Self {
        let NewEntry {
            name,
            username,
            password,
            url,
            category,
            notes,
        } = new;
        Self {
            id,
            name,
            username,
            password,
            url: url.unwrap_or_default(),
            category: category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(default_category),
            notes: notes.unwrap_or_default(),
            created_at: now,
            last_updated_at: now,
        }
    }

    /// Merge `update` into this entry. `last_updated_at` moves to `now` only
    /// when the password is replaced by a different value.
    pub fn apply(&mut self, update: EntryUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(mut password) = update.password {
            if password != self.password {
                self.password.zeroize();
                self.password = std::mem::take(&mut password);
                self.last_updated_at = now;
            }
            password.zeroize();
        }
        if let Some(url) = update.url {
            self.url = url;
        }
        if let Some(category) = update.category {
            self.category = if category.is_empty() {
                default_category()
            } else {
                category
            };
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
    }

    /// Case-insensitive substring match over name, username, url, and notes.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [&self.name, &self.username, &self.url, &self.notes]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

impl std::fmt::Debug for VaultEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("password", &"***")
            .finish_non_exhaustive()
    }
}

impl Drop for VaultEntry {
    fn drop(&mut self) {
        self.password.zeroize();
        self.notes.zeroize();
    }
}

/// Input for [`crate::lifecycle::VaultStore::add_entry`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub name: String,
    pub username: String,
    pub password: String,
    pub url: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Partial update for [`crate::lifecycle::VaultStore::update_entry`].
/// `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Contents
// ---------------------------------------------------------------------------

/// Vault-level metadata, encrypted together with the entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMetadata {
    pub version: String,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every save.
    pub last_updated_at: DateTime<Utc>,
    /// Passphrase hint chosen at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl VaultMetadata {
    #[must_use]
    pub fn new(now: DateTime<Utc>, hint: Option<String>) -> Self {
        Self {
            version: CONTENTS_VERSION.into(),
            created_at: now,
            last_updated_at: now,
            hint: hint.filter(|h| !h.is_empty()),
        }
    }
}

/// The plaintext that gets encrypted on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultContents {
    pub entries: Vec<VaultEntry>,
    pub metadata: VaultMetadata,
}

impl VaultContents {
    /// An empty vault.
    #[must_use]
    pub fn empty(now: DateTime<Utc>, hint: Option<String>) -> Self {
        Self {
            entries: Vec::new(),
            metadata: VaultMetadata::new(now, hint),
        }
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&VaultEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut VaultEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Remove the entry with `id`. Returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }
}

// ---------------------------------------------------------------------------
// Search / filter / sort
// ---------------------------------------------------------------------------

/// Entries matching `query` (see [`VaultEntry::matches`]), in stored order.
#[must_use]
pub fn search(entries: &[VaultEntry], query: &str) -> Vec<VaultEntry> {
    entries.iter().filter(|e| e.matches(query)).cloned().collect()
}

/// Entries in `category`. `None` or [`ALL_CATEGORIES`] returns everything.
#[must_use]
pub fn filter_by_category(entries: &[VaultEntry], category: Option<&str>) -> Vec<VaultEntry> {
    match category {
        None | Some(ALL_CATEGORIES) => entries.to_vec(),
        Some(category) => entries
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect(),
    }
}

/// Field to order entries by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Username,
    Url,
    Category,
    CreatedAt,
    LastUpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Stable sort. Text fields compare case-insensitively.
#[must_use]
pub fn sort(entries: &[VaultEntry], field: SortField, order: SortOrder) -> Vec<VaultEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare(a, b, field);
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
    sorted
}

fn compare(a: &VaultEntry, b: &VaultEntry, field: SortField) -> Ordering {
    let text = |x: &str, y: &str| x.to_lowercase().cmp(&y.to_lowercase());
    match field {
        SortField::Name => text(&a.name, &b.name),
        SortField::Username => text(&a.username, &b.username),
        SortField::Url => text(&a.url, &b.url),
        SortField::Category => text(&a.category, &b.category),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::LastUpdatedAt => a.last_updated_at.cmp(&b.last_updated_at),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn entry(id: &str, name: &str, category: Option<&str>) -> VaultEntry {
        VaultEntry::create(
            id.into(),
            NewEntry {
                name: name.into(),
                username: format!("{name}@example.com"),
                password: "hunter2".into(),
                category: category.map(Into::into),
                ..NewEntry::default()
            },
            t0(),
        )
    }

    #[test]
    fn create_fills_defaults() {
        let e = entry("1", "Mail", None);
        assert_eq!(e.url, "");
        assert_eq!(e.category, "Other");
        assert_eq!(e.notes, "");
        assert_eq!(e.created_at, e.last_updated_at);

        let blank = entry("2", "Bank", Some(""));
        assert_eq!(blank.category, "Other");
    }

    #[test]
    fn same_password_does_not_touch_timestamp() {
        let mut e = entry("1", "Mail", None);
        let later = t0() + Duration::days(3);
        e.apply(
            EntryUpdate {
                password: Some("hunter2".into()),
                notes: Some("rotated?".into()),
                ..EntryUpdate::default()
            },
            later,
        );
        assert_eq!(e.last_updated_at, t0());
        assert_eq!(e.notes, "rotated?");
    }

    #[test]
    fn new_password_moves_timestamp() {
        let mut e = entry("1", "Mail", None);
        let later = t0() + Duration::days(3);
        e.apply(
            EntryUpdate {
                password: Some("correct horse".into()),
                ..EntryUpdate::default()
            },
            later,
        );
        assert_eq!(e.password, "correct horse");
        assert_eq!(e.last_updated_at, later);
        assert_eq!(e.created_at, t0());
    }

    #[test]
    fn non_password_edits_keep_timestamp() {
        let mut e = entry("1", "Mail", None);
        e.apply(
            EntryUpdate {
                name: Some("Webmail".into()),
                url: Some("https://mail.example.com".into()),
                ..EntryUpdate::default()
            },
            t0() + Duration::days(1),
        );
        assert_eq!(e.name, "Webmail");
        assert_eq!(e.last_updated_at, t0());
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut github = entry("1", "GitHub", Some("Work"));
        github.notes = "Personal ACCESS token".into();
        let entries = vec![github, entry("2", "Bank", Some("Finance"))];

        assert_eq!(search(&entries, "github").len(), 1);
        assert_eq!(search(&entries, "access").len(), 1);
        assert_eq!(search(&entries, "EXAMPLE.COM").len(), 2);
        assert!(search(&entries, "nothing").is_empty());
        assert_eq!(search(&entries, "").len(), 2);
    }

    #[test]
    fn filter_all_and_none_return_everything() {
        let entries = vec![entry("1", "A", Some("Work")), entry("2", "B", Some("Social"))];
        assert_eq!(filter_by_category(&entries, None).len(), 2);
        assert_eq!(filter_by_category(&entries, Some("All")).len(), 2);
        let work = filter_by_category(&entries, Some("Work"));
        assert_eq!(work.len(), 1);
        assert_eq!(work[0].id, "1");
        assert!(filter_by_category(&entries, Some("work")).is_empty());
    }

    #[test]
    fn sort_by_name_ignores_case() {
        let entries = vec![
            entry("1", "beta", None),
            entry("2", "Alpha", None),
            entry("3", "gamma", None),
        ];
        let asc: Vec<String> = sort(&entries, SortField::Name, SortOrder::Ascending)
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(asc, ["Alpha", "beta", "gamma"]);

        let desc: Vec<String> = sort(&entries, SortField::Name, SortOrder::Descending)
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(desc, ["gamma", "beta", "Alpha"]);
    }

    #[test]
    fn sort_by_last_updated() {
        let mut old = entry("1", "old", None);
        old.last_updated_at = t0() - Duration::days(10);
        let entries = vec![entry("2", "new", None), old];
        let sorted = sort(&entries, SortField::LastUpdatedAt, SortOrder::Ascending);
        assert_eq!(sorted[0].id, "1");
    }

    #[test]
    fn contents_serialize_camel_case() {
        let mut contents = VaultContents::empty(t0(), Some("pet name".into()));
        contents.entries.push(entry("1", "Mail", None));
        let json = serde_json::to_string(&contents).unwrap();
        assert!(json.contains("\"lastUpdatedAt\""));
        assert!(json.contains("\"hint\":\"pet name\""));
        let back: VaultContents = serde_json::from_str(&json).unwrap();
        assert_eq!(back, contents);
    }

    #[test]
    fn empty_hint_is_dropped() {
        assert!(VaultMetadata::new(t0(), Some(String::new())).hint.is_none());
    }

    #[test]
    fn remove_reports_presence() {
        let mut contents = VaultContents::empty(t0(), None);
        contents.entries.push(entry("1", "Mail", None));
        assert!(contents.remove("1"));
        assert!(!contents.remove("1"));
    }

    #[test]
    fn debug_masks_password() {
        let debug = format!("{:?}", entry("1", "Mail", None));
        assert!(!debug.contains("hunter2"));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type EntryId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryCategory {
    /// Services rendered (consulting, maintenance, etc.)
    Service,
    /// Money going out (salaries, reimbursements, suppliers)
    Payment,
    /// Money coming in
    Receipt,
    /// Anything that doesn't fit the other three
    Other,
}

impl EntryCategory {
    /// All categories, in display order. Aggregations iterate this so their
    /// output is always fully populated over the enumeration.
    pub const ALL: [EntryCategory; 4] = [
        EntryCategory::Service,
        EntryCategory::Payment,
        EntryCategory::Receipt,
        EntryCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryCategory::Service => "service",
            EntryCategory::Payment => "payment",
            EntryCategory::Receipt => "receipt",
            EntryCategory::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "service" => Some(EntryCategory::Service),
            "payment" => Some(EntryCategory::Payment),
            "receipt" => Some(EntryCategory::Receipt),
            "other" => Some(EntryCategory::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settlement state of an entry. Both transitions are legal: a received
/// entry can be reverted to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Received,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Received => "received",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(EntryStatus::Pending),
            "received" => Some(EntryStatus::Received),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single daily ledger record: one financial movement tied to a
/// collaborator and a calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub category: EntryCategory,
    pub description: String,
    /// Amount in cents (never negative)
    pub amount_cents: Cents,
    /// When the movement occurred in the real world
    pub entry_date: DateTime<Utc>,
    pub status: EntryStatus,
    /// Collaborator the movement is tied to (not necessarily the creator)
    pub collaborator_id: String,
    pub collaborator_name: String,
    /// Derived from collaborator_name; must never go stale relative to it
    pub search_tokens: Vec<String>,
    pub notes: Option<String>,
    /// Attachment references. Always empty at creation; uploads append later.
    pub attachments: Vec<String>,
    pub created_by: String,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    /// Create a new entry. Search tokens are derived from the collaborator
    /// name and the attachment list starts empty.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        category: EntryCategory,
        description: String,
        amount_cents: Cents,
        entry_date: DateTime<Utc>,
        status: EntryStatus,
        collaborator_id: String,
        collaborator_name: String,
        created_by: String,
        created_by_name: String,
    ) -> Self {
        assert!(amount_cents >= 0, "Entry amount must not be negative");
        let now = Utc::now();
        let search_tokens = compute_search_tokens(&collaborator_name);
        Self {
            id: Uuid::new_v4(),
            category,
            description,
            amount_cents,
            entry_date,
            status,
            collaborator_id,
            collaborator_name,
            search_tokens,
            notes: None,
            attachments: Vec::new(),
            created_by,
            created_by_name,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Replace the collaborator name and recompute the derived tokens.
    /// This is the only way name changes should flow through, so the
    /// tokens can never drift from the display name.
    pub fn rename_collaborator(&mut self, name: impl Into<String>) {
        self.collaborator_name = name.into();
        self.search_tokens = compute_search_tokens(&self.collaborator_name);
    }

    pub fn is_received(&self) -> bool {
        self.status == EntryStatus::Received
    }
}

/// Derive search tokens from a collaborator name: lower-cased,
/// whitespace-split, empty tokens discarded.
pub fn compute_search_tokens(name: &str) -> Vec<String> {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry(name: &str) -> Entry {
        Entry::new(
            EntryCategory::Payment,
            "March bonus".into(),
            10000,
            Utc::now(),
            EntryStatus::Pending,
            "collab-1".into(),
            name.into(),
            "admin-1".into(),
            "Admin".into(),
        )
    }

    #[test]
    fn test_category_roundtrip() {
        for cat in EntryCategory::ALL {
            let parsed = EntryCategory::from_str(cat.as_str()).unwrap();
            assert_eq!(cat, parsed);
        }
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [EntryStatus::Pending, EntryStatus::Received] {
            let parsed = EntryStatus::from_str(status.as_str()).unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_compute_search_tokens() {
        assert_eq!(compute_search_tokens("Ana Silva"), vec!["ana", "silva"]);
        assert_eq!(
            compute_search_tokens("  Bruno   Costa "),
            vec!["bruno", "costa"]
        );
        assert_eq!(compute_search_tokens(""), Vec::<String>::new());
        assert_eq!(compute_search_tokens("   "), Vec::<String>::new());
    }

    #[test]
    fn test_new_entry_derives_tokens_and_empty_attachments() {
        let entry = sample_entry("Ana Silva");
        assert_eq!(entry.search_tokens, vec!["ana", "silva"]);
        assert!(entry.attachments.is_empty());
        assert_eq!(entry.created_at, entry.updated_at);
    }

    #[test]
    fn test_rename_collaborator_refreshes_tokens() {
        let mut entry = sample_entry("Ana Silva");
        entry.rename_collaborator("Maria Oliveira");

        assert_eq!(entry.collaborator_name, "Maria Oliveira");
        assert_eq!(entry.search_tokens, vec!["maria", "oliveira"]);
        assert!(!entry.search_tokens.contains(&"silva".to_string()));
    }

    #[test]
    #[should_panic(expected = "Entry amount must not be negative")]
    fn test_entry_rejects_negative_amount() {
        Entry::new(
            EntryCategory::Other,
            "bad".into(),
            -1,
            Utc::now(),
            EntryStatus::Pending,
            "c".into(),
            "n".into(),
            "u".into(),
            "U".into(),
        );
    }
}

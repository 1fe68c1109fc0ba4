use chrono::{DateTime, Utc};

use crate::domain::{
    Entry, EntryCategory, EntryId, EntryStatus, LedgerStats, compute_stats, parse_cents,
};
use crate::storage::Repository;

use super::AppError;

/// Filter specification for entry listings. All fields are optional and
/// combine conjunctively; an empty filter matches every entry. Results are
/// always ordered by entry date descending regardless of the filter.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Inclusive lower bound on entry date, at instant granularity.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on entry date; normalized to the end of its
    /// calendar day before comparison. A bound earlier than `date_from`
    /// simply yields an empty result.
    pub date_to: Option<DateTime<Utc>>,
    pub collaborator_id: Option<String>,
    /// Word search against the entry's derived token set, case-insensitive.
    pub collaborator_name: Option<String>,
    pub category: Option<EntryCategory>,
    pub status: Option<EntryStatus>,
}

/// Incoming data for creating an entry. The amount arrives as decimal text
/// (how forms carry it) and is coerced to cents on write. There is no
/// status default here: the boundary that collects the form chooses one.
#[derive(Debug, Clone)]
pub struct EntryForm {
    pub category: EntryCategory,
    pub description: String,
    pub amount: String,
    pub entry_date: DateTime<Utc>,
    pub status: EntryStatus,
    pub collaborator_id: String,
    pub collaborator_name: String,
    pub notes: Option<String>,
}

/// Partial update: only supplied fields are merged into the stored record.
/// Fields left as None are not touched and not revalidated.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub category: Option<EntryCategory>,
    pub description: Option<String>,
    pub amount: Option<String>,
    pub entry_date: Option<DateTime<Utc>>,
    pub status: Option<EntryStatus>,
    pub collaborator_id: Option<String>,
    pub collaborator_name: Option<String>,
    pub notes: Option<String>,
}

/// Application service providing high-level operations for the daily ledger.
/// This is the primary interface for any client (web handlers, TUI, etc.).
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// List entries matching the filter, newest entry date first.
    /// All matches are materialized; there is no pagination.
    pub async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>, AppError> {
        Ok(self
            .repo
            .list_entries_filtered(
                filter.date_from,
                filter.date_to,
                filter.collaborator_id.as_deref(),
                filter.collaborator_name.as_deref(),
                filter.category,
                filter.status,
            )
            .await?)
    }

    /// Get a single entry by id.
    pub async fn get_entry(&self, id: EntryId) -> Result<Entry, AppError> {
        self.repo
            .get_entry(id)
            .await?
            .ok_or_else(|| AppError::EntryNotFound(id.to_string()))
    }

    /// Create a new entry from form data. Coerces the amount to cents,
    /// derives search tokens from the collaborator name, stamps both
    /// timestamps to now and persists with an empty attachment list
    /// (uploads are a separate step that appends afterward).
    pub async fn create_entry(
        &self,
        form: EntryForm,
        creator_id: &str,
        creator_name: &str,
    ) -> Result<Entry, AppError> {
        let amount_cents = parse_cents(&form.amount)
            .map_err(|e| AppError::InvalidAmount(format!("{}: {}", form.amount, e)))?;

        let mut entry = Entry::new(
            form.category,
            form.description,
            amount_cents,
            form.entry_date,
            form.status,
            form.collaborator_id,
            form.collaborator_name,
            creator_id.to_string(),
            creator_name.to_string(),
        );
        if let Some(notes) = form.notes {
            entry = entry.with_notes(notes);
        }

        self.repo.save_entry(&entry).await?;
        Ok(entry)
    }

    /// Merge a partial update into an existing entry. Only supplied fields
    /// change; the modification timestamp always refreshes. A supplied
    /// collaborator name recomputes the search tokens, a supplied amount is
    /// recoerced to cents.
    pub async fn update_entry(&self, id: EntryId, update: EntryUpdate) -> Result<Entry, AppError> {
        let mut entry = self.get_entry(id).await?;

        if let Some(category) = update.category {
            entry.category = category;
        }
        if let Some(description) = update.description {
            entry.description = description;
        }
        if let Some(amount) = update.amount {
            entry.amount_cents = parse_cents(&amount)
                .map_err(|e| AppError::InvalidAmount(format!("{}: {}", amount, e)))?;
        }
        if let Some(entry_date) = update.entry_date {
            entry.entry_date = entry_date;
        }
        if let Some(status) = update.status {
            entry.status = status;
        }
        if let Some(collaborator_id) = update.collaborator_id {
            entry.collaborator_id = collaborator_id;
        }
        if let Some(collaborator_name) = update.collaborator_name {
            entry.rename_collaborator(collaborator_name);
        }
        if let Some(notes) = update.notes {
            entry.notes = Some(notes);
        }
        entry.updated_at = Utc::now();

        if !self.repo.update_entry(&entry).await? {
            return Err(AppError::EntryNotFound(id.to_string()));
        }
        Ok(entry)
    }

    /// Set only an entry's status. Status flips are the most frequent
    /// mutation, so they bypass the general update path and can never
    /// clobber other fields. Setting the same status again only refreshes
    /// the modification timestamp.
    pub async fn update_status(&self, id: EntryId, status: EntryStatus) -> Result<(), AppError> {
        if !self.repo.update_status(id, status).await? {
            return Err(AppError::EntryNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Hard-delete an entry. A second delete of the same id fails with
    /// EntryNotFound; there is no tombstone.
    pub async fn delete_entry(&self, id: EntryId) -> Result<(), AppError> {
        if !self.repo.delete_entry(id).await? {
            return Err(AppError::EntryNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Append one attachment reference to an entry. Attachments start empty
    /// at creation and only ever grow through this path.
    pub async fn add_attachment(
        &self,
        id: EntryId,
        reference: impl Into<String>,
    ) -> Result<Entry, AppError> {
        let mut entry = self.get_entry(id).await?;
        entry.attachments.push(reference.into());
        entry.updated_at = Utc::now();

        if !self.repo.update_entry(&entry).await? {
            return Err(AppError::EntryNotFound(id.to_string()));
        }
        Ok(entry)
    }

    /// Summary statistics over the filtered entry set: totals by status,
    /// totals by category (always populated for every category) and the
    /// entry count. One store query plus a local reduction.
    pub async fn compute_stats(&self, filter: &EntryFilter) -> Result<LedgerStats, AppError> {
        let entries = self.list_entries(filter).await?;
        Ok(compute_stats(&entries))
    }
}

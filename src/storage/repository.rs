use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{Entry, EntryCategory, EntryId, EntryStatus, compute_search_tokens};

use super::MIGRATION_001_INITIAL;

const ENTRY_COLUMNS: &str = "id, category, description, amount_cents, entry_date, status, \
     collaborator_id, collaborator_name, search_tokens, notes, attachments, \
     created_by, created_by_name, created_at, updated_at";

/// Repository for persisting and querying ledger entries.
///
/// Each operation is a single bounded round trip touching at most one record;
/// no transaction ever spans multiple entries. Concurrent writes to the same
/// entry resolve last-write-wins.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Save a new entry to the database.
    pub async fn save_entry(&self, entry: &Entry) -> Result<()> {
        let tokens_json = serde_json::to_string(&entry.search_tokens)?;
        let attachments_json = serde_json::to_string(&entry.attachments)?;

        sqlx::query(
            r#"
            INSERT INTO entries (id, category, description, amount_cents, entry_date, status,
                collaborator_id, collaborator_name, search_tokens, notes, attachments,
                created_by, created_by_name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.category.as_str())
        .bind(&entry.description)
        .bind(entry.amount_cents)
        .bind(instant_str(entry.entry_date))
        .bind(entry.status.as_str())
        .bind(&entry.collaborator_id)
        .bind(&entry.collaborator_name)
        .bind(&tokens_json)
        .bind(&entry.notes)
        .bind(&attachments_json)
        .bind(&entry.created_by)
        .bind(&entry.created_by_name)
        .bind(instant_str(entry.created_at))
        .bind(instant_str(entry.updated_at))
        .execute(&self.pool)
        .await
        .context("Failed to save entry")?;

        Ok(())
    }

    /// Get an entry by ID.
    pub async fn get_entry(&self, id: EntryId) -> Result<Option<Entry>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM entries WHERE id = ?",
            ENTRY_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch entry")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    /// List entries with optional filters, ordered by entry date descending.
    ///
    /// All predicates combine conjunctively. The upper date bound is
    /// normalized to the last instant of its calendar day so that a same-day
    /// entry is included regardless of its time of day. The collaborator
    /// name filter matches when every lower-cased word of the query appears
    /// in the entry's stored token set; the membership test runs in the
    /// store, not over materialized rows. The sort is applied by the store
    /// as well, never client-side.
    pub async fn list_entries_filtered(
        &self,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
        collaborator_id: Option<&str>,
        collaborator_name: Option<&str>,
        category: Option<EntryCategory>,
        status: Option<EntryStatus>,
    ) -> Result<Vec<Entry>> {
        // Build query dynamically based on filters
        let mut query = format!("SELECT {} FROM entries WHERE 1=1", ENTRY_COLUMNS);

        // Collect all string bindings first so they live long enough
        let date_from_str = date_from.map(instant_str);
        let date_to_str = date_to.map(|dt| instant_str(end_of_day(dt)));
        let name_tokens = collaborator_name
            .map(compute_search_tokens)
            .unwrap_or_default();

        if date_from_str.is_some() {
            query.push_str(" AND entry_date >= ?");
        }
        if date_to_str.is_some() {
            query.push_str(" AND entry_date <= ?");
        }
        if collaborator_id.is_some() {
            query.push_str(" AND collaborator_id = ?");
        }
        for _ in &name_tokens {
            query.push_str(
                " AND EXISTS (SELECT 1 FROM json_each(entries.search_tokens) \
                 WHERE json_each.value = ?)",
            );
        }
        if category.is_some() {
            query.push_str(" AND category = ?");
        }
        if status.is_some() {
            query.push_str(" AND status = ?");
        }

        query.push_str(" ORDER BY entry_date DESC");

        // Build the query with bindings, in clause order
        let mut sql_query = sqlx::query(&query);

        if let Some(ref from_str) = date_from_str {
            sql_query = sql_query.bind(from_str);
        }
        if let Some(ref to_str) = date_to_str {
            sql_query = sql_query.bind(to_str);
        }
        if let Some(cid) = collaborator_id {
            sql_query = sql_query.bind(cid);
        }
        for token in &name_tokens {
            sql_query = sql_query.bind(token);
        }
        if let Some(cat) = category {
            sql_query = sql_query.bind(cat.as_str());
        }
        if let Some(st) = status {
            sql_query = sql_query.bind(st.as_str());
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list filtered entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Write back a full entry record. Returns false if no record with the
    /// entry's id exists.
    pub async fn update_entry(&self, entry: &Entry) -> Result<bool> {
        let tokens_json = serde_json::to_string(&entry.search_tokens)?;
        let attachments_json = serde_json::to_string(&entry.attachments)?;

        let result = sqlx::query(
            r#"
            UPDATE entries
            SET category = ?, description = ?, amount_cents = ?, entry_date = ?, status = ?,
                collaborator_id = ?, collaborator_name = ?, search_tokens = ?, notes = ?,
                attachments = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(entry.category.as_str())
        .bind(&entry.description)
        .bind(entry.amount_cents)
        .bind(instant_str(entry.entry_date))
        .bind(entry.status.as_str())
        .bind(&entry.collaborator_id)
        .bind(&entry.collaborator_name)
        .bind(&tokens_json)
        .bind(&entry.notes)
        .bind(&attachments_json)
        .bind(instant_str(entry.updated_at))
        .bind(entry.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update entry")?;

        Ok(result.rows_affected() > 0)
    }

    /// Set only the status and modification timestamp of an entry.
    /// Kept separate from the general update path so the most frequent
    /// mutation can never clobber other fields. Returns false if no record
    /// with the given id exists.
    pub async fn update_status(&self, id: EntryId, status: EntryStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE entries SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(instant_str(Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update entry status")?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete an entry. Returns false if no record with the given id
    /// exists; no tombstone is left behind.
    pub async fn delete_entry(&self, id: EntryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete entry")?;

        Ok(result.rows_affected() > 0)
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<Entry> {
        let id_str: String = row.get("id");
        let category_str: String = row.get("category");
        let status_str: String = row.get("status");
        let tokens_json: String = row.get("search_tokens");
        let attachments_json: String = row.get("attachments");
        let entry_date_str: String = row.get("entry_date");
        let created_at_str: String = row.get("created_at");
        let updated_at_str: String = row.get("updated_at");

        Ok(Entry {
            id: Uuid::parse_str(&id_str).context("Invalid entry ID")?,
            category: EntryCategory::from_str(&category_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid entry category: {}", category_str))?,
            description: row.get("description"),
            amount_cents: row.get("amount_cents"),
            entry_date: parse_instant(&entry_date_str).context("Invalid entry_date timestamp")?,
            status: EntryStatus::from_str(&status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid entry status: {}", status_str))?,
            collaborator_id: row.get("collaborator_id"),
            collaborator_name: row.get("collaborator_name"),
            search_tokens: serde_json::from_str(&tokens_json).unwrap_or_default(),
            notes: row.get("notes"),
            attachments: serde_json::from_str(&attachments_json).unwrap_or_default(),
            created_by: row.get("created_by"),
            created_by_name: row.get("created_by_name"),
            created_at: parse_instant(&created_at_str).context("Invalid created_at timestamp")?,
            updated_at: parse_instant(&updated_at_str).context("Invalid updated_at timestamp")?,
        })
    }
}

/// Render an instant with fixed millisecond precision so that the stored
/// strings compare lexicographically in chronological order.
fn instant_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

/// Normalize an upper date bound to the last instant of its calendar day
/// (23:59:59.999), whatever time of day the caller supplied.
pub fn end_of_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("23:59:59.999 is a valid time of day")
        .and_utc()
}

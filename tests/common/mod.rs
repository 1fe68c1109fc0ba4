// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use taccuino::application::{EntryForm, LedgerService};
use taccuino::domain::{Entry, EntryCategory, EntryStatus};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc> at midnight
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Helper to parse a datetime string ("%Y-%m-%d %H:%M:%S") into DateTime<Utc>
pub fn parse_datetime(datetime_str: &str) -> DateTime<Utc> {
    chrono::NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S")
        .unwrap()
        .and_utc()
}

/// Build an entry form with sensible test defaults
pub fn entry_form(
    category: EntryCategory,
    amount: &str,
    date: DateTime<Utc>,
    status: EntryStatus,
    collaborator_id: &str,
    collaborator_name: &str,
) -> EntryForm {
    EntryForm {
        category,
        description: format!("{} for {}", category, collaborator_name),
        amount: amount.to_string(),
        entry_date: date,
        status,
        collaborator_id: collaborator_id.to_string(),
        collaborator_name: collaborator_name.to_string(),
        notes: None,
    }
}

/// Test fixture: the standard two-entry ledger used across tests.
/// A: payment, 100.00, 2024-03-10, pending, Ana Silva.
/// B: receipt, 50.00, 2024-03-15, received, Bruno Costa.
pub struct SampleLedger;

impl SampleLedger {
    pub async fn create(service: &LedgerService) -> Result<(Entry, Entry)> {
        let a = service
            .create_entry(
                entry_form(
                    EntryCategory::Payment,
                    "100.00",
                    parse_date("2024-03-10"),
                    EntryStatus::Pending,
                    "collab-ana",
                    "Ana Silva",
                ),
                "admin-1",
                "Admin",
            )
            .await?;
        let b = service
            .create_entry(
                entry_form(
                    EntryCategory::Receipt,
                    "50.00",
                    parse_date("2024-03-15"),
                    EntryStatus::Received,
                    "collab-bruno",
                    "Bruno Costa",
                ),
                "admin-1",
                "Admin",
            )
            .await?;
        Ok((a, b))
    }
}

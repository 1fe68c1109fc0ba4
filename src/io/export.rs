use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{EntryFilter, LedgerService};
use crate::domain::{Entry, format_cents};

/// Ledger snapshot for full export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub entries: Vec<Entry>,
}

/// Exporter for converting ledger data to various formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export a filtered entry listing to CSV format, in listing order
    /// (entry date descending). Returns the number of rows written.
    pub async fn export_entries_csv<W: Write>(
        &self,
        filter: &EntryFilter,
        writer: W,
    ) -> Result<usize> {
        let entries = self.service.list_entries(filter).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record([
            "id",
            "entry_date",
            "category",
            "status",
            "collaborator",
            "description",
            "amount",
            "notes",
            "attachments",
        ])?;

        let mut count = 0;
        for entry in &entries {
            csv_writer.write_record(&[
                entry.id.to_string(),
                entry.entry_date.to_rfc3339(),
                entry.category.as_str().to_string(),
                entry.status.as_str().to_string(),
                entry.collaborator_name.clone(),
                entry.description.clone(),
                format_cents(entry.amount_cents),
                entry.notes.clone().unwrap_or_default(),
                entry.attachments.join(";"),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full ledger as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let entries = self.service.list_entries(&EntryFilter::default()).await?;

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            entries,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

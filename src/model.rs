use serde::Serialize;

use crate::config::RunConfig;
use crate::util::sha256_hex;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderFields {
    pub timestamp: Option<String>,
    pub event: Option<String>,
    pub actor: Option<String>,
}

impl HeaderFields {
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_none() && self.event.is_none() && self.actor.is_none()
    }

    pub fn key_parts(&self) -> Option<(&str, &str)> {
        Some((self.timestamp.as_deref()?, self.event.as_deref()?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Boundary {
    pub line_number: usize,
    pub header_text: String,
    pub fields: Option<HeaderFields>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub boundary: Boundary,
    pub body_lines: Vec<String>,
}

impl Record {
    pub fn line_count(&self) -> usize {
        self.body_lines.len()
    }

    pub fn last_line(&self) -> usize {
        self.boundary.line_number + self.body_lines.len().saturating_sub(1)
    }

    pub fn text(&self) -> String {
        self.body_lines.join("\n")
    }

    pub fn content_hash(&self) -> String {
        sha256_hex(self.text().as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub entry_key: String,
    pub source_path: String,
    pub line_number: i64,
    pub line_count: i64,
    pub header: String,
    pub logged_at: Option<String>,
    pub event: Option<String>,
    pub actor: Option<String>,
    pub entry_text: String,
    pub content_hash: String,
    pub inserted_at: String,
}

impl StoredRow {
    pub fn from_record(
        record: &Record,
        entry_key: String,
        source_path: &str,
        inserted_at: &str,
    ) -> Self {
        let fields = record.boundary.fields.clone().unwrap_or_default();
        let entry_text = record.text();
        let content_hash = sha256_hex(entry_text.as_bytes());

        Self {
            entry_key,
            source_path: source_path.to_string(),
            line_number: record.boundary.line_number as i64,
            line_count: record.line_count() as i64,
            header: record.boundary.header_text.clone(),
            logged_at: fields.timestamp,
            event: fields.event,
            actor: fields.actor,
            entry_text,
            content_hash,
            inserted_at: inserted_at.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Overwritten,
    Duplicate,
    // Forced write of a key whose stored content is identical; the row is left alone.
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub inserted: usize,
    pub overwritten: usize,
    pub duplicates: usize,
    pub unchanged: usize,
}

impl WriteSummary {
    pub fn rows_written(&self) -> usize {
        self.inserted + self.overwritten
    }

    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Overwritten => self.overwritten += 1,
            UpsertOutcome::Duplicate => self.duplicates += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestPaths {
    pub log_path: String,
    pub db_path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestCounts {
    pub line_count: usize,
    pub boundary_count: usize,
    pub record_count: usize,
    pub preamble_lines_discarded: usize,
    pub rows_inserted: usize,
    pub rows_overwritten: usize,
    pub duplicates_skipped: usize,
    pub rows_unchanged: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub failure_reason: Option<String>,
    pub config: RunConfig,
    pub paths: IngestPaths,
    pub counts: IngestCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordSpan {
    pub entry_key: String,
    pub first_line: usize,
    pub last_line: usize,
    pub header: String,
    pub fields: Option<HeaderFields>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub log_path: String,
    pub log_sha256: String,
    pub boundary_count: usize,
    pub records: Vec<RecordSpan>,
}

use super::*;

pub trait RecordStore {
    fn ensure_schema(&mut self) -> Result<(), StoreFault>;
    fn begin(&mut self) -> Result<(), StoreFault>;
    fn upsert(&mut self, row: &StoredRow, force: bool) -> Result<UpsertOutcome, StoreFault>;
    fn commit(&mut self) -> Result<(), StoreFault>;
    fn rollback(&mut self) -> Result<(), StoreFault>;
}

/// Stable per-record keys.
///
/// Records with a timestamp and event are keyed on those, a digest of the
/// header line, and the occurrence count of that header line in the file, so
/// edits to an entry's body keep its key. Other records fall back to their
/// line number and a digest of their full text.
pub fn derive_entry_keys(records: &[Record]) -> Vec<String> {
    let mut occurrences = HashMap::<&str, usize>::new();

    records
        .iter()
        .map(|record| {
            let boundary = &record.boundary;
            match boundary.fields.as_ref().and_then(HeaderFields::key_parts) {
                Some((timestamp, event)) => {
                    let occurrence = occurrences
                        .entry(boundary.header_text.as_str())
                        .or_insert(0);
                    *occurrence += 1;
                    let header_digest = sha256_hex(boundary.header_text.as_bytes());
                    format!("{timestamp}|{event}|{}#{occurrence}", &header_digest[..16])
                }
                None => format!(
                    "line:{}|{}",
                    boundary.line_number,
                    &record.content_hash()[..16]
                ),
            }
        })
        .collect()
}

pub(super) fn write_to_database(
    db_path: &Path,
    source_path: &str,
    records: &[Record],
    config: &RunConfig,
) -> Result<WriteSummary, IngestError> {
    let mut store = SqliteStore::open(db_path)?;
    write_records(&mut store, source_path, records, config)
}

/// Writes all records in one transaction. Duplicates are skipped unless
/// `config.force` is set, and even then only rows whose content differs are
/// rewritten. The first other failure stops the loop; rows
/// written before it are committed and reported in the error.
pub(super) fn write_records<S: RecordStore>(
    store: &mut S,
    source_path: &str,
    records: &[Record],
    config: &RunConfig,
) -> Result<WriteSummary, IngestError> {
    let mut summary = WriteSummary::default();
    if records.is_empty() {
        return Ok(summary);
    }

    let keys = derive_entry_keys(records);
    let inserted_at = now_utc_string();

    store
        .begin()
        .map_err(|source| IngestError::StorageWrite {
            record_number: 1,
            key: keys[0].clone(),
            committed: 0,
            skipped: 0,
            source,
        })?;

    for (index, (record, key)) in records.iter().zip(keys).enumerate() {
        let row = StoredRow::from_record(record, key, source_path, &inserted_at);

        match store.upsert(&row, config.force) {
            Ok(outcome) => {
                if config.debug {
                    match outcome {
                        UpsertOutcome::Inserted => {
                            debug!(key = %row.entry_key, line = row.line_number, "entry inserted");
                        }
                        UpsertOutcome::Overwritten => {
                            debug!(key = %row.entry_key, line = row.line_number, "entry overwritten");
                        }
                        UpsertOutcome::Duplicate => {
                            debug!(key = %row.entry_key, line = row.line_number, "duplicate entry skipped");
                        }
                        UpsertOutcome::Unchanged => {
                            trace!(key = %row.entry_key, line = row.line_number, "stored entry already current");
                        }
                    }
                }
                summary.record(outcome);
            }
            Err(source) => {
                let committed = commit_partial(store, &summary);
                return Err(IngestError::StorageWrite {
                    record_number: index + 1,
                    key: row.entry_key,
                    committed,
                    skipped: summary.duplicates,
                    source,
                });
            }
        }
    }

    store.commit().map_err(|source| {
        if let Err(rollback_error) = store.rollback() {
            warn!(error = %rollback_error, "rollback after failed commit also failed");
        }
        IngestError::StorageWrite {
            record_number: records.len(),
            key: "<commit>".to_string(),
            committed: 0,
            skipped: summary.duplicates,
            source,
        }
    })?;

    Ok(summary)
}

fn commit_partial<S: RecordStore>(store: &mut S, summary: &WriteSummary) -> usize {
    match store.commit() {
        Ok(()) => summary.rows_written(),
        Err(commit_error) => {
            warn!(error = %commit_error, "rows written before the failure were not committed");
            if let Err(rollback_error) = store.rollback() {
                warn!(error = %rollback_error, "rollback failed");
            }
            0
        }
    }
}

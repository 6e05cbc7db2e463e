use super::*;

#[derive(Debug)]
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, IngestError> {
        let open_error = |source: StoreFault| IngestError::StorageOpen {
            path: path.to_path_buf(),
            source,
        };

        let connection = Connection::open(path).map_err(|err| open_error(err.into()))?;
        configure_connection(&connection).map_err(|err| open_error(err.into()))?;

        let mut store = Self { connection };
        store.ensure_schema().map_err(open_error)?;

        Ok(store)
    }

    #[cfg(test)]
    pub(super) fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl RecordStore for SqliteStore {
    fn ensure_schema(&mut self) -> Result<(), StoreFault> {
        ensure_schema(&self.connection)?;
        Ok(())
    }

    fn begin(&mut self) -> Result<(), StoreFault> {
        self.connection.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn upsert(&mut self, row: &StoredRow, force: bool) -> Result<UpsertOutcome, StoreFault> {
        let existing: Option<String> = self
            .connection
            .query_row(
                "SELECT content_hash FROM log_entries WHERE entry_key = ?1",
                [&row.entry_key],
                |found| found.get(0),
            )
            .optional()?;

        match existing {
            None => {
                let mut statement = self.connection.prepare_cached(
                    "
                    INSERT INTO log_entries(
                      entry_key, source_path, line_number, line_count, header,
                      logged_at, event, actor, entry_text, content_hash, inserted_at
                    )
                    VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    ",
                )?;
                statement.execute(params![
                    &row.entry_key,
                    &row.source_path,
                    row.line_number,
                    row.line_count,
                    &row.header,
                    &row.logged_at,
                    &row.event,
                    &row.actor,
                    &row.entry_text,
                    &row.content_hash,
                    &row.inserted_at,
                ])?;
                Ok(UpsertOutcome::Inserted)
            }
            Some(_) if !force => Ok(UpsertOutcome::Duplicate),
            Some(stored_hash) if stored_hash == row.content_hash => Ok(UpsertOutcome::Unchanged),
            Some(_) => {
                let mut statement = self.connection.prepare_cached(
                    "
                    UPDATE log_entries SET
                      source_path = ?2,
                      line_number = ?3,
                      line_count = ?4,
                      header = ?5,
                      logged_at = ?6,
                      event = ?7,
                      actor = ?8,
                      entry_text = ?9,
                      content_hash = ?10,
                      inserted_at = ?11
                    WHERE entry_key = ?1
                    ",
                )?;
                statement.execute(params![
                    &row.entry_key,
                    &row.source_path,
                    row.line_number,
                    row.line_count,
                    &row.header,
                    &row.logged_at,
                    &row.event,
                    &row.actor,
                    &row.entry_text,
                    &row.content_hash,
                    &row.inserted_at,
                ])?;
                Ok(UpsertOutcome::Overwritten)
            }
        }
    }

    fn commit(&mut self) -> Result<(), StoreFault> {
        if self.connection.is_autocommit() {
            return Err(StoreFault::Rejected(
                "no open transaction; the database rolled it back".to_string(),
            ));
        }
        self.connection.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreFault> {
        if !self.connection.is_autocommit() {
            self.connection.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}

fn configure_connection(connection: &Connection) -> rusqlite::Result<()> {
    connection.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
        row.get::<_, String>(0)
    })?;
    connection.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS log_entries (
          entry_key TEXT PRIMARY KEY,
          source_path TEXT NOT NULL,
          line_number INTEGER NOT NULL,
          line_count INTEGER NOT NULL,
          header TEXT NOT NULL,
          logged_at TEXT,
          event TEXT,
          actor TEXT,
          entry_text TEXT NOT NULL,
          content_hash TEXT NOT NULL,
          inserted_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_log_entries_event ON log_entries(event);
        CREATE INDEX IF NOT EXISTS idx_log_entries_logged_at ON log_entries(logged_at);
        ",
    )?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use tracing::{info, warn};

use crate::cli::StatusArgs;

pub fn run(args: StatusArgs) -> Result<()> {
    if !args.db.exists() {
        bail!("database file missing: {}", args.db.display());
    }

    let conn = Connection::open_with_flags(&args.db, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("failed to open {}", args.db.display()))?;

    let schema_version: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = 'db_schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()
        .context("failed to read schema version")?;

    let Some(schema_version) = schema_version else {
        warn!(path = %args.db.display(), "database has no auditlog2db schema");
        return Ok(());
    };

    let (entries, first_logged_at, last_logged_at): (i64, Option<String>, Option<String>) = conn
        .query_row(
            "SELECT COUNT(*), MIN(logged_at), MAX(logged_at) FROM log_entries",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .context("failed to summarize log_entries")?;

    info!(
        path = %args.db.display(),
        schema_version = %schema_version,
        entries,
        first_logged_at = %first_logged_at.unwrap_or_default(),
        last_logged_at = %last_logged_at.unwrap_or_default(),
        "database status"
    );

    for (event, count) in event_counts(&conn, args.event_limit)? {
        info!(event = %event, count, "entries by event");
    }

    Ok(())
}

fn event_counts(conn: &Connection, limit: usize) -> Result<Vec<(String, i64)>> {
    let mut statement = conn.prepare(
        "
        SELECT COALESCE(event, '<none>'), COUNT(*) AS total
        FROM log_entries
        GROUP BY event
        ORDER BY total DESC, event
        LIMIT ?1
        ",
    )?;

    let rows = statement
        .query_map([limit as i64], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to count entries by event")?;

    Ok(rows)
}

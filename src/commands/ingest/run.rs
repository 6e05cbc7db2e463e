use super::*;

#[derive(Debug, Clone, Default)]
pub(super) struct IngestOutcome {
    pub line_count: usize,
    pub boundary_count: usize,
    pub record_count: usize,
    pub preamble_lines_discarded: usize,
    pub write: WriteSummary,
}

pub fn run(args: IngestArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));
    let config = args.run_config();

    if config.debug {
        debug!(
            force = config.force,
            quiet = config.quiet,
            preamble = config.preamble.as_str(),
            "debugging is on"
        );
    }
    if config.force {
        info!("force enabled: stored entries with matching keys will be overwritten");
    }

    let db_path = match args.output.clone() {
        Some(path) => path,
        None => prompt_for_path("Database")?,
    };
    let log_path = match args.input.clone() {
        Some(path) => path,
        None => prompt_for_path("Logfile")?,
    };

    info!(
        log = %log_path.display(),
        db = %db_path.display(),
        run_id = %run_id,
        "starting ingest"
    );

    let scanner = HeaderScanner::new(AuditHeaderMatcher::new()?);
    let result = ingest_file(&scanner, &log_path, &db_path, &config);

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = build_run_manifest(
            run_id,
            started_at,
            &config,
            &log_path,
            &db_path,
            &result,
        );
        match write_json_pretty(manifest_path, &manifest) {
            Ok(()) => info!(path = %manifest_path.display(), "wrote ingest run manifest"),
            // The ingest failure is the cause to report.
            Err(err) if result.is_err() => warn!(
                path = %manifest_path.display(),
                error = %format!("{err:#}"),
                "failed to write ingest run manifest"
            ),
            Err(err) => return Err(err),
        }
    }

    let outcome = result?;

    info!(
        records = outcome.record_count,
        inserted = outcome.write.inserted,
        overwritten = outcome.write.overwritten,
        duplicates = outcome.write.duplicates,
        unchanged = outcome.write.unchanged,
        "ingest completed"
    );
    if outcome.write.duplicates > 0 && !config.force {
        info!(
            skipped = outcome.write.duplicates,
            "entries already stored were skipped; rerun with --force to overwrite them"
        );
    }

    Ok(())
}

pub(super) fn ingest_file<M: HeaderMatcher>(
    scanner: &HeaderScanner<M>,
    log_path: &Path,
    db_path: &Path,
    config: &RunConfig,
) -> Result<IngestOutcome, IngestError> {
    let log = LogFile::read(log_path)?;
    if config.debug {
        debug!(lines = log.lines.len(), sha256 = %log.sha256, "read log file");
    }

    let boundaries = scanner.scan_lines(&log.lines, config);
    if boundaries.is_empty() {
        warn!(path = %log_path.display(), lines = log.lines.len(), "no header lines found");
    }

    let records = chop_lines(&log.lines, &boundaries, config)?;
    let preamble_lines_discarded =
        discarded_line_count(&log.lines, &boundaries, config.preamble);

    let source_path = log.path.display().to_string();
    let write = write_to_database(db_path, &source_path, &records, config)?;

    Ok(IngestOutcome {
        line_count: log.lines.len(),
        boundary_count: boundaries.len(),
        record_count: records.len(),
        preamble_lines_discarded,
        write,
    })
}

fn build_run_manifest(
    run_id: String,
    started_at: String,
    config: &RunConfig,
    log_path: &Path,
    db_path: &Path,
    result: &Result<IngestOutcome, IngestError>,
) -> IngestRunManifest {
    let (status, failure_reason, counts) = match result {
        Ok(outcome) => (
            "completed",
            None,
            IngestCounts {
                line_count: outcome.line_count,
                boundary_count: outcome.boundary_count,
                record_count: outcome.record_count,
                preamble_lines_discarded: outcome.preamble_lines_discarded,
                rows_inserted: outcome.write.inserted,
                rows_overwritten: outcome.write.overwritten,
                duplicates_skipped: outcome.write.duplicates,
                rows_unchanged: outcome.write.unchanged,
            },
        ),
        Err(err) => {
            let mut counts = IngestCounts::default();
            if let IngestError::StorageWrite {
                committed, skipped, ..
            } = err
            {
                counts.rows_inserted = *committed;
                counts.duplicates_skipped = *skipped;
            }
            ("aborted", Some(failure_chain(err)), counts)
        }
    };

    IngestRunManifest {
        manifest_version: 1,
        run_id,
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        status: status.to_string(),
        started_at,
        updated_at: now_utc_string(),
        failure_reason,
        config: *config,
        paths: IngestPaths {
            log_path: log_path.display().to_string(),
            db_path: db_path.display().to_string(),
        },
        counts,
    }
}

fn failure_chain(err: &IngestError) -> String {
    let mut message = err.to_string();
    let mut cause = std::error::Error::source(err);
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = std::error::Error::source(inner);
    }
    message
}

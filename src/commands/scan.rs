use anyhow::Result;
use tracing::{debug, info};

use crate::cli::ScanArgs;
use crate::commands::ingest::{AuditHeaderMatcher, HeaderScanner, chop, derive_entry_keys};
use crate::model::{RecordSpan, ScanManifest};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: ScanArgs) -> Result<()> {
    let config = args.run_config();
    let scanner = HeaderScanner::new(AuditHeaderMatcher::new()?);

    let boundaries = scanner.scan(&args.input, &config)?;
    let records = chop(&args.input, &boundaries, &config)?;
    let keys = derive_entry_keys(&records);

    if config.debug {
        for (record, key) in records.iter().zip(&keys) {
            debug!(
                key = %key,
                first_line = record.boundary.line_number,
                last_line = record.last_line(),
                "record span"
            );
        }
    }

    info!(
        path = %args.input.display(),
        boundaries = boundaries.len(),
        records = records.len(),
        "scan complete"
    );

    let Some(manifest_path) = args.manifest_path else {
        return Ok(());
    };

    let spans = records
        .iter()
        .zip(keys)
        .map(|(record, entry_key)| RecordSpan {
            entry_key,
            first_line: record.boundary.line_number,
            last_line: record.last_line(),
            header: record.boundary.header_text.clone(),
            fields: record.boundary.fields.clone(),
        })
        .collect::<Vec<_>>();

    let manifest = ScanManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        log_path: args.input.display().to_string(),
        log_sha256: sha256_file(&args.input)?,
        boundary_count: boundaries.len(),
        records: spans,
    };

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote scan manifest");

    Ok(())
}

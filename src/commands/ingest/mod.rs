use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, Utc};
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, trace, warn};

use crate::cli::{IngestArgs, PreamblePolicy};
use crate::config::RunConfig;
use crate::error::{IngestError, StoreFault};
use crate::model::{
    Boundary, HeaderFields, IngestCounts, IngestPaths, IngestRunManifest, Record, StoredRow,
    UpsertOutcome, WriteSummary,
};
use crate::util::{
    now_utc_string, prompt_for_path, sha256_hex, utc_compact_string, write_json_pretty,
};

const DB_SCHEMA_VERSION: &str = "0.1.0";

mod db_setup;
mod header_scan;
mod record_chop;
mod run;
mod store_writer;

pub use header_scan::{AuditHeaderMatcher, HeaderScanner};
pub use record_chop::chop;
pub use run::run;
pub use store_writer::derive_entry_keys;

use db_setup::*;
use header_scan::*;
use record_chop::*;
#[cfg(test)]
use run::*;
use store_writer::*;

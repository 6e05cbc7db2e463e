pub mod ingest;
pub mod scan;
pub mod status;

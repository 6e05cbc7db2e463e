use std::fs::{self, File};
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn utc_compact_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

pub fn prompt_for_path(label: &str) -> Result<PathBuf> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    read_path_answer(&mut stdin.lock(), &mut stdout, label)
}

fn read_path_answer<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<PathBuf> {
    writeln!(output, "{label} location has not been specified")?;
    write!(output, "Enter {} location: ", label.to_ascii_lowercase())?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .with_context(|| format!("failed to read {} location", label.to_ascii_lowercase()))?;

    let answer = answer.trim();
    if answer.is_empty() {
        bail!("no {} location given", label.to_ascii_lowercase());
    }

    Ok(PathBuf::from(answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_matches_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn read_path_answer_trims_input() {
        let mut input = io::Cursor::new(b"  /tmp/audit.log \n".to_vec());
        let mut output = Vec::new();

        let path = read_path_answer(&mut input, &mut output, "Logfile").expect("answer");

        assert_eq!(path, PathBuf::from("/tmp/audit.log"));
        let prompt = String::from_utf8(output).expect("utf8 prompt");
        assert!(prompt.starts_with("Logfile location has not been specified"));
    }

    #[test]
    fn read_path_answer_rejects_empty_input() {
        let mut input = io::Cursor::new(b"\n".to_vec());
        let mut output = Vec::new();

        assert!(read_path_answer(&mut input, &mut output, "Database").is_err());
    }
}

use super::*;

pub trait HeaderMatcher {
    fn capture(&self, line: &str) -> Option<HeaderFields>;
}

#[derive(Debug)]
pub struct AuditHeaderMatcher {
    header: Regex,
    actor: Regex,
}

impl AuditHeaderMatcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            header: Regex::new(
                r"^(?P<timestamp>(?P<date>[0-9]{4}-[0-9]{2}-[0-9]{2})[T ](?P<hour>[0-9]{2}):(?P<minute>[0-9]{2})(?::(?P<second>[0-9]{2})(?:[.,][0-9]{1,9})?)?(?:Z|[+-][0-9]{2}:?[0-9]{2})?)\s+(?P<event>[A-Z][A-Z0-9_]+)(?:\s+(?P<detail>\S.*?))?\s*$",
            )
            .context("failed to compile audit header regex")?,
            actor: Regex::new(r#"(?:^|\s)(?:user|uid|auid|actor)=(?P<actor>"[^"]*"|\S+)"#)
                .context("failed to compile actor regex")?,
        })
    }
}

impl HeaderMatcher for AuditHeaderMatcher {
    fn capture(&self, line: &str) -> Option<HeaderFields> {
        let captures = self.header.captures(line)?;

        NaiveDate::parse_from_str(captures.name("date")?.as_str(), "%Y-%m-%d").ok()?;
        let hour = captures.name("hour")?.as_str().parse::<u32>().ok()?;
        let minute = captures.name("minute")?.as_str().parse::<u32>().ok()?;
        let second = match captures.name("second") {
            Some(value) => value.as_str().parse::<u32>().ok()?,
            None => 0,
        };
        NaiveTime::from_hms_opt(hour, minute, second)?;

        let actor = captures
            .name("detail")
            .and_then(|detail| self.actor.captures(detail.as_str()))
            .and_then(|actor| actor.name("actor"))
            .map(|value| value.as_str().trim_matches('"').to_string())
            .filter(|value| !value.is_empty());

        Some(HeaderFields {
            timestamp: Some(captures.name("timestamp")?.as_str().to_string()),
            event: Some(captures.name("event")?.as_str().to_string()),
            actor,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LogFile {
    pub path: PathBuf,
    pub lines: Vec<String>,
    pub sha256: String,
}

impl LogFile {
    pub fn read(path: &Path) -> Result<Self, IngestError> {
        let bytes = fs::read(path).map_err(|source| IngestError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let mut lines = Vec::new();
        for (index, raw_line) in split_lines(&bytes).into_iter().enumerate() {
            let line = std::str::from_utf8(raw_line).map_err(|source| IngestError::Encoding {
                path: path.to_path_buf(),
                line_number: index + 1,
                source,
            })?;
            lines.push(line.to_string());
        }

        Ok(Self {
            path: path.to_path_buf(),
            lines,
            sha256: sha256_hex(&bytes),
        })
    }
}

pub(super) fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    if bytes.is_empty() {
        return Vec::new();
    }

    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|byte| *byte == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect()
}

pub struct HeaderScanner<M> {
    matcher: M,
}

impl<M: HeaderMatcher> HeaderScanner<M> {
    pub fn new(matcher: M) -> Self {
        Self { matcher }
    }

    pub fn scan(&self, path: &Path, config: &RunConfig) -> Result<Vec<Boundary>, IngestError> {
        let log = LogFile::read(path)?;
        Ok(self.scan_lines(&log.lines, config))
    }

    pub fn scan_lines(&self, lines: &[String], config: &RunConfig) -> Vec<Boundary> {
        let mut boundaries = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let line_number = index + 1;
            if config.debug {
                trace!(line = line_number, text = %line, "considering line");
            }

            let Some(fields) = self.matcher.capture(line) else {
                continue;
            };

            if config.debug {
                debug!(
                    line = line_number,
                    timestamp = fields.timestamp.as_deref().unwrap_or(""),
                    event = fields.event.as_deref().unwrap_or(""),
                    actor = fields.actor.as_deref().unwrap_or(""),
                    "header line matched"
                );
            }

            boundaries.push(Boundary {
                line_number,
                header_text: line.clone(),
                fields: (!fields.is_empty()).then_some(fields),
            });
        }

        boundaries
    }
}

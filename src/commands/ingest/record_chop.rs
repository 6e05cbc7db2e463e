use super::*;

pub fn chop(
    path: &Path,
    boundaries: &[Boundary],
    config: &RunConfig,
) -> Result<Vec<Record>, IngestError> {
    let log = LogFile::read(path)?;
    chop_lines(&log.lines, boundaries, config)
}

pub fn chop_lines(
    lines: &[String],
    boundaries: &[Boundary],
    config: &RunConfig,
) -> Result<Vec<Record>, IngestError> {
    check_boundaries(boundaries, lines.len())?;

    let mut records = Vec::with_capacity(boundaries.len() + 1);

    let leading = leading_line_count(boundaries, lines.len());
    let preamble = &lines[..leading];
    let preamble_has_text = preamble.iter().any(|line| !line.trim().is_empty());
    match config.preamble {
        PreamblePolicy::Keep if preamble_has_text => {
            records.push(Record {
                boundary: Boundary {
                    line_number: 1,
                    header_text: preamble[0].clone(),
                    fields: None,
                },
                body_lines: preamble.to_vec(),
            });
        }
        _ if preamble_has_text => {
            warn!(lines = leading, "discarding lines before the first header line");
        }
        _ if leading > 0 => {
            debug!(lines = leading, "skipping blank lines before the first header line");
        }
        _ => {}
    }

    for (index, boundary) in boundaries.iter().enumerate() {
        let start = boundary.line_number - 1;
        let end = boundaries
            .get(index + 1)
            .map(|next| next.line_number - 1)
            .unwrap_or(lines.len());

        records.push(Record {
            boundary: boundary.clone(),
            body_lines: lines[start..end].to_vec(),
        });
    }

    Ok(records)
}

pub(super) fn leading_line_count(boundaries: &[Boundary], total_lines: usize) -> usize {
    boundaries
        .first()
        .map(|first| first.line_number.saturating_sub(1))
        .unwrap_or(total_lines)
}

pub(super) fn discarded_line_count(
    lines: &[String],
    boundaries: &[Boundary],
    policy: PreamblePolicy,
) -> usize {
    let leading = leading_line_count(boundaries, lines.len());
    let kept = policy == PreamblePolicy::Keep
        && lines[..leading.min(lines.len())]
            .iter()
            .any(|line| !line.trim().is_empty());

    if kept { 0 } else { leading }
}

fn check_boundaries(boundaries: &[Boundary], total_lines: usize) -> Result<(), IngestError> {
    let mut previous = 0usize;

    for (index, boundary) in boundaries.iter().enumerate() {
        if boundary.line_number == 0 {
            return Err(IngestError::InvariantViolation {
                index,
                reason: "line numbers start at 1".to_string(),
            });
        }
        if boundary.line_number > total_lines {
            return Err(IngestError::InvariantViolation {
                index,
                reason: format!(
                    "line {} is past the end of the file ({} lines)",
                    boundary.line_number, total_lines
                ),
            });
        }
        if boundary.line_number <= previous {
            return Err(IngestError::InvariantViolation {
                index,
                reason: format!(
                    "line {} does not follow line {}",
                    boundary.line_number, previous
                ),
            });
        }
        previous = boundary.line_number;
    }

    Ok(())
}

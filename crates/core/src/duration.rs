use crate::{
    error::{Result, YtcefrError},
    types::{CaptionEntry, DurationMinutes},
};

/// Parse the start time out of a `"<seconds>s: <text>"` transcript line
pub fn parse_start_seconds(line: &str) -> Result<f64> {
    let field = line.split("s:").next().unwrap_or_default();
    let field = field.trim().replace('s', "");

    let seconds = field
        .parse::<f64>()
        .map_err(|e| YtcefrError::DurationParse {
            line: line.to_string(),
            reason: e.to_string(),
        })?;

    if !seconds.is_finite() {
        return Err(YtcefrError::DurationParse {
            line: line.to_string(),
            reason: "start time is not finite".to_string(),
        });
    }

    Ok(seconds)
}

/// Duration in minutes from the last line of a timestamped transcript
pub fn duration_from_log<S: AsRef<str>>(log: &[S]) -> Result<DurationMinutes> {
    let last = log
        .iter()
        .map(AsRef::as_ref)
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| YtcefrError::DurationParse {
            line: String::new(),
            reason: "timestamped transcript is empty".to_string(),
        })?;

    parse_start_seconds(last).map(DurationMinutes::from_seconds)
}

/// Duration in minutes from the last caption entry's start time
pub fn duration_from_entries(entries: &[CaptionEntry]) -> DurationMinutes {
    entries
        .last()
        .map(|entry| DurationMinutes::from_seconds(entry.start))
        .unwrap_or(DurationMinutes::UNKNOWN)
}

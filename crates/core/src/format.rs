use chrono::{DateTime, Utc};
use chrono_humanize::HumanTime;

use crate::types::{CaptionEntry, Cue};

/// Format seconds as HH:MM:SS.mmm (subtitle timestamp)
pub fn format_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1_000;
    let millis = total_millis % 1_000;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

/// Format one caption entry as a timestamped transcript line
pub fn format_log_line(entry: &CaptionEntry) -> String {
    // one line per entry, even when the caption text spans several
    format!("{:.2}s: {}", entry.start, entry.text.replace('\n', " "))
}

/// Render a subtitle track as a WebVTT document
pub fn format_subtitles(cues: &[Cue]) -> String {
    let mut output = String::from("WEBVTT\n\n");
    for cue in cues {
        output.push_str(&format!(
            "{} --> {}\n{}\n\n",
            format_timestamp(cue.start),
            format_timestamp(cue.end),
            cue.text
        ));
    }
    output
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Shell script that plays the video with the downloaded subtitles
pub fn format_play_script(video_id: &str, subtitle_file: &str) -> String {
    format!(
        "#!/bin/bash\nmpv \"{}\" --sub-file=\"{}\"\n",
        watch_url(video_id),
        subtitle_file
    )
}

/// Human-friendly relative time ("3 days ago"). Unparseable input is returned as-is.
pub fn format_time_ago(published_at: &str, now: DateTime<Utc>) -> String {
    match DateTime::parse_from_rfc3339(published_at) {
        Ok(published) => HumanTime::from(published.with_timezone(&Utc) - now).to_string(),
        Err(_) => published_at.to_string(),
    }
}

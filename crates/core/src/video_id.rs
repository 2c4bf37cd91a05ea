use url::Url;

use crate::error::{Result, YtcefrError};

const MAX_VIDEO_ID_LEN: usize = 128;

/// Extract the video id from a watch URL, a youtu.be short link, or a bare id
pub fn extract_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    let invalid = || YtcefrError::InvalidVideoUrl {
        url: input.to_string(),
    };

    let raw_id = match Url::parse(input) {
        Ok(url) if url.host_str() == Some("youtu.be") => url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string),
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned()),
        Err(_) => Some(input.to_string()),
    };

    raw_id
        .as_deref()
        .and_then(sanitize_video_id)
        .ok_or_else(invalid)
}

/// Only ASCII alphanumerics, `-` and `_` are safe for paths and API calls.
pub fn sanitize_video_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let valid = !trimmed.is_empty()
        && trimmed.len() <= MAX_VIDEO_ID_LEN
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));

    valid.then(|| trimmed.to_string())
}

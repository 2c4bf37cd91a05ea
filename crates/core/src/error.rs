use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum YtcefrError {
    #[error("Invalid video URL {url}: no usable video id")]
    InvalidVideoUrl { url: String },

    #[error("Caption fetch failed for {video_id}: {reason}")]
    CaptionFetch { video_id: String, reason: String },

    #[error("Missing artifact: {path}")]
    MissingArtifact { path: PathBuf },

    #[error("Could not parse duration from {line:?}: {reason}")]
    DurationParse { line: String, reason: String },

    #[error("Could not parse structured response: {reason}")]
    ResponseParse { reason: String },

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingCredential { env_var: String },

    #[error("{service} returned {status}: {body}")]
    Upstream {
        service: String,
        status: u16,
        body: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, YtcefrError>;

//! Ytcefr Core Library
//!
//! Turns YouTube captions into sentence transcripts and subtitles, then asks an
//! LLM backend to grade the language level of the video.

pub mod cache;
pub mod captions;
pub mod chat;
pub mod config;
pub mod duration;
pub mod error;
pub mod extract;
pub mod format;
pub mod metadata;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod segment;
pub mod types;
pub mod video_id;

// Re-export commonly used items at crate root
pub use cache::ArtifactPaths;
pub use captions::{CaptionSource, YoutubeCaptions};
pub use config::Config;
pub use error::{Result, YtcefrError};
pub use extract::extract_analysis;
pub use pipeline::{CaptionOutcome, Pipeline, RunReport, Stage};
pub use provider::Provider;
pub use segment::segment_captions;
pub use types::{
    Analysis, AnalysisRecord, CaptionEntry, CefrLevel, Cue, DurationMinutes, SegmentedCaptions,
    VideoInfo,
};
pub use video_id::extract_video_id;

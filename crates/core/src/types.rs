use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// One timestamped caption unit as delivered by the caption source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

impl CaptionEntry {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            text: text.into(),
        }
    }
}

/// One subtitle display unit. Cues may overlap and are never deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Everything derived from a caption stream in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentedCaptions {
    pub sentences: Vec<String>,
    pub timestamped_log: Vec<String>,
    pub subtitles: Vec<Cue>,
}

/// Total duration in minutes, rounded to 2 decimals. `0.0` means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationMinutes(f64);

impl DurationMinutes {
    pub const UNKNOWN: DurationMinutes = DurationMinutes(0.0);

    /// Minutes rounded to two decimals, exact ties to even
    pub fn from_seconds(seconds: f64) -> Self {
        Self(((seconds / 60.0) * 100.0).round_ties_even() / 100.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_unknown(self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for DurationMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug keeps the trailing ".0" on whole minutes
        write!(f, "{:?}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        };
        f.write_str(level)
    }
}

/// The 7-field analysis returned by the text-generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub category: String,
    pub keywords: Vec<String>,
    pub summary: String,
    pub duration: f64,
    #[serde(rename = "kPM", deserialize_with = "words_per_minute")]
    pub kpm: u32,
    #[serde(rename = "CEFR")]
    pub cefr: CefrLevel,
    pub justification: String,
}

/// Backends disagree on whether kPM is an integer, so accept either.
fn words_per_minute<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "kPM out of range: {value}"
        )));
    }
    Ok(value.round() as u32)
}

/// Outcome of the structured-analysis exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Present(AnalysisRecord),
    Absent { reason: String },
}

impl Analysis {
    pub fn absent(reason: impl Into<String>) -> Self {
        Analysis::Absent {
            reason: reason.into(),
        }
    }

    pub fn record(&self) -> Option<&AnalysisRecord> {
        match self {
            Analysis::Present(record) => Some(record),
            Analysis::Absent { .. } => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Analysis::Present(_))
    }
}

/// Basic video metadata from the metadata service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub video_id: String,
    pub url: String,
    pub title: String,
    pub published_at: String,
    pub channel_title: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

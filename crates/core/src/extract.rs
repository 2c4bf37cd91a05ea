//! Recovers the structured analysis from a free-text backend reply.
//!
//! Backends wrap their JSON inconsistently: sometimes in a ```` ```json ````
//! fence, sometimes in a bare fence, sometimes not at all. Each wrapping
//! style is an [`ExtractionStrategy`]; they are tried in order and the first
//! candidate that parses wins.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error, warn};

use crate::{
    error::{Result, YtcefrError},
    types::{Analysis, AnalysisRecord},
};

const FENCE: &str = "```";
const EXPECTED_KEYWORDS: usize = 5;

static TAGGED_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?i:json)[ \t]*\r?\n?(.*?)```").expect("valid fence regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Inner content of the first ```` ```json ```` fenced block
    TaggedFence,
    /// Strip one leading and one trailing ```` ``` ```` marker
    GenericFence,
    /// The trimmed reply as-is
    Verbatim,
}

impl ExtractionStrategy {
    pub const ORDERED: [ExtractionStrategy; 3] = [
        ExtractionStrategy::TaggedFence,
        ExtractionStrategy::GenericFence,
        ExtractionStrategy::Verbatim,
    ];

    /// Candidate document text, or `None` when the wrapping does not apply.
    pub fn candidate<'a>(&self, reply: &'a str) -> Option<&'a str> {
        match self {
            ExtractionStrategy::TaggedFence => TAGGED_FENCE
                .captures(reply)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim()),
            ExtractionStrategy::GenericFence => {
                let inner = reply.strip_prefix(FENCE)?;
                let inner = inner.strip_suffix(FENCE).unwrap_or(inner);
                Some(inner.trim())
            }
            ExtractionStrategy::Verbatim => Some(reply),
        }
    }
}

/// Parse one candidate as the 7-field record
pub fn parse_record(candidate: &str) -> Result<AnalysisRecord> {
    let record: AnalysisRecord =
        serde_json::from_str(candidate).map_err(|e| YtcefrError::ResponseParse {
            reason: e.to_string(),
        })?;

    if record.keywords.len() != EXPECTED_KEYWORDS {
        warn!(
            "Expected {} keywords, backend returned {}",
            EXPECTED_KEYWORDS,
            record.keywords.len()
        );
    }

    Ok(record)
}

/// Try every strategy in order; never fails, the failure is carried in `Analysis::Absent`.
pub fn extract_analysis(reply: &str) -> Analysis {
    let reply = reply.trim();
    let mut first_error: Option<YtcefrError> = None;

    for strategy in ExtractionStrategy::ORDERED {
        let Some(candidate) = strategy.candidate(reply) else {
            continue;
        };
        match parse_record(candidate) {
            Ok(record) => {
                debug!("Structured response extracted via {:?}", strategy);
                return Analysis::Present(record);
            }
            Err(e) => {
                debug!("{:?} candidate did not parse: {}", strategy, e);
                first_error.get_or_insert(e);
            }
        }
    }

    let reason = first_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "empty response".to_string());
    error!("Could not parse structured response: {}", reason);
    Analysis::absent(reason)
}

use async_trait::async_trait;
use tracing::debug;
use yt_transcript_rs::api::YouTubeTranscriptApi;

use crate::{
    error::{Result, YtcefrError},
    types::CaptionEntry,
};

/// Anything that can deliver the ordered caption stream for a video
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionEntry>>;
}

/// English captions from YouTube
pub struct YoutubeCaptions {
    api: YouTubeTranscriptApi,
    languages: Vec<String>,
}

impl YoutubeCaptions {
    pub fn new() -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None).map_err(|e| {
            YtcefrError::CaptionFetch {
                video_id: String::new(),
                reason: format!("could not initialise transcript client: {e}"),
            }
        })?;

        Ok(Self {
            api,
            languages: vec!["en".to_string()],
        })
    }
}

#[async_trait]
impl CaptionSource for YoutubeCaptions {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionEntry>> {
        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();

        let transcript = self
            .api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(|e| YtcefrError::CaptionFetch {
                video_id: video_id.to_string(),
                reason: e.to_string(),
            })?;

        debug!(
            "Fetched {} caption entries for {}",
            transcript.snippets.len(),
            video_id
        );

        Ok(transcript
            .snippets
            .into_iter()
            .map(|snippet| CaptionEntry::new(snippet.start, snippet.duration, snippet.text))
            .collect())
    }
}

//! Per-video run: START → CAPTIONED → ANALYZED → RENDERED → DONE.
//!
//! Each stage decides for itself whether a failure degrades the run or ends
//! it. Only the render exchange and an unusable URL propagate errors; every
//! other failure is logged and replaced by an empty value.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::{
    cache::{ArtifactPaths, load_plain_transcript, load_timestamped_log, save_captions},
    captions::CaptionSource,
    chat::{ChatClient, ChatMessage},
    config::Config,
    duration::duration_from_log,
    error::Result,
    extract::extract_analysis,
    metadata::fetch_video_info,
    prompt::{
        ANALYSIS_SYSTEM_PROMPT, RENDER_SYSTEM_PROMPT, build_analysis_prompt, build_render_prompt,
    },
    segment::segment_captions,
    types::{Analysis, DurationMinutes, VideoInfo},
    video_id::extract_video_id,
};

const ANALYSIS_TEMPERATURE: f32 = 0.2;
const RENDER_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Captioned,
    Analyzed,
    Rendered,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionOutcome {
    /// Both text artifacts were already on disk; nothing was fetched
    Cached,
    Fetched { entries: usize, sentences: usize },
}

#[derive(Debug)]
pub struct RunReport {
    pub video_id: String,
    /// `None` when fetching or persisting captions failed
    pub captions: Option<CaptionOutcome>,
    pub info: Option<VideoInfo>,
    pub analysis: Analysis,
    pub rendered: String,
}

pub struct Pipeline<'a> {
    config: &'a Config,
    captions: &'a dyn CaptionSource,
    http: reqwest::Client,
    chat: ChatClient,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, captions: &'a dyn CaptionSource) -> Self {
        let http = reqwest::Client::new();
        Self {
            config,
            captions,
            chat: ChatClient::new(http.clone()),
            http,
        }
    }

    pub fn paths(&self, video_id: &str) -> ArtifactPaths {
        ArtifactPaths::new(&self.config.videos_dir, video_id)
    }

    /// Fetch, segment and persist captions unless both text artifacts already exist
    pub async fn caption(&self, paths: &ArtifactPaths) -> Result<CaptionOutcome> {
        tokio::fs::create_dir_all(&paths.dir).await?;

        if paths.captions_cached() {
            info!("Caption artifacts already exist for {}, skipping fetch", paths.video_id);
            return Ok(CaptionOutcome::Cached);
        }

        let entries = self.captions.fetch(&paths.video_id).await?;
        let segmented = segment_captions(&entries);
        save_captions(paths, &segmented).await?;

        info!(
            "Saved {} sentences from {} caption entries to {}",
            segmented.sentences.len(),
            entries.len(),
            paths.dir.display()
        );

        Ok(CaptionOutcome::Fetched {
            entries: entries.len(),
            sentences: segmented.sentences.len(),
        })
    }

    /// Duration from the persisted timestamped transcript, `UNKNOWN` on any failure
    pub async fn duration(&self, paths: &ArtifactPaths) -> DurationMinutes {
        let parsed = match load_timestamped_log(paths).await {
            Ok(log) => duration_from_log(&log),
            Err(e) => Err(e),
        };

        parsed.unwrap_or_else(|e| {
            error!("Could not determine duration: {}", e);
            DurationMinutes::UNKNOWN
        })
    }

    /// Metadata lookup; failures degrade to `None`
    pub async fn video_info(&self, video_id: &str) -> Option<VideoInfo> {
        match fetch_video_info(&self.http, self.config, video_id).await {
            Ok(info) => Some(info),
            Err(e) => {
                error!("Could not fetch video info: {}", e);
                None
            }
        }
    }

    /// Structured analysis; every failure ends in `Analysis::Absent`
    pub async fn analyze(&self, paths: &ArtifactPaths) -> Analysis {
        let text = load_plain_transcript(paths).await.unwrap_or_else(|e| {
            error!("Could not read transcript: {}", e);
            String::new()
        });
        let duration = self.duration(paths).await;

        if text.is_empty() || duration.is_unknown() {
            warn!("Skipping analysis, transcript or duration missing");
            return Analysis::absent("transcript or duration missing");
        }

        info!("Analyzing with {}", self.config.provider.name());
        let prompt = build_analysis_prompt(&text, duration, &self.config.report_lang);
        let messages = [
            ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];

        match self
            .chat
            .complete(self.config, &messages, ANALYSIS_TEMPERATURE)
            .await
        {
            Ok(reply) => extract_analysis(&reply),
            Err(e) => {
                error!("Analysis request failed: {}", e);
                Analysis::absent(e.to_string())
            }
        }
    }

    /// Free-text render. Unlike analysis, failures here propagate.
    pub async fn render(&self, info: Option<&VideoInfo>, analysis: &Analysis) -> Result<String> {
        info!("Rendering with {}", self.config.provider.name());
        let prompt = build_render_prompt(info, analysis, &self.config.report_lang, Utc::now());
        let messages = [
            ChatMessage::system(RENDER_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];

        self.chat
            .complete(self.config, &messages, RENDER_TEMPERATURE)
            .await
    }

    /// Run every stage for one video URL, reporting each state as it is entered
    pub async fn run<F>(&self, url: &str, mut on_stage: F) -> Result<RunReport>
    where
        F: FnMut(Stage),
    {
        let video_id = extract_video_id(url)?;
        let paths = self.paths(&video_id);
        info!("Analyzing video: {}", url);
        on_stage(Stage::Start);

        let captions = match self.caption(&paths).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Captions unavailable: {}", e);
                None
            }
        };
        on_stage(Stage::Captioned);

        let info = self.video_info(&video_id).await;
        let analysis = self.analyze(&paths).await;
        log_results(info.as_ref(), &analysis);
        on_stage(Stage::Analyzed);

        let rendered = self.render(info.as_ref(), &analysis).await?;
        on_stage(Stage::Rendered);

        on_stage(Stage::Done);
        Ok(RunReport {
            video_id,
            captions,
            info,
            analysis,
            rendered,
        })
    }
}

fn log_results(info: Option<&VideoInfo>, analysis: &Analysis) {
    let pretty = |value: serde_json::Result<String>| value.unwrap_or_default();

    match info {
        Some(info) => info!("Info Result: {}", pretty(serde_json::to_string_pretty(info))),
        None => info!("Info Result: {{}}"),
    }
    match analysis {
        Analysis::Present(record) => {
            info!("Analyze Result: {}", pretty(serde_json::to_string_pretty(record)))
        }
        Analysis::Absent { reason } => info!("Analyze Result: absent ({})", reason),
    }
}

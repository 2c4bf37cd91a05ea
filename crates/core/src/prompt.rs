use chrono::{DateTime, Utc};
use serde_json::json;

use crate::{
    format::format_time_ago,
    types::{Analysis, DurationMinutes, VideoInfo},
};

pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are a language-learning assistant focused on judging the CEFR level of English material.";

pub const RENDER_SYSTEM_PROMPT: &str = "You are a language-learning assistant. Render the response from the given template and video data.";

/// Build the structured-analysis prompt. Pure and deterministic.
pub fn build_analysis_prompt(text: &str, duration: DurationMinutes, lang: &str) -> String {
    format!(
        r#"You are an English language level expert.

Please analyze the following English transcript from a YouTube vlog and return a JSON result with exactly these 7 fields:

{{
    "category": "the kind of video judged from the transcript (vlog / interview / documentary / etc.)",
    "keywords": ["exactly 5 English keywords, used later for keyword search"],
    "summary": "a summary written in {lang} so readers quickly grasp what the video is about",
    "duration": <video length in minutes, one decimal place>,
    "kPM": <integer words per minute, computed from duration and transcript>,
    "CEFR": "the CEFR level of the language: one of A1 / A2 / B1 / B2 / C1 / C2",
    "justification": "an explanation written in {lang} of why the video belongs to that CEFR level"
}}

Output ONLY the JSON object, nothing else.

Transcript duration: {duration} minutes

Transcript:
{text}"#
    )
}

/// Build the free-text render prompt from whatever metadata and analysis survived.
pub fn build_render_prompt(
    info: Option<&VideoInfo>,
    analysis: &Analysis,
    lang: &str,
    now: DateTime<Utc>,
) -> String {
    let record = analysis.record();
    let input = json!({
        "title": info.map(|i| i.title.as_str()),
        "channel_title": info.map(|i| i.channel_title.as_str()),
        "published_at": info.map(|i| format_time_ago(&i.published_at, now)),
        "view_count": info.map(|i| i.view_count),
        "like_count": info.map(|i| i.like_count),
        "comment_count": info.map(|i| i.comment_count),
        "duration_minutes": record.map(|r| r.duration).unwrap_or(0.0),
        "category": record.map(|r| r.category.as_str()),
        "keywords": record.map(|r| r.keywords.clone()).unwrap_or_default(),
        "summary": record.map(|r| r.summary.as_str()).unwrap_or_default(),
        "kPM": record.map(|r| r.kpm),
        "CEFR": record.map(|r| r.cefr.to_string()),
    });
    let input = serde_json::to_string_pretty(&input).unwrap_or_else(|_| input.to_string());

    format!(
        r#"Render the following video information JSON for terminal display using exactly this fixed template. Write the added commentary in {lang}.

Title: {{title}}
Summary: {{summary}}
Author: {{channel_title}}
Published: {{published_at}}
Views: {{view_count}} | 👍 {{like_count}} | 💬 {{comment_count}}
Duration: {{duration_minutes}} minutes
Category: {{category}}
Keywords: {{keywords}} (comma separated)
Speech rate: {{kPM}} WPM (add whether the pace is moderate)
Level: {{CEFR}} (add which learners it suits)

Follow the template strictly. Do not add explanations or Markdown code blocks. Fields that are null or empty should be shown as unknown.
Video information JSON:
{input}"#
    )
}

use serde::Deserialize;
use tracing::debug;

use crate::{
    config::Config,
    error::{Result, YtcefrError},
    format::watch_url,
    types::VideoInfo,
};

const SERVICE: &str = "YouTube Data API";

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    channel_title: String,
}

/// Counts arrive as decimal strings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

fn count(value: Option<&String>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Look up title, channel, publish time and counts for a video
pub async fn fetch_video_info(
    client: &reqwest::Client,
    config: &Config,
    video_id: &str,
) -> Result<VideoInfo> {
    let api_key = config.youtube_api_key()?;

    let response = client
        .get(&config.metadata_url)
        .query(&[
            ("id", video_id),
            ("part", "snippet,statistics"),
            ("key", api_key),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(YtcefrError::Upstream {
            service: SERVICE.to_string(),
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }

    let list: VideoListResponse = response.json().await?;
    let Some(item) = list.items.into_iter().next() else {
        return Err(YtcefrError::Upstream {
            service: SERVICE.to_string(),
            status: status.as_u16(),
            body: format!("no video data for {video_id}"),
        });
    };

    let info = VideoInfo {
        video_id: video_id.to_string(),
        url: watch_url(video_id),
        title: item.snippet.title,
        published_at: item.snippet.published_at,
        channel_title: item.snippet.channel_title,
        view_count: count(item.statistics.view_count.as_ref()),
        like_count: count(item.statistics.like_count.as_ref()),
        comment_count: count(item.statistics.comment_count.as_ref()),
    };

    debug!("Fetched video info: {:?}", info);
    Ok(info)
}

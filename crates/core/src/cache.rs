use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::{
    error::{Result, YtcefrError},
    format::{format_play_script, format_subtitles},
    types::SegmentedCaptions,
};

pub const PLAIN_TRANSCRIPT_FILE: &str = "transcript_plain.txt";
pub const TIMESTAMPED_TRANSCRIPT_FILE: &str = "transcript_with_time.txt";
pub const SUBTITLES_FILE: &str = "subtitles.vtt";
pub const PLAY_SCRIPT_FILE: &str = "play.sh";

/// Locations of every artifact persisted for one video id
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub video_id: String,
    pub dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(videos_dir: &Path, video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            dir: videos_dir.join(video_id),
        }
    }

    pub fn plain_transcript(&self) -> PathBuf {
        self.dir.join(PLAIN_TRANSCRIPT_FILE)
    }

    pub fn timestamped_transcript(&self) -> PathBuf {
        self.dir.join(TIMESTAMPED_TRANSCRIPT_FILE)
    }

    pub fn subtitles(&self) -> PathBuf {
        self.dir.join(SUBTITLES_FILE)
    }

    pub fn play_script(&self) -> PathBuf {
        self.dir.join(PLAY_SCRIPT_FILE)
    }

    /// Both text artifacts exist: a previous run already captioned this video
    pub fn captions_cached(&self) -> bool {
        self.plain_transcript().exists() && self.timestamped_transcript().exists()
    }
}

fn lines_with_newlines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| format!("{}\n", line.as_ref()))
        .collect()
}

/// Persist every caption-derived artifact
pub async fn save_captions(paths: &ArtifactPaths, captions: &SegmentedCaptions) -> Result<()> {
    fs::create_dir_all(&paths.dir).await?;

    fs::write(
        paths.timestamped_transcript(),
        lines_with_newlines(&captions.timestamped_log),
    )
    .await?;
    fs::write(paths.plain_transcript(), lines_with_newlines(&captions.sentences)).await?;
    fs::write(paths.subtitles(), format_subtitles(&captions.subtitles)).await?;

    let script = paths.play_script();
    fs::write(&script, format_play_script(&paths.video_id, SUBTITLES_FILE)).await?;
    make_executable(&script).await?;

    debug!("Caption artifacts written to {}", paths.dir.display());
    Ok(())
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

async fn read_artifact(path: PathBuf) -> Result<String> {
    if !path.exists() {
        return Err(YtcefrError::MissingArtifact { path });
    }
    Ok(fs::read_to_string(&path).await?)
}

/// Sentence transcript as one string, sentences separated by newlines
pub async fn load_plain_transcript(paths: &ArtifactPaths) -> Result<String> {
    let content = read_artifact(paths.plain_transcript()).await?;
    Ok(content.trim().to_string())
}

pub async fn load_timestamped_log(paths: &ArtifactPaths) -> Result<Vec<String>> {
    let content = read_artifact(paths.timestamped_transcript()).await?;
    Ok(content.lines().map(str::to_string).collect())
}

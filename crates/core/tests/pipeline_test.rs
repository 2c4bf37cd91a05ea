use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path, query_param},
};
use ytcefr_core::{
    Analysis, CaptionEntry, CaptionOutcome, CaptionSource, CefrLevel, Config, Pipeline, Provider,
    Result, Stage, YtcefrError,
};

const VIDEO_URL: &str = "https://www.youtube.com/watch?v=abc123";

struct FakeCaptions {
    entries: Vec<CaptionEntry>,
    calls: AtomicUsize,
}

impl FakeCaptions {
    fn new(entries: Vec<CaptionEntry>) -> Self {
        Self {
            entries,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptionSource for FakeCaptions {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.entries.is_empty() {
            return Err(YtcefrError::CaptionFetch {
                video_id: video_id.to_string(),
                reason: "no captions".to_string(),
            });
        }
        Ok(self.entries.clone())
    }
}

fn sample_entries() -> Vec<CaptionEntry> {
    vec![
        CaptionEntry::new(0.0, 2.0, "Hello world."),
        CaptionEntry::new(2.0, 3.0, "[Music]"),
        CaptionEntry::new(5.0, 2.0, "Bye"),
    ]
}

fn analysis_reply() -> String {
    let record = json!({
        "category": "vlog",
        "keywords": ["hello", "world", "bye", "music", "greeting"],
        "summary": "A greeting.",
        "duration": 0.1,
        "kPM": 30,
        "CEFR": "A1",
        "justification": "Very short sentences."
    });
    format!("```json\n{record}\n```")
}

fn chat_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

fn config_for(server: &MockServer, videos_dir: &std::path::Path) -> Config {
    Config {
        provider: Provider::Deepseek,
        deepseek_api_key: Some("sk-test".to_string()),
        youtube_api_key: Some("yt-test".to_string()),
        videos_dir: videos_dir.to_path_buf(),
        llm_url: Some(format!("{}/v1/chat/completions", server.uri())),
        metadata_url: format!("{}/youtube/v3/videos", server.uri()),
        ..Config::default()
    }
}

async fn mount_metadata(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("id", "abc123"))
        .and(query_param("key", "yt-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "snippet": {
                    "title": "Saying hello",
                    "publishedAt": "2024-01-01T00:00:00Z",
                    "channelTitle": "Greeter"
                },
                "statistics": { "viewCount": "1200", "likeCount": "34" }
            }]
        })))
        .mount(server)
        .await;
}

/// Analysis and render requests differ only in their system prompt
async fn mount_chat(server: &MockServer, analysis: ResponseTemplate, render: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_string_contains("CEFR level of English material"))
        .respond_with(analysis)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Render the response"))
        .respond_with(render)
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_run_produces_artifacts_record_and_card() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    mount_metadata(&server).await;
    mount_chat(
        &server,
        ResponseTemplate::new(200).set_body_json(chat_body(&analysis_reply())),
        ResponseTemplate::new(200).set_body_json(chat_body("  Title: Saying hello\n")),
    )
    .await;

    let config = config_for(&server, tmp.path());
    let captions = FakeCaptions::new(sample_entries());
    let pipeline = Pipeline::new(&config, &captions);

    let mut stages = Vec::new();
    let report = pipeline.run(VIDEO_URL, |stage| stages.push(stage)).await.unwrap();

    assert_eq!(
        stages,
        vec![Stage::Start, Stage::Captioned, Stage::Analyzed, Stage::Rendered, Stage::Done]
    );
    assert_eq!(report.video_id, "abc123");
    assert_eq!(
        report.captions,
        Some(CaptionOutcome::Fetched {
            entries: 3,
            sentences: 2
        })
    );
    assert_eq!(report.rendered, "Title: Saying hello");

    let info = report.info.expect("metadata");
    assert_eq!(info.title, "Saying hello");
    assert_eq!(info.view_count, 1200);
    assert_eq!(info.comment_count, 0);

    let record = report.analysis.record().expect("analysis record");
    assert_eq!(record.cefr, CefrLevel::A1);
    assert_eq!(record.keywords.len(), 5);

    let dir = tmp.path().join("abc123");
    let plain = std::fs::read_to_string(dir.join("transcript_plain.txt")).unwrap();
    assert_eq!(plain, "Hello world.\nBye\n");
    let timed = std::fs::read_to_string(dir.join("transcript_with_time.txt")).unwrap();
    assert_eq!(timed.lines().count(), 3);
    assert!(timed.contains("2.00s: [Music]"));
    assert!(dir.join("subtitles.vtt").exists());
    assert!(dir.join("play.sh").exists());
}

#[tokio::test]
async fn analysis_prompt_carries_duration_and_transcript() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Transcript duration: 0.08 minutes"))
        .and(body_string_contains("Hello world.\\nBye"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&analysis_reply())))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, tmp.path());
    let captions = FakeCaptions::new(sample_entries());
    let pipeline = Pipeline::new(&config, &captions);
    let paths = pipeline.paths("abc123");

    pipeline.caption(&paths).await.unwrap();
    assert!(pipeline.analyze(&paths).await.is_present());
}

#[tokio::test]
async fn second_run_uses_cached_captions() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = config_for(&server, tmp.path());
    let captions = FakeCaptions::new(sample_entries());
    let pipeline = Pipeline::new(&config, &captions);
    let paths = pipeline.paths("abc123");

    let first = pipeline.caption(&paths).await.unwrap();
    let second = pipeline.caption(&paths).await.unwrap();

    assert!(matches!(first, CaptionOutcome::Fetched { .. }));
    assert_eq!(second, CaptionOutcome::Cached);
    assert_eq!(captions.calls(), 1);
}

#[tokio::test]
async fn one_missing_artifact_triggers_refetch() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = config_for(&server, tmp.path());
    let captions = FakeCaptions::new(sample_entries());
    let pipeline = Pipeline::new(&config, &captions);
    let paths = pipeline.paths("abc123");

    pipeline.caption(&paths).await.unwrap();
    std::fs::remove_file(paths.timestamped_transcript()).unwrap();
    pipeline.caption(&paths).await.unwrap();

    assert_eq!(captions.calls(), 2);
}

#[tokio::test]
async fn duration_is_read_from_last_timestamped_line() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = config_for(&server, tmp.path());
    let captions = FakeCaptions::new(vec![
        CaptionEntry::new(0.0, 2.0, "One."),
        CaptionEntry::new(30.0, 2.0, "Two."),
        CaptionEntry::new(65.0, 2.0, "Three."),
    ]);
    let pipeline = Pipeline::new(&config, &captions);
    let paths = pipeline.paths("abc123");

    pipeline.caption(&paths).await.unwrap();
    assert_eq!(pipeline.duration(&paths).await.value(), 1.08);
}

#[tokio::test]
async fn caption_failure_degrades_to_absent_analysis() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    mount_metadata(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("CEFR level of English material"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&analysis_reply())))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Render the response"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("Title: unknown")))
        .mount(&server)
        .await;

    let config = config_for(&server, tmp.path());
    let captions = FakeCaptions::new(Vec::new());
    let pipeline = Pipeline::new(&config, &captions);

    let report = pipeline.run(VIDEO_URL, |_| {}).await.unwrap();

    assert_eq!(report.captions, None);
    assert!(matches!(report.analysis, Analysis::Absent { .. }));
    assert_eq!(report.rendered, "Title: unknown");
}

#[tokio::test]
async fn upstream_analysis_failure_is_absorbed_but_render_failure_propagates() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    mount_metadata(&server).await;
    mount_chat(
        &server,
        ResponseTemplate::new(500).set_body_string("overloaded"),
        ResponseTemplate::new(503).set_body_string("down"),
    )
    .await;

    let config = config_for(&server, tmp.path());
    let captions = FakeCaptions::new(sample_entries());
    let pipeline = Pipeline::new(&config, &captions);
    let paths = pipeline.paths("abc123");

    pipeline.caption(&paths).await.unwrap();
    let analysis = pipeline.analyze(&paths).await;
    let Analysis::Absent { reason } = &analysis else {
        panic!("expected absent analysis");
    };
    assert!(reason.contains("500"));

    let err = pipeline.run(VIDEO_URL, |_| {}).await.unwrap_err();
    assert!(matches!(err, YtcefrError::Upstream { status: 503, .. }));
}

#[tokio::test]
async fn malformed_analysis_reply_is_absent() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    mount_chat(
        &server,
        ResponseTemplate::new(200).set_body_json(chat_body("```json\n{\"category\": \n```")),
        ResponseTemplate::new(200).set_body_json(chat_body("card")),
    )
    .await;

    let config = config_for(&server, tmp.path());
    let captions = FakeCaptions::new(sample_entries());
    let pipeline = Pipeline::new(&config, &captions);
    let paths = pipeline.paths("abc123");

    pipeline.caption(&paths).await.unwrap();
    assert!(matches!(pipeline.analyze(&paths).await, Analysis::Absent { .. }));
}

#[tokio::test]
async fn missing_credentials_degrade_metadata_and_analysis() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = Config {
        deepseek_api_key: None,
        youtube_api_key: None,
        ..config_for(&server, tmp.path())
    };
    let captions = FakeCaptions::new(sample_entries());
    let pipeline = Pipeline::new(&config, &captions);
    let paths = pipeline.paths("abc123");

    pipeline.caption(&paths).await.unwrap();
    assert_eq!(pipeline.video_info("abc123").await, None);
    let Analysis::Absent { reason } = pipeline.analyze(&paths).await else {
        panic!("expected absent analysis");
    };
    assert!(reason.contains("DEEPSEEK_API_KEY"));

    let err = pipeline.run(VIDEO_URL, |_| {}).await.unwrap_err();
    assert!(matches!(err, YtcefrError::MissingCredential { .. }));
}

#[tokio::test]
async fn metadata_without_items_is_none() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let config = config_for(&server, tmp.path());
    let captions = FakeCaptions::new(sample_entries());
    let pipeline = Pipeline::new(&config, &captions);

    assert_eq!(pipeline.video_info("abc123").await, None);
}

#[tokio::test]
async fn rejected_metadata_request_still_renders() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quotaExceeded"))
        .mount(&server)
        .await;
    mount_chat(
        &server,
        ResponseTemplate::new(200).set_body_json(chat_body(&analysis_reply())),
        ResponseTemplate::new(200).set_body_json(chat_body("Title: unknown")),
    )
    .await;

    let config = config_for(&server, tmp.path());
    let captions = FakeCaptions::new(sample_entries());
    let pipeline = Pipeline::new(&config, &captions);

    assert_eq!(pipeline.video_info("abc123").await, None);

    let report = pipeline.run(VIDEO_URL, |_| {}).await.unwrap();
    assert_eq!(report.info, None);
    assert!(report.analysis.is_present());
    assert_eq!(report.rendered, "Title: unknown");
}

#[tokio::test]
async fn invalid_url_is_rejected_before_any_stage() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = config_for(&server, tmp.path());
    let captions = FakeCaptions::new(sample_entries());
    let pipeline = Pipeline::new(&config, &captions);

    let mut stages = Vec::new();
    let err = pipeline
        .run("https://www.youtube.com/feed", |stage| stages.push(stage))
        .await
        .unwrap_err();

    assert!(matches!(err, YtcefrError::InvalidVideoUrl { .. }));
    assert!(stages.is_empty());
    assert_eq!(captions.calls(), 0);
}

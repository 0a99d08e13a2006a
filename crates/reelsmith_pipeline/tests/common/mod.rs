//! Mock backends and an orchestrator harness for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use reelsmith_error::{JobError, JobErrorKind, ProviderError, ProviderErrorKind, ReelsmithResult};
use reelsmith_interface::{
    CancellationToken, ClipInput, GeneratedMedia, ImageGenerator, ImageRequest, MediaAssembler,
    SpeechOutput, SpeechRequest, SpeechSynthesizer, TextGenerator, TextRequest, TextResponse,
    VideoGenerator, VideoRequest,
};
use reelsmith_models::ProviderSet;
use reelsmith_pipeline::{InMemoryPipelineRepository, Orchestrator, OrchestratorBuilder};
use reelsmith_safety::{ContentFilter, ContentFilterConfig, TtsCleaner, TtsCleanerConfig};
use reelsmith_storage::FileSystemStorage;
use reelsmith_text::estimate_word_timings;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Two-shot script in a markdown fence. Shot 2's video prompt is `FAIL_VIDEO`
/// so a failing video backend can target it.
pub const TWO_SHOT_SCRIPT: &str = r#"Here you go:
```json
{
  "chapter_info": {"title": "The Flood", "summary": "The river rises."},
  "characters": [{"name": "Mei", "description": "girl in a red coat"}],
  "scenes": [
    {
      "scene_number": 1,
      "description": "Dawn at the river",
      "shots": [
        {"shot_number": 1, "narration": "河水在黎明上涨。", "image_prompt": "river at dawn", "video_prompt": "slow pan", "duration": 4},
        {"shot_number": 2, "narration": "村民们逃往高处（慌张地）。", "image_prompt": "villagers on a hill", "video_prompt": "FAIL_VIDEO"}
      ]
    }
  ]
}
```"#;

/// Text generator returning a fixed response.
#[derive(Debug)]
pub struct ScriptedText {
    pub response: Mutex<String>,
    pub calls: Mutex<usize>,
}

impl ScriptedText {
    pub fn new(response: &str) -> Self {
        Self {
            response: Mutex::new(response.to_string()),
            calls: Mutex::new(0),
        }
    }

    pub fn set_response(&self, response: &str) {
        *self.response.lock().unwrap() = response.to_string();
    }
}

#[async_trait]
impl TextGenerator for ScriptedText {
    async fn generate_text(&self, _request: &TextRequest) -> ReelsmithResult<TextResponse> {
        *self.calls.lock().unwrap() += 1;
        Ok(TextResponse {
            text: self.response.lock().unwrap().clone(),
            usage: None,
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-1"
    }
}

/// Image generator producing a tiny PNG-ish payload, optionally slow.
#[derive(Debug, Default)]
pub struct MockImage {
    pub delay: Option<Duration>,
    pub requests: Mutex<Vec<ImageRequest>>,
}

#[async_trait]
impl ImageGenerator for MockImage {
    async fn generate_image(
        &self,
        request: &ImageRequest,
        _cancel: &CancellationToken,
    ) -> ReelsmithResult<GeneratedMedia> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(GeneratedMedia::new(
            format!("png:{}", request.prompt).into_bytes(),
            "image/png",
        ))
    }

    fn provider_name(&self) -> &'static str {
        "mock_image"
    }
}

/// Speech synthesizer with estimated word timings over 2 seconds.
#[derive(Debug, Default)]
pub struct MockSpeech {
    pub texts: Mutex<Vec<String>>,
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    async fn synthesize(&self, request: &SpeechRequest) -> ReelsmithResult<SpeechOutput> {
        self.texts.lock().unwrap().push(request.text.clone());
        Ok(SpeechOutput {
            audio: format!("mp3:{}", request.text).into_bytes(),
            mime_type: "audio/mpeg".to_string(),
            duration_secs: 2.4,
            word_timings: estimate_word_timings(&request.text, 2.4),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock_speech"
    }
}

/// Video generator that fails any request whose prompt contains `fail_on`
/// and reports a job timeout for prompts containing `time_out_on`.
#[derive(Debug, Default)]
pub struct MockVideo {
    pub fail_on: Option<String>,
    pub time_out_on: Option<String>,
    pub delay: Option<Duration>,
    pub requests: Mutex<Vec<VideoRequest>>,
}

#[async_trait]
impl VideoGenerator for MockVideo {
    async fn generate_video(
        &self,
        request: &VideoRequest,
        _cancel: &CancellationToken,
    ) -> ReelsmithResult<GeneratedMedia> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(marker) = &self.time_out_on
            && request.prompt.contains(marker.as_str())
        {
            return Err(JobError::new(JobErrorKind::Timeout {
                job_id: "cgt-slow".to_string(),
                waited_secs: 1800,
            })
            .into());
        }
        if let Some(marker) = &self.fail_on
            && request.prompt.contains(marker.as_str())
        {
            return Err(ProviderError::new(ProviderErrorKind::Api {
                status_code: 500,
                message: "render node crashed".to_string(),
            })
            .into());
        }
        Ok(GeneratedMedia::new(
            format!("mp4:{}:{}", request.prompt, request.duration_secs).into_bytes(),
            "video/mp4",
        ))
    }

    fn provider_name(&self) -> &'static str {
        "mock_video"
    }
}

/// Assembler that records its input instead of running ffmpeg.
#[derive(Debug, Default)]
pub struct RecordingAssembler {
    pub calls: Mutex<Vec<Vec<ClipInput>>>,
}

#[async_trait]
impl MediaAssembler for RecordingAssembler {
    async fn assemble(&self, clips: &[ClipInput]) -> ReelsmithResult<Vec<u8>> {
        self.calls.lock().unwrap().push(clips.to_vec());
        Ok(format!("final:{}", clips.len()).into_bytes())
    }
}

pub struct Harness {
    pub orchestrator: Orchestrator,
    pub repository: InMemoryPipelineRepository,
    pub text: Arc<ScriptedText>,
    pub image: Arc<MockImage>,
    pub speech: Arc<MockSpeech>,
    pub video: Arc<MockVideo>,
    pub assembler: Arc<RecordingAssembler>,
    _media_dir: TempDir,
}

pub fn harness(script: &str, image: MockImage, video: MockVideo) -> Harness {
    let media_dir = TempDir::new().unwrap();
    let repository = InMemoryPipelineRepository::new();
    let text = Arc::new(ScriptedText::new(script));
    let image = Arc::new(image);
    let speech = Arc::new(MockSpeech::default());
    let video = Arc::new(video);
    let assembler = Arc::new(RecordingAssembler::default());

    let providers = ProviderSet {
        text: text.clone(),
        image: image.clone(),
        speech: speech.clone(),
        video: video.clone(),
    };
    let orchestrator = OrchestratorBuilder::default()
        .providers(providers)
        .repository(Arc::new(repository.clone()))
        .storage(Arc::new(FileSystemStorage::new(media_dir.path()).unwrap()))
        .assembler(assembler.clone())
        .content_filter(Arc::new(
            ContentFilter::new(ContentFilterConfig::default()).unwrap(),
        ))
        .tts_cleaner(Arc::new(TtsCleaner::new(TtsCleanerConfig::default()).unwrap()))
        .build()
        .unwrap();

    Harness {
        orchestrator,
        repository,
        text,
        image,
        speech,
        video,
        assembler,
        _media_dir: media_dir,
    }
}

/// Import one chapter and generate its first narration. Returns the chapter id.
pub async fn narrated_chapter(harness: &Harness) -> String {
    let (_, chapters) = harness
        .orchestrator
        .import_document("The Flood", "河水在黎明上涨。村民们逃往高处。\n", 1)
        .await
        .unwrap();
    let chapter_id = chapters[0].id().clone();
    harness
        .orchestrator
        .generate_narration(&chapter_id)
        .await
        .unwrap();
    chapter_id
}

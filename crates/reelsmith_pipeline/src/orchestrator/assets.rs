//! Per-shot asset generation: images, audio, subtitles and video clips.
//!
//! Each operation first creates one pending record per shot of the current
//! narration (all at the next version), then generates with a bounded
//! fan-out. A failure only fails its own record.

use super::{AssetBatch, BatchOutcome, Orchestrator, TriggerReceipt};
use futures::stream::{self, StreamExt};
use reelsmith_core::{
    Artifact, ArtifactDetails, MediaReference, MediaType, RecordStatus, Shot, VersionKind,
    VideoType,
};
use reelsmith_error::{
    PipelineError, PipelineErrorKind, ReelsmithError, ReelsmithErrorKind, ReelsmithResult,
    RepositoryErrorKind,
};
use reelsmith_interface::{
    ArtifactFilter, CancellationToken, ImageRequest, SpeechRequest, VideoRequest,
};
use reelsmith_models::data_url;
use reelsmith_storage::MediaMetadata;
use reelsmith_text::{build_char_timings, build_subtitle_cues, render_srt};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

const SUBTITLE_MIME: &str = "application/x-subrip";

/// Inputs resolved once per operation.
#[derive(Debug, Clone)]
enum AssetPlan {
    Image,
    Audio,
    Subtitle {
        audio_version: u32,
        audio: HashMap<String, Artifact>,
    },
    Video {
        image_version: u32,
        images: HashMap<String, Artifact>,
    },
}

impl AssetPlan {
    fn kind(&self) -> VersionKind {
        match self {
            AssetPlan::Image => VersionKind::Image,
            AssetPlan::Audio => VersionKind::Audio,
            AssetPlan::Subtitle { .. } => VersionKind::Subtitle,
            AssetPlan::Video { .. } => VersionKind::Video,
        }
    }
}

#[derive(Debug, Clone)]
struct ShotJob {
    shot: Shot,
    artifact: Artifact,
}

/// Records created and ready to generate.
#[derive(Debug)]
struct PreparedBatch {
    version: u32,
    plan: AssetPlan,
    jobs: Vec<ShotJob>,
}

impl PreparedBatch {
    fn artifact_ids(&self) -> Vec<String> {
        self.jobs.iter().map(|j| j.artifact.id.clone()).collect()
    }
}

/// Completed usable records of one version, keyed by shot id.
fn by_shot(artifacts: Vec<Artifact>) -> HashMap<String, Artifact> {
    artifacts
        .into_iter()
        .filter(Artifact::is_usable)
        .filter_map(|a| a.shot_id.clone().map(|id| (id, a)))
        .collect()
}

/// Message stored on a failed record.
fn failure_message(error: &ReelsmithError) -> String {
    if error.is_cancelled() {
        "cancelled".to_string()
    } else if error.is_timeout() {
        format!("timed out: {}", error)
    } else {
        error.to_string()
    }
}

fn is_status_conflict(error: &ReelsmithError) -> bool {
    matches!(
        error.kind(),
        ReelsmithErrorKind::Repository(e)
            if matches!(e.kind, RepositoryErrorKind::StatusConflict { .. })
    )
}

fn missing(message: String) -> ReelsmithError {
    PipelineError::new(PipelineErrorKind::MissingPrerequisite(message)).into()
}

/// Clip length: audio duration rounded up, else the shot hint, else the
/// default, clamped to what the video backend accepts.
pub(crate) fn clip_duration(
    audio_secs: Option<f64>,
    hint_secs: Option<f64>,
    default_secs: u32,
    max_secs: u32,
) -> u32 {
    let max_secs = max_secs.max(1);
    let secs = audio_secs
        .filter(|d| d.is_finite() && *d > 0.0)
        .or(hint_secs.filter(|d| d.is_finite() && *d > 0.0))
        .map(|d| d.ceil().min(u32::MAX as f64) as u32)
        .unwrap_or(default_secs);
    secs.clamp(1, max_secs)
}

impl Orchestrator {
    /// Generate one image per shot of the current narration.
    pub async fn generate_images(
        &self,
        chapter_id: &str,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<AssetBatch> {
        let prepared = self.prepare(chapter_id, VersionKind::Image).await?;
        Ok(self.execute(prepared, cancel).await)
    }

    /// Synthesize narration audio per shot.
    pub async fn generate_audio(
        &self,
        chapter_id: &str,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<AssetBatch> {
        let prepared = self.prepare(chapter_id, VersionKind::Audio).await?;
        Ok(self.execute(prepared, cancel).await)
    }

    /// Build SRT subtitles per shot from the current audio version.
    ///
    /// # Errors
    ///
    /// Fails before writing anything if no audio version exists.
    pub async fn generate_subtitles(
        &self,
        chapter_id: &str,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<AssetBatch> {
        let prepared = self.prepare(chapter_id, VersionKind::Subtitle).await?;
        Ok(self.execute(prepared, cancel).await)
    }

    /// Generate a clip per shot from the current image version.
    ///
    /// # Errors
    ///
    /// Fails before writing anything if no image version exists.
    pub async fn generate_videos(
        &self,
        chapter_id: &str,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<AssetBatch> {
        let prepared = self.prepare(chapter_id, VersionKind::Video).await?;
        Ok(self.execute(prepared, cancel).await)
    }

    /// Create pending image records and generate them in the background.
    pub async fn trigger_images(
        &self,
        chapter_id: &str,
        cancel: CancellationToken,
    ) -> ReelsmithResult<TriggerReceipt> {
        self.trigger(chapter_id, VersionKind::Image, cancel).await
    }

    /// Create pending audio records and generate them in the background.
    pub async fn trigger_audio(
        &self,
        chapter_id: &str,
        cancel: CancellationToken,
    ) -> ReelsmithResult<TriggerReceipt> {
        self.trigger(chapter_id, VersionKind::Audio, cancel).await
    }

    /// Create pending subtitle records and generate them in the background.
    pub async fn trigger_subtitles(
        &self,
        chapter_id: &str,
        cancel: CancellationToken,
    ) -> ReelsmithResult<TriggerReceipt> {
        self.trigger(chapter_id, VersionKind::Subtitle, cancel).await
    }

    /// Create pending video records and generate them in the background.
    pub async fn trigger_videos(
        &self,
        chapter_id: &str,
        cancel: CancellationToken,
    ) -> ReelsmithResult<TriggerReceipt> {
        self.trigger(chapter_id, VersionKind::Video, cancel).await
    }

    async fn trigger(
        &self,
        chapter_id: &str,
        kind: VersionKind,
        cancel: CancellationToken,
    ) -> ReelsmithResult<TriggerReceipt> {
        let prepared = self.prepare(chapter_id, kind).await?;
        let version = prepared.version;
        let artifact_ids = prepared.artifact_ids();
        let this = self.clone();
        let task = tokio::spawn(async move { this.execute(prepared, &cancel).await });
        info!(%kind, version, records = artifact_ids.len(), "Generation triggered");
        Ok(TriggerReceipt::new(kind, version, artifact_ids, task))
    }

    /// Resolve inputs and create the pending records.
    #[instrument(skip(self))]
    async fn prepare(&self, chapter_id: &str, kind: VersionKind) -> ReelsmithResult<PreparedBatch> {
        let narration = self.current_narration(chapter_id).await?;
        let shots = self.repository.list_shots(&narration.id).await?;
        if shots.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::Validation(format!(
                "narration {} has no shots",
                narration.id
            )))
            .into());
        }

        let (plan, audio) = match kind {
            VersionKind::Image => (AssetPlan::Image, HashMap::new()),
            VersionKind::Audio => (AssetPlan::Audio, HashMap::new()),
            VersionKind::Subtitle => {
                let audio_version = self.require_version(chapter_id, VersionKind::Audio).await?;
                let audio = self.completed_by_shot(chapter_id, VersionKind::Audio, audio_version).await?;
                (
                    AssetPlan::Subtitle {
                        audio_version,
                        audio,
                    },
                    HashMap::new(),
                )
            }
            VersionKind::Video => {
                let image_version = self.require_version(chapter_id, VersionKind::Image).await?;
                let images = self.completed_by_shot(chapter_id, VersionKind::Image, image_version).await?;
                // Audio is optional; it only sets clip length.
                let audio = match self.resolve_version(chapter_id, VersionKind::Audio).await? {
                    Some(version) => {
                        self.completed_by_shot(chapter_id, VersionKind::Audio, version)
                            .await?
                    }
                    None => HashMap::new(),
                };
                (
                    AssetPlan::Video {
                        image_version,
                        images,
                    },
                    audio,
                )
            }
            VersionKind::Narration | VersionKind::FinalVideo => {
                return Err(PipelineError::new(PipelineErrorKind::Validation(format!(
                    "{} is not a per-shot asset",
                    kind
                )))
                .into());
            }
        };

        let max_video_secs = self.providers.video.max_duration_secs();
        let pending: Vec<Artifact> = shots
            .iter()
            .map(|shot| {
                let details = match &plan {
                    AssetPlan::Image => ArtifactDetails::Image {
                        prompt: shot.image_prompt.clone(),
                    },
                    AssetPlan::Audio => ArtifactDetails::Audio {
                        text: self.tts_cleaner.clean(&shot.narration),
                        duration_secs: None,
                        char_timings: Vec::new(),
                    },
                    AssetPlan::Subtitle { audio_version, .. } => ArtifactDetails::Subtitle {
                        audio_version: *audio_version,
                        cue_count: 0,
                    },
                    AssetPlan::Video { image_version, .. } => {
                        let audio_secs = audio.get(&shot.id).and_then(|a| match &a.details {
                            ArtifactDetails::Audio { duration_secs, .. } => *duration_secs,
                            _ => None,
                        });
                        ArtifactDetails::Video {
                            prompt: shot.video_prompt.clone(),
                            duration_secs: clip_duration(
                                audio_secs,
                                shot.duration_hint,
                                self.settings.default_video_secs,
                                max_video_secs,
                            ),
                            video_type: VideoType::PerShot,
                            image_version: Some(*image_version),
                            source_video_version: None,
                        }
                    }
                };
                Artifact::pending(
                    chapter_id,
                    &narration.id,
                    Some(shot.id.clone()),
                    shot.index,
                    details,
                )
            })
            .collect();

        let created = self
            .repository
            .create_artifacts(chapter_id, plan.kind(), pending)
            .await?;
        let version = created.first().map_or(0, |a| a.version);
        let jobs = shots
            .into_iter()
            .zip(created)
            .map(|(shot, artifact)| ShotJob { shot, artifact })
            .collect();

        debug!(%kind, version, "Pending records created");
        Ok(PreparedBatch {
            version,
            plan,
            jobs,
        })
    }

    async fn completed_by_shot(
        &self,
        chapter_id: &str,
        kind: VersionKind,
        version: u32,
    ) -> ReelsmithResult<HashMap<String, Artifact>> {
        let records = self
            .repository
            .list_artifacts(&ArtifactFilter::for_chapter(chapter_id, kind).version(version))
            .await?;
        Ok(by_shot(records))
    }

    /// Generate every job with bounded concurrency and record each result.
    async fn execute(&self, prepared: PreparedBatch, cancel: &CancellationToken) -> AssetBatch {
        let PreparedBatch {
            version,
            plan,
            jobs,
        } = prepared;
        let kind = plan.kind();

        let results: Vec<(String, Result<(), String>)> = stream::iter(jobs)
            .map(|job| self.run_job(&plan, job, cancel))
            .buffer_unordered(self.settings.max_concurrency)
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        for (id, result) in results {
            match result {
                Ok(()) => outcome.succeed(id),
                Err(message) => outcome.fail(id, message),
            }
        }
        info!(
            %kind,
            version,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Asset batch finished"
        );
        AssetBatch::new(kind, version, outcome)
    }

    async fn run_job(
        &self,
        plan: &AssetPlan,
        job: ShotJob,
        cancel: &CancellationToken,
    ) -> (String, Result<(), String>) {
        let id = job.artifact.id.clone();
        let result: ReelsmithResult<(MediaReference, ArtifactDetails)> = if cancel.is_cancelled() {
            Err(PipelineError::new(PipelineErrorKind::Cancelled).into())
        } else {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(PipelineError::new(PipelineErrorKind::Cancelled).into()),
                result = self.generate_one(plan, &job, cancel) => result,
            }
        };
        let recorded = self.record_result(&id, result).await;
        (id, recorded)
    }

    /// Persist one result; returns the failure message when the record failed.
    async fn record_result(
        &self,
        id: &str,
        result: ReelsmithResult<(MediaReference, ArtifactDetails)>,
    ) -> Result<(), String> {
        let message = match result {
            Ok((media, details)) => match self.repository.complete_artifact(id, media, details).await {
                Ok(_) => return Ok(()),
                Err(e) => e.to_string(),
            },
            // Another runner owns the record; leave it alone.
            Err(e) if is_status_conflict(&e) => {
                warn!(artifact_id = %id, error = %e, "Artifact already claimed");
                return Err(e.to_string());
            }
            Err(e) => failure_message(&e),
        };
        warn!(artifact_id = %id, error = %message, "Artifact failed");
        if let Err(e) = self.repository.fail_artifact(id, &message).await {
            warn!(artifact_id = %id, error = %e, "Could not mark artifact failed");
        }
        Err(message)
    }

    #[instrument(skip(self, plan, job, cancel), fields(artifact_id = %job.artifact.id, shot = job.shot.index))]
    async fn generate_one(
        &self,
        plan: &AssetPlan,
        job: &ShotJob,
        cancel: &CancellationToken,
    ) -> ReelsmithResult<(MediaReference, ArtifactDetails)> {
        let ShotJob { shot, artifact } = job;
        match plan {
            AssetPlan::Image => {
                let request = ImageRequest {
                    prompt: shot.image_prompt.clone(),
                    filename_hint: filename_hint(shot),
                };
                let image = self.providers.image.generate_image(&request, cancel).await?;
                let media = self
                    .storage
                    .store(
                        &image.data,
                        &MediaMetadata::new(MediaType::Image, image.mime_type),
                    )
                    .await?;
                Ok((media, artifact.details.clone()))
            }
            AssetPlan::Audio => {
                let text = match &artifact.details {
                    ArtifactDetails::Audio { text, .. } => text.clone(),
                    _ => self.tts_cleaner.clean(&shot.narration),
                };
                let output = self
                    .providers
                    .speech
                    .synthesize(&SpeechRequest {
                        text: text.clone(),
                        speed_ratio: self.settings.speed_ratio,
                    })
                    .await?;
                let char_timings = build_char_timings(&output.word_timings);
                let metadata = MediaMetadata::new(MediaType::Audio, output.mime_type)
                    .with_duration(output.duration_secs);
                let media = self.storage.store(&output.audio, &metadata).await?;
                Ok((
                    media,
                    ArtifactDetails::Audio {
                        text,
                        duration_secs: Some(output.duration_secs),
                        char_timings,
                    },
                ))
            }
            AssetPlan::Subtitle {
                audio_version,
                audio,
            } => {
                let source = audio.get(&shot.id).ok_or_else(|| {
                    missing(format!("no completed audio for shot {}", shot.index))
                })?;
                let ArtifactDetails::Audio {
                    text,
                    duration_secs,
                    char_timings,
                } = &source.details
                else {
                    return Err(missing(format!("audio record {} has no timings", source.id)));
                };
                let cues = build_subtitle_cues(
                    text,
                    char_timings,
                    *duration_secs,
                    &self.settings.subtitle,
                );
                if cues.is_empty() {
                    return Err(missing(format!(
                        "audio for shot {} has no timings to align",
                        shot.index
                    )));
                }
                let srt = render_srt(&cues);
                let mut metadata = MediaMetadata::new(MediaType::Subtitle, SUBTITLE_MIME);
                if let Some(duration) = duration_secs {
                    metadata = metadata.with_duration(*duration);
                }
                let media = self.storage.store(srt.as_bytes(), &metadata).await?;
                Ok((
                    media,
                    ArtifactDetails::Subtitle {
                        audio_version: *audio_version,
                        cue_count: cues.len(),
                    },
                ))
            }
            AssetPlan::Video { images, .. } => {
                // Claim the record; a second runner sees the conflict and stops.
                self.repository
                    .transition_status(&artifact.id, RecordStatus::Pending, RecordStatus::Processing)
                    .await?;

                let image = images.get(&shot.id).ok_or_else(|| {
                    missing(format!("no completed image for shot {}", shot.index))
                })?;
                let image_media = image.media.as_ref().ok_or_else(|| {
                    missing(format!("image record {} has no media", image.id))
                })?;
                let bytes = self.storage.retrieve(image_media).await?;

                let (prompt, duration_secs) = match &artifact.details {
                    ArtifactDetails::Video {
                        prompt,
                        duration_secs,
                        ..
                    } => (prompt.clone(), *duration_secs),
                    _ => (
                        shot.video_prompt.clone(),
                        self.settings.default_video_secs,
                    ),
                };
                let request = VideoRequest {
                    image_data_url: data_url(&bytes, &image_media.mime_type),
                    duration_secs,
                    prompt,
                };
                let video = self.providers.video.generate_video(&request, cancel).await?;
                let metadata = MediaMetadata::new(MediaType::Video, video.mime_type)
                    .with_duration(f64::from(duration_secs));
                let media = self.storage.store(&video.data, &metadata).await?;
                Ok((media, artifact.details.clone()))
            }
        }
    }
}

/// Filename prefix for job-based renderers: chapter prefix plus shot index.
fn filename_hint(shot: &Shot) -> String {
    let chapter: String = shot
        .chapter_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .collect();
    format!("reelsmith_{}_shot{:03}", chapter, shot.index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_duration_prefers_audio() {
        assert_eq!(clip_duration(Some(3.2), Some(8.0), 5, 12), 4);
        assert_eq!(clip_duration(None, Some(8.0), 5, 12), 8);
        assert_eq!(clip_duration(None, None, 5, 12), 5);
    }

    #[test]
    fn test_clip_duration_clamped() {
        assert_eq!(clip_duration(Some(30.0), None, 5, 12), 12);
        assert_eq!(clip_duration(Some(0.2), None, 5, 12), 1);
        assert_eq!(clip_duration(Some(f64::NAN), Some(-1.0), 0, 12), 1);
    }

    #[test]
    fn test_filename_hint() {
        let shot = reelsmith_core::ShotBuilder::default()
            .scene_id("s")
            .narration_id("n")
            .chapter_id("3f2a-91bc-77de")
            .sequence(1u32)
            .index(7u32)
            .narration("x")
            .image_prompt("x")
            .video_prompt("x")
            .build()
            .unwrap();
        assert_eq!(filename_hint(&shot), "reelsmith_3f2a91bc_shot007");
    }
}

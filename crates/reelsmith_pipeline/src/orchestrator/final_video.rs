//! Chapter-level final video assembly.

use super::Orchestrator;
use reelsmith_core::{
    Artifact, ArtifactDetails, MediaReference, MediaType, VersionKind, VideoType,
};
use reelsmith_error::{PipelineError, PipelineErrorKind, ReelsmithResult};
use reelsmith_interface::{ArtifactFilter, ClipInput};
use reelsmith_storage::MediaMetadata;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

const FINAL_MIME: &str = "video/mp4";

impl Orchestrator {
    fn local_path(&self, media: &MediaReference) -> ReelsmithResult<PathBuf> {
        self.storage.local_path(media).ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::MissingPrerequisite(format!(
                "media {} has no local file for assembly",
                media.id
            )))
            .into()
        })
    }

    /// Concatenate the current per-shot video version into a final video.
    ///
    /// Every shot of the narration the clips were generated for must have a
    /// completed clip; otherwise nothing is written. Narration audio from the
    /// current audio version is laid over each clip when available.
    ///
    /// # Errors
    ///
    /// `NoVersion` without completed clips, `MissingNarrationVideos` when
    /// any shot lacks one, and assembly or storage failures (the final
    /// record is then marked failed).
    #[instrument(skip(self))]
    pub async fn generate_final_video_for_chapter(
        &self,
        chapter_id: &str,
    ) -> ReelsmithResult<Artifact> {
        let video_version = self.require_version(chapter_id, VersionKind::Video).await?;
        let clips = self
            .repository
            .list_artifacts(&ArtifactFilter::for_chapter(chapter_id, VersionKind::Video).version(video_version))
            .await?;
        let Some(narration_id) = clips.first().map(|a| a.narration_id.clone()) else {
            return Err(PipelineError::new(PipelineErrorKind::NoVersion {
                kind: VersionKind::Video.to_string(),
                chapter_id: chapter_id.to_string(),
            })
            .into());
        };
        let shots = self.repository.list_shots(&narration_id).await?;

        let completed: HashMap<&str, &Artifact> = clips
            .iter()
            .filter(|a| a.is_usable())
            .filter_map(|a| a.shot_id.as_deref().map(|id| (id, a)))
            .collect();
        let missing: Vec<String> = shots
            .iter()
            .filter(|s| !completed.contains_key(s.id.as_str()))
            .map(|s| s.index.to_string())
            .collect();
        if shots.is_empty() || !missing.is_empty() {
            warn!(missing = ?missing, "Shots without completed video");
            return Err(PipelineError::new(PipelineErrorKind::MissingNarrationVideos(
                if missing.is_empty() {
                    "narration has no shots".to_string()
                } else {
                    missing.join(", ")
                },
            ))
            .into());
        }

        let audio: HashMap<String, Artifact> =
            match self.resolve_version(chapter_id, VersionKind::Audio).await? {
                Some(version) => self
                    .repository
                    .list_artifacts(
                        &ArtifactFilter::for_chapter(chapter_id, VersionKind::Audio)
                            .version(version)
                            .narration(&narration_id),
                    )
                    .await?
                    .into_iter()
                    .filter(Artifact::is_usable)
                    .filter_map(|a| a.shot_id.clone().map(|id| (id, a)))
                    .collect(),
                None => HashMap::new(),
            };

        let mut inputs = Vec::with_capacity(shots.len());
        let mut total_secs = 0u32;
        for shot in &shots {
            let Some(clip) = completed.get(shot.id.as_str()) else {
                continue;
            };
            let Some(media) = clip.media.as_ref() else {
                continue;
            };
            if let ArtifactDetails::Video { duration_secs, .. } = &clip.details {
                total_secs += duration_secs;
            }
            let audio_path = match audio.get(&shot.id).and_then(|a| a.media.as_ref()) {
                Some(audio_media) => Some(self.local_path(audio_media)?),
                None => None,
            };
            inputs.push(ClipInput {
                video: self.local_path(media)?,
                audio: audio_path,
            });
        }

        let pending = Artifact::pending(
            chapter_id,
            &narration_id,
            None,
            0,
            ArtifactDetails::Video {
                prompt: String::new(),
                duration_secs: total_secs,
                video_type: VideoType::Final,
                image_version: None,
                source_video_version: Some(video_version),
            },
        );
        let created = self
            .repository
            .create_artifacts(chapter_id, VersionKind::FinalVideo, vec![pending])
            .await?;
        let Some(record) = created.into_iter().next() else {
            return Err(PipelineError::new(PipelineErrorKind::Validation(
                "final video record was not created".to_string(),
            ))
            .into());
        };

        let stored = match self.assembler.assemble(&inputs).await {
            Ok(bytes) => {
                let metadata = MediaMetadata::new(MediaType::Video, FINAL_MIME)
                    .with_duration(f64::from(total_secs));
                self.storage.store(&bytes, &metadata).await
            }
            Err(e) => Err(e),
        };
        let media = match stored {
            Ok(media) => media,
            Err(e) => {
                if let Err(mark) = self.repository.fail_artifact(&record.id, &e.to_string()).await {
                    warn!(error = %mark, "Could not mark final video failed");
                }
                return Err(e);
            }
        };

        let finished = self
            .repository
            .complete_artifact(&record.id, media, record.details.clone())
            .await?;
        info!(
            artifact_id = %finished.id,
            version = finished.version,
            clips = inputs.len(),
            "Final video stored"
        );
        Ok(finished)
    }
}

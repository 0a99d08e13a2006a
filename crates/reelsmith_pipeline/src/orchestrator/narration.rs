//! Narration generation: prompt, parse, validate, filter, persist.

use super::{BatchOutcome, Orchestrator};
use crate::{narration_request, parse_json};
use futures::stream::{self, StreamExt};
use reelsmith_core::{Chapter, Narration, NarrationScript, Scene, ShotBuilder, VersionKind};
use reelsmith_error::{PipelineError, PipelineErrorKind, ReelsmithError, ReelsmithResult};
use reelsmith_interface::NarrationBatch;
use reelsmith_safety::ContentFilter;
use tracing::{debug, info, instrument, warn};

fn invalid(message: impl Into<String>) -> ReelsmithError {
    PipelineError::new(PipelineErrorKind::Validation(message.into())).into()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Turn a parsed script into narration, scene and shot records.
///
/// Rejects scripts with no scenes, a scene without shots, or a shot whose
/// narration is empty (before or after filtering). Narration text passes
/// through `filter`; flagged terms are kept on the shot. Missing image
/// prompts fall back to the narration, missing video prompts to the image
/// prompt.
///
/// # Errors
///
/// Returns a validation error describing the first problem found.
pub fn build_narration_batch(
    chapter: &Chapter,
    prompt: &str,
    raw_response: &str,
    script: NarrationScript,
    filter: &ContentFilter,
) -> ReelsmithResult<NarrationBatch> {
    let NarrationScript {
        chapter_info,
        characters,
        scenes,
    } = script;
    let scenes = scenes.ok_or_else(|| invalid("narration script has no scenes"))?;
    if scenes.is_empty() {
        return Err(invalid("narration script has an empty scene list"));
    }

    let mut narration = Narration::new(chapter.id(), prompt);
    narration.raw_response = raw_response.to_string();
    narration.chapter_info = chapter_info;
    narration.characters = characters;

    let mut scene_records = Vec::with_capacity(scenes.len());
    let mut shot_records = Vec::new();
    let mut index = 0u32;

    for (scene_pos, scene) in scenes.into_iter().enumerate() {
        let scene_sequence = scene_pos as u32 + 1;
        let label = scene
            .scene_number
            .clone()
            .unwrap_or_else(|| scene_sequence.to_string());
        let shots = scene
            .shots
            .filter(|shots| !shots.is_empty())
            .ok_or_else(|| invalid(format!("scene {} has no shots", label)))?;

        let mut scene_record = Scene::new(&narration.id, chapter.id(), &label, scene_sequence);
        scene_record.description = non_empty(scene.description);

        for (shot_pos, shot) in shots.into_iter().enumerate() {
            let shot_sequence = shot_pos as u32 + 1;
            let raw_text = non_empty(shot.narration).ok_or_else(|| {
                invalid(format!(
                    "scene {} shot {} has empty narration",
                    label, shot_sequence
                ))
            })?;
            let filtered = filter.filter(&raw_text);
            if filtered.text.is_empty() {
                return Err(invalid(format!(
                    "scene {} shot {} has no narration left after filtering",
                    label, shot_sequence
                )));
            }
            if !filtered.flagged.is_empty() {
                warn!(scene = %label, shot = shot_sequence, terms = ?filtered.flagged, "Narration flagged");
            }

            index += 1;
            let image_prompt =
                non_empty(shot.image_prompt).unwrap_or_else(|| filtered.text.clone());
            let video_prompt =
                non_empty(shot.video_prompt).unwrap_or_else(|| image_prompt.clone());
            let shot_record = ShotBuilder::default()
                .scene_id(scene_record.id.clone())
                .narration_id(narration.id.clone())
                .chapter_id(chapter.id().clone())
                .sequence(shot_sequence)
                .index(index)
                .narration(filtered.text)
                .image_prompt(image_prompt)
                .video_prompt(video_prompt)
                .camera_movement(non_empty(shot.camera_movement))
                .duration_hint(shot.duration.filter(|d| d.is_finite() && *d > 0.0))
                .content_flags(filtered.flagged)
                .build()
                .map_err(|e| invalid(format!("shot record incomplete: {}", e)))?;
            shot_records.push(shot_record);
        }
        scene_records.push(scene_record);
    }

    Ok(NarrationBatch {
        narration,
        scenes: scene_records,
        shots: shot_records,
    })
}

impl Orchestrator {
    /// Generate a new narration version for a chapter.
    ///
    /// Nothing is written unless the script validates.
    ///
    /// # Errors
    ///
    /// Provider errors, unparseable responses and invalid scripts.
    #[instrument(skip(self))]
    pub async fn generate_narration(&self, chapter_id: &str) -> ReelsmithResult<Narration> {
        let chapter = self.repository.get_chapter(chapter_id).await?;
        let request = narration_request(chapter.text());

        let response = self.providers.text.generate_text(&request).await?;
        debug!(
            response_len = response.text.len(),
            usage = ?response.usage,
            "Narration response received"
        );

        let script: NarrationScript = parse_json(&response.text)?;
        let batch = build_narration_batch(
            &chapter,
            &request.prompt,
            &response.text,
            script,
            &self.content_filter,
        )?;
        let shots = batch.shots.len();
        let narration = self.repository.create_narration_batch(batch).await?;

        info!(
            narration_id = %narration.id,
            version = narration.version,
            shots,
            "Narration stored"
        );
        Ok(narration)
    }

    /// Generate narrations for every chapter of a document.
    ///
    /// Continues past failures. Outcome ids are chapter ids.
    #[instrument(skip(self))]
    pub async fn generate_narrations_for_document(
        &self,
        document_id: &str,
    ) -> ReelsmithResult<BatchOutcome> {
        self.repository.get_document(document_id).await?;
        let chapters = self.repository.list_chapters(document_id).await?;

        let results: Vec<(String, ReelsmithResult<Narration>)> = stream::iter(chapters)
            .map(|chapter| async move {
                let id = chapter.id().clone();
                let result = self.generate_narration(&id).await;
                (id, result)
            })
            .buffer_unordered(self.settings.max_concurrency)
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        for (chapter_id, result) in results {
            match result {
                Ok(_) => outcome.succeed(chapter_id),
                Err(e) => {
                    warn!(%chapter_id, error = %e, "Narration failed");
                    outcome.fail(chapter_id, e.to_string());
                }
            }
        }
        info!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Document narration finished"
        );
        Ok(outcome)
    }

    /// The narration version downstream stages use.
    pub async fn current_narration(&self, chapter_id: &str) -> ReelsmithResult<Narration> {
        let version = self
            .require_version(chapter_id, VersionKind::Narration)
            .await?;
        self.repository
            .list_narrations(chapter_id)
            .await?
            .into_iter()
            .find(|n| n.version == version)
            .ok_or_else(|| {
                PipelineError::new(PipelineErrorKind::NoVersion {
                    kind: VersionKind::Narration.to_string(),
                    chapter_id: chapter_id.to_string(),
                })
                .into()
            })
    }
}

//! Narration prompt construction.

use reelsmith_interface::TextRequest;

/// System instruction describing the script format.
pub const NARRATION_SYSTEM_PROMPT: &str = r#"You are a storyboard writer turning prose into a narrated short video.

Respond with ONLY a JSON object, no commentary, in this exact shape:
{
  "chapter_info": {"title": "...", "summary": "..."},
  "characters": [{"name": "...", "description": "consistent visual description"}],
  "scenes": [
    {
      "scene_number": 1,
      "description": "...",
      "shots": [
        {
          "shot_number": 1,
          "narration": "the sentence the narrator speaks",
          "image_prompt": "a detailed still-image prompt, vertical 9:16 framing",
          "video_prompt": "how the still image should move",
          "camera_movement": "slow push in",
          "duration": 5
        }
      ]
    }
  ]
}

Rules:
- Every scene has at least one shot and every shot has non-empty narration.
- Narration follows the source text in order and is written to be spoken aloud.
- Keep each shot's narration short enough to read in 3 to 10 seconds.
- Describe characters the same way in every image prompt they appear in.
- Do not put stage directions or bracketed notes in narration."#;

/// Build the user prompt for one chapter.
///
/// # Examples
///
/// ```
/// let prompt = reelsmith_pipeline::build_narration_prompt("The river rose at dawn.");
/// assert!(prompt.ends_with("The river rose at dawn."));
/// ```
pub fn build_narration_prompt(chapter_text: &str) -> String {
    format!(
        "Write the narration script for the following chapter.\n\n---\n{}",
        chapter_text.trim()
    )
}

/// The complete text request for a chapter.
pub fn narration_request(chapter_text: &str) -> TextRequest {
    TextRequest {
        prompt: build_narration_prompt(chapter_text),
        system: Some(NARRATION_SYSTEM_PROMPT.to_string()),
        ..TextRequest::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_system_prompt() {
        let request = narration_request("  Text.  ");
        assert!(request.prompt.ends_with("---\nText."));
        assert!(request.system.as_deref().unwrap_or_default().contains("\"scenes\""));
        assert!(request.max_tokens.is_none());
    }
}

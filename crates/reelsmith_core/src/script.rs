//! Narration script DTOs returned by the text generator.
//!
//! Fields the model may omit are optional here; whether a script is usable is
//! decided by the orchestrator's validation, not by deserialization.

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level script: `{chapter_info, characters, scenes[shots[]]}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NarrationScript {
    /// Chapter title and summary
    #[serde(default)]
    pub chapter_info: Option<ChapterInfo>,
    /// Characters appearing in the chapter
    #[serde(default)]
    pub characters: Vec<Character>,
    /// Scenes in order; `None` when the model left the key out
    #[serde(default)]
    pub scenes: Option<Vec<SceneScript>>,
}

impl NarrationScript {
    /// Total number of shots across all scenes.
    pub fn shot_count(&self) -> usize {
        self.scenes
            .iter()
            .flatten()
            .map(|s| s.shots.as_ref().map_or(0, Vec::len))
            .sum()
    }
}

/// Chapter-level metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChapterInfo {
    /// Chapter title
    #[serde(default)]
    pub title: Option<String>,
    /// One-paragraph summary
    #[serde(default)]
    pub summary: Option<String>,
}

/// A character listed by the script.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Character {
    /// Character name
    #[serde(default)]
    pub name: String,
    /// Visual description used to keep prompts consistent
    #[serde(default)]
    pub description: Option<String>,
}

/// One scene in the script.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneScript {
    /// Scene label; numbers and strings are both accepted
    #[serde(default, deserialize_with = "string_or_number")]
    pub scene_number: Option<String>,
    /// Scene description
    #[serde(default)]
    pub description: Option<String>,
    /// Shots in order; `None` when the model left the key out
    #[serde(default)]
    pub shots: Option<Vec<ShotScript>>,
}

/// One shot in the script.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShotScript {
    /// Shot label within the scene
    #[serde(default, deserialize_with = "string_or_number")]
    pub shot_number: Option<String>,
    /// Narrated text
    #[serde(default)]
    pub narration: Option<String>,
    /// Still-image prompt
    #[serde(default, alias = "imagePrompt")]
    pub image_prompt: Option<String>,
    /// Video prompt
    #[serde(default, alias = "videoPrompt")]
    pub video_prompt: Option<String>,
    /// Camera-movement hint
    #[serde(default, alias = "cameraMovement")]
    pub camera_movement: Option<String>,
    /// Suggested duration in seconds; "5", "5s" and 5 are all accepted
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub duration: Option<f64>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .trim_end_matches(['s', 'S', '秒'])
            .trim()
            .parse::<f64>()
            .ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_fields() {
        let json = r#"{
            "scenes": [{
                "scene_number": 1,
                "shots": [
                    {"narration": "a", "duration": "5s"},
                    {"narration": "b", "duration": 3, "imagePrompt": "sky"}
                ]
            }]
        }"#;
        let script: NarrationScript = serde_json::from_str(json).unwrap();
        let scenes = script.scenes.as_ref().unwrap();
        assert_eq!(scenes[0].scene_number.as_deref(), Some("1"));
        let shots = scenes[0].shots.as_ref().unwrap();
        assert_eq!(shots[0].duration, Some(5.0));
        assert_eq!(shots[1].duration, Some(3.0));
        assert_eq!(shots[1].image_prompt.as_deref(), Some("sky"));
        assert_eq!(script.shot_count(), 2);
    }

    #[test]
    fn test_missing_scenes_is_none() {
        let script: NarrationScript =
            serde_json::from_str(r#"{"chapter_info": {"title": "One"}}"#).unwrap();
        assert!(script.scenes.is_none());
        assert_eq!(script.shot_count(), 0);
    }
}

//! Extracting the JSON script from a text generator response.
//!
//! Models wrap JSON in markdown fences or surround it with commentary. The
//! strategies, in order: a ```json fence, any ``` fence, then the first
//! balanced `{ ... }` object.

use reelsmith_error::{PipelineError, PipelineErrorKind, ReelsmithResult};
use serde::de::DeserializeOwned;

/// Extract the JSON object from a response that may contain markdown or extra text.
///
/// # Errors
///
/// Returns a validation error if no JSON object is found.
///
/// # Examples
///
/// ```
/// use reelsmith_pipeline::extract_json;
///
/// let response = "Here is the script:\n```json\n{\"scenes\": []}\n```\nEnjoy!";
/// assert_eq!(extract_json(response).unwrap(), "{\"scenes\": []}");
/// ```
pub fn extract_json(response: &str) -> ReelsmithResult<String> {
    if let Some(json) = extract_from_code_block(response, "json") {
        return Ok(json);
    }
    if let Some(json) = extract_from_code_block(response, "")
        && json.starts_with('{')
    {
        return Ok(json);
    }
    if let Some(json) = extract_balanced(response, '{', '}') {
        return Ok(json);
    }

    tracing::error!(
        response_length = response.len(),
        "No JSON found in text generator response"
    );
    Err(PipelineError::new(PipelineErrorKind::Validation(format!(
        "No JSON object found in response (length: {})",
        response.len()
    )))
    .into())
}

/// Extract and deserialize JSON from a response.
///
/// # Errors
///
/// Returns a validation error if extraction or deserialization fails.
pub fn parse_json<T: DeserializeOwned>(response: &str) -> ReelsmithResult<T> {
    let json = extract_json(response)?;
    serde_json::from_str(&json).map_err(|e| {
        PipelineError::new(PipelineErrorKind::Validation(format!(
            "Response is not a valid script: {}",
            e
        )))
        .into()
    })
}

fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let fence = format!("```{}", language);
    let start = response.find(&fence)?;
    let mut content_start = start + fence.len();
    if language.is_empty() {
        // Skip an unknown language tag.
        content_start = response[content_start..]
            .find('\n')
            .map(|n| content_start + n + 1)
            .unwrap_or(content_start);
    }
    let content = match response[content_start..].find("```") {
        Some(end) => &response[content_start..content_start + end],
        // Truncated response without a closing fence.
        None => &response[content_start..],
    };
    let content = content.trim();
    (!content.is_empty()).then(|| content.to_string())
}

fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object_with_commentary() {
        let response = "Sure! {\"scenes\": [{\"shots\": []}]} Hope that helps.";
        assert_eq!(
            extract_json(response).unwrap(),
            "{\"scenes\": [{\"shots\": []}]}"
        );
    }

    #[test]
    fn test_braces_inside_strings() {
        let response = r#"{"narration": "a } brace", "n": 1}"#;
        assert_eq!(extract_json(response).unwrap(), response);
    }

    #[test]
    fn test_unlabelled_fence() {
        let response = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json(response).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_non_json_fence_falls_through_to_braces() {
        let response = "```text\nnotes first\n```\nScript: {\"a\": 2}";
        assert_eq!(extract_json(response).unwrap(), "{\"a\": 2}");
    }

    #[test]
    fn test_no_json_is_validation_error() {
        let err = extract_json("I cannot help with that.").unwrap_err();
        assert!(err.to_string().contains("No JSON object"));
    }

    #[test]
    fn test_parse_json_reports_shape_errors() {
        let err = parse_json::<Vec<u32>>("{\"a\": 1}").unwrap_err();
        assert!(err.to_string().contains("not a valid script"));
    }
}

//! Workflow graph templates with `{{name}}` placeholders.

use reelsmith_error::{ConfigError, JsonError, ReelsmithResult};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, instrument};

const DEFAULT_IMAGE_WORKFLOW: &str = include_str!("default_workflow.json");

/// A workflow graph whose string values may contain placeholders.
///
/// A string that is exactly one placeholder is replaced by the variable's
/// JSON value, so numbers stay numbers. Placeholders embedded in longer
/// strings are replaced textually.
///
/// # Examples
///
/// ```
/// use reelsmith_models::WorkflowTemplate;
/// use serde_json::json;
///
/// let template = WorkflowTemplate::new(json!({
///     "1": {"inputs": {"text": "{{prompt}}", "seed": "{{seed}}", "prefix": "reel/{{name}}"}}
/// }));
/// let graph = template.render(&[
///     ("prompt", json!("a lighthouse")),
///     ("seed", json!(42)),
///     ("name", json!("shot_1")),
/// ]);
/// assert_eq!(graph["1"]["inputs"]["text"], "a lighthouse");
/// assert_eq!(graph["1"]["inputs"]["seed"], 42);
/// assert_eq!(graph["1"]["inputs"]["prefix"], "reel/shot_1");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowTemplate {
    graph: Value,
}

impl WorkflowTemplate {
    /// Wrap an in-memory graph.
    pub fn new(graph: Value) -> Self {
        Self { graph }
    }

    /// Built-in text-to-image graph.
    pub fn default_image() -> ReelsmithResult<Self> {
        Self::parse(DEFAULT_IMAGE_WORKFLOW)
    }

    /// Parse a template from JSON text.
    pub fn parse(content: &str) -> ReelsmithResult<Self> {
        let graph: Value = serde_json::from_str(content)
            .map_err(|e| JsonError::new(format!("Invalid workflow template: {}", e)))?;
        if !graph.is_object() {
            return Err(ConfigError::new("Workflow template must be a JSON object").into());
        }
        Ok(Self { graph })
    }

    /// Load a template from a file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> ReelsmithResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::new(format!(
                "Failed to read workflow {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        debug!(bytes = content.len(), "Loaded workflow template");
        Self::parse(&content)
    }

    /// Substitute variables into a copy of the graph.
    pub fn render(&self, vars: &[(&str, Value)]) -> Value {
        let mut graph = self.graph.clone();
        substitute(&mut graph, vars);
        graph
    }
}

fn placeholder(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

fn substitute(value: &mut Value, vars: &[(&str, Value)]) {
    let exact = match &*value {
        Value::String(s) => vars
            .iter()
            .find(|(name, _)| *s == placeholder(name))
            .map(|(_, replacement)| replacement.clone()),
        _ => None,
    };
    if let Some(replacement) = exact {
        *value = replacement;
        return;
    }

    match value {
        Value::String(s) => {
            for (name, replacement) in vars {
                let token = placeholder(name);
                if s.contains(&token) {
                    let text = match replacement {
                        Value::String(r) => r.clone(),
                        other => other.to_string(),
                    };
                    *s = s.replace(&token, &text);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| substitute(item, vars)),
        Value::Object(map) => map.values_mut().for_each(|item| substitute(item, vars)),
        _ => {}
    }
}

/// Random seed for sampler nodes.
pub(crate) fn random_seed() -> u64 {
    (uuid::Uuid::new_v4().as_u128() as u64) & 0x0000_ffff_ffff_ffff
}

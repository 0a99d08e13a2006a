//! Content filtering for generated narration text.

use regex::{Regex, RegexBuilder};
use reelsmith_error::{ConfigError, ReelsmithResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument, warn};

/// A sensitive term and the neutral wording that replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermReplacement {
    /// Term to find (case-insensitive)
    pub term: String,
    /// Text substituted for it
    pub replacement: String,
}

/// Content filter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFilterConfig {
    /// Terms reported as warnings; generation continues
    #[serde(default)]
    pub forbidden_terms: Vec<String>,

    /// Terms rewritten to neutral equivalents
    #[serde(default)]
    pub replacements: Vec<TermReplacement>,

    /// Terms removed unconditionally
    #[serde(default)]
    pub stripped_terms: Vec<String>,
}

/// Result of filtering one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Filtered text
    pub text: String,
    /// Forbidden terms found in the input, lowercased and sorted
    pub flagged: Vec<String>,
    /// Number of substitutions made
    pub replaced: usize,
    /// Number of terms stripped
    pub stripped: usize,
}

impl FilterOutcome {
    /// Whether the filter changed anything or raised a warning.
    pub fn is_clean(&self) -> bool {
        self.flagged.is_empty() && self.replaced == 0 && self.stripped == 0
    }
}

/// Filter for narration text produced by the language model.
///
/// # Examples
///
/// ```
/// use reelsmith_safety::{ContentFilter, ContentFilterConfig, TermReplacement};
///
/// let filter = ContentFilter::new(ContentFilterConfig {
///     forbidden_terms: vec!["gore".into()],
///     replacements: vec![TermReplacement { term: "killed".into(), replacement: "defeated".into() }],
///     stripped_terms: vec!["slur".into()],
/// }).unwrap();
///
/// let outcome = filter.filter("The hero  killed the slur beast.\n\n\n\nGore everywhere.");
/// assert_eq!(outcome.text, "The hero defeated the beast.\n\nGore everywhere.");
/// assert_eq!(outcome.flagged, vec!["gore".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct ContentFilter {
    forbidden: Option<Regex>,
    sensitive: Option<Regex>,
    replacements: HashMap<String, String>,
    stripped: Option<Regex>,
    inline_space: Regex,
    line_edges: Regex,
    blank_runs: Regex,
}

impl ContentFilter {
    /// Create a new content filter with the given configuration.
    ///
    /// # Errors
    ///
    /// Fails when a replacement reintroduces a sensitive or stripped term,
    /// since the filter could then never settle.
    pub fn new(config: ContentFilterConfig) -> ReelsmithResult<Self> {
        let sensitive_terms = lowered(config.replacements.iter().map(|r| &r.term));
        let stripped_terms = lowered(config.stripped_terms.iter());

        for rule in &config.replacements {
            let replacement = rule.replacement.to_lowercase();
            if let Some(term) = sensitive_terms
                .iter()
                .chain(stripped_terms.iter())
                .find(|t| replacement.contains(t.as_str()))
            {
                return Err(ConfigError::new(format!(
                    "Replacement '{}' for '{}' contains filtered term '{}'",
                    rule.replacement, rule.term, term
                ))
                .into());
            }
        }

        let replacements = config
            .replacements
            .iter()
            .filter(|r| !r.term.trim().is_empty())
            .map(|r| (r.term.trim().to_lowercase(), r.replacement.clone()))
            .collect();

        Ok(Self {
            forbidden: term_regex(&lowered(config.forbidden_terms.iter()))?,
            sensitive: term_regex(&sensitive_terms)?,
            replacements,
            stripped: term_regex(&stripped_terms)?,
            inline_space: compile(r"[ \t\u{3000}]+")?,
            line_edges: compile(r" ?\n ?")?,
            blank_runs: compile(r"\n{3,}")?,
        })
    }

    /// Filter text: flag, substitute, strip, then normalize whitespace.
    ///
    /// Passes repeat until the text stops changing, so filtering the output
    /// again returns it unchanged. Every changing pass removes or rewrites a
    /// term, so the pass count is bounded by the input length.
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub fn filter(&self, content: &str) -> FilterOutcome {
        let flagged: Vec<String> = match &self.forbidden {
            Some(re) => re
                .find_iter(content)
                .map(|m| m.as_str().to_lowercase())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            None => Vec::new(),
        };
        if !flagged.is_empty() {
            warn!(terms = ?flagged, "Content contains forbidden terms");
        }

        let mut text = content.to_string();
        let mut replaced = 0;
        let mut stripped = 0;
        let max_passes = content.chars().count() + 1;
        for _ in 0..max_passes {
            let mut next = text.clone();
            if let Some(re) = &self.sensitive {
                replaced += re.find_iter(&next).count();
                next = re
                    .replace_all(&next, |caps: &regex::Captures<'_>| {
                        self.replacements
                            .get(&caps[0].to_lowercase())
                            .cloned()
                            .unwrap_or_default()
                    })
                    .into_owned();
            }
            if let Some(re) = &self.stripped {
                stripped += re.find_iter(&next).count();
                next = re.replace_all(&next, "").into_owned();
            }
            next = self.normalize_whitespace(&next);
            if next == text {
                break;
            }
            text = next;
        }

        debug!(replaced, stripped, flagged = flagged.len(), "Filtered content");
        FilterOutcome {
            text,
            flagged,
            replaced,
            stripped,
        }
    }

    /// Collapse space runs, trim line edges, cap blank lines at one, trim.
    pub fn normalize_whitespace(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n");
        let text = self.inline_space.replace_all(&text, " ");
        let text = self.line_edges.replace_all(&text, "\n");
        let text = self.blank_runs.replace_all(&text, "\n\n");
        text.trim().to_string()
    }
}

fn lowered<'a>(terms: impl Iterator<Item = &'a String>) -> Vec<String> {
    terms
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn compile(pattern: &str) -> ReelsmithResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| ConfigError::new(format!("Invalid regex pattern '{}': {}", pattern, e)).into())
}

/// Case-insensitive alternation of literal terms, longest first.
fn term_regex(terms: &[String]) -> ReelsmithResult<Option<Regex>> {
    if terms.is_empty() {
        return Ok(None);
    }
    let mut sorted: Vec<&String> = terms.iter().collect();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    sorted.dedup();
    let pattern = sorted
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| ConfigError::new(format!("Invalid term list: {}", e)).into())
}

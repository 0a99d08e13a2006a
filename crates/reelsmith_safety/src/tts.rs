//! Cleaning narration text before speech synthesis.

use regex::Regex;
use reelsmith_error::{ConfigError, ReelsmithResult};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

const BRACKET_PAIRS: [(char, char); 4] = [('(', ')'), ('[', ']'), ('（', '）'), ('【', '】')];

/// TTS cleaner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtsCleanerConfig {
    /// Symbols deleted wherever they appear
    #[serde(default = "default_stray_symbols")]
    pub stray_symbols: Vec<String>,
}

fn default_stray_symbols() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for TtsCleanerConfig {
    fn default() -> Self {
        Self {
            stray_symbols: default_stray_symbols(),
        }
    }
}

/// Removes bracketed stage directions so they are not read aloud.
///
/// Handles `()`, `[]`, `（）` and `【】`, including nesting. Unbalanced
/// bracket characters left over are deleted as well.
///
/// # Examples
///
/// ```
/// use reelsmith_safety::{TtsCleaner, TtsCleanerConfig};
///
/// let cleaner = TtsCleaner::new(TtsCleanerConfig::default()).unwrap();
/// assert_eq!(
///     cleaner.clean("她笑了（轻声）。*Then* [pause] he   left (slowly)."),
///     "她笑了。Then he left ."
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TtsCleaner {
    bracketed: Vec<Regex>,
    stray_symbols: Vec<String>,
    whitespace: Regex,
}

impl TtsCleaner {
    /// Build a cleaner from configuration.
    pub fn new(config: TtsCleanerConfig) -> ReelsmithResult<Self> {
        let mut bracketed = Vec::with_capacity(BRACKET_PAIRS.len());
        for (open, close) in BRACKET_PAIRS {
            let (o, c) = (regex::escape(&open.to_string()), regex::escape(&close.to_string()));
            // Innermost pair first; repeated until none remain.
            let pattern = format!("{o}[^{o}{c}]*{c}");
            bracketed.push(
                Regex::new(&pattern)
                    .map_err(|e| ConfigError::new(format!("Invalid bracket pattern: {}", e)))?,
            );
        }
        let whitespace = Regex::new(r"\s+")
            .map_err(|e| ConfigError::new(format!("Invalid whitespace pattern: {}", e)))?;
        Ok(Self {
            bracketed,
            stray_symbols: config
                .stray_symbols
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect(),
            whitespace,
        })
    }

    /// Clean `text` for speech synthesis.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn clean(&self, text: &str) -> String {
        let mut current = text.to_string();
        loop {
            let mut next = current.clone();
            for re in &self.bracketed {
                next = re.replace_all(&next, "").into_owned();
            }
            if next == current {
                break;
            }
            current = next;
        }

        current.retain(|c| !BRACKET_PAIRS.iter().any(|(o, cl)| c == *o || c == *cl));
        for symbol in &self.stray_symbols {
            current = current.replace(symbol.as_str(), "");
        }

        let cleaned = self.whitespace.replace_all(&current, " ").trim().to_string();
        trace!(before = text.len(), after = cleaned.len(), "Cleaned TTS text");
        cleaned
    }
}

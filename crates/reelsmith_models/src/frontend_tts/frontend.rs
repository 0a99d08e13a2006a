//! Word timings from the speech `frontend` payload.
//!
//! The payload is a JSON document embedded as a string. Some responses
//! arrive with adjacent objects missing their separating comma
//! (`{...}{...}`); those are repaired. Anything still unparseable degrades to
//! the individual word objects that can be salvaged.

use reelsmith_core::WordTiming;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct FrontendPayload {
    #[serde(default)]
    words: Vec<FrontendWord>,
}

#[derive(Debug, Deserialize)]
struct FrontendWord {
    word: String,
    start_time: f64,
    end_time: f64,
}

impl From<FrontendWord> for WordTiming {
    fn from(word: FrontendWord) -> Self {
        WordTiming::new(word.word, word.start_time, word.end_time)
    }
}

/// Parse word timings from a raw `frontend` string.
///
/// Never fails: returns as many timings as can be recovered, possibly none.
pub fn parse_word_timings(raw: &str) -> Vec<WordTiming> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    if let Ok(payload) = serde_json::from_str::<FrontendPayload>(raw) {
        return keep_valid(payload.words);
    }

    let repaired = insert_missing_commas(raw);
    if let Ok(payload) = serde_json::from_str::<FrontendPayload>(&repaired) {
        debug!("Repaired frontend payload");
        return keep_valid(payload.words);
    }

    let salvaged = salvage_words(&repaired);
    warn!(
        recovered = salvaged.len(),
        "Frontend payload unparseable, using salvaged word timings"
    );
    salvaged
}

fn keep_valid(words: Vec<FrontendWord>) -> Vec<WordTiming> {
    words
        .into_iter()
        .filter(|w| !w.word.is_empty() && w.end_time >= w.start_time && w.start_time >= 0.0)
        .map(WordTiming::from)
        .collect()
}

/// Insert `,` between `}` and `{` that are adjacent outside string literals.
pub(crate) fn insert_missing_commas(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut after_close = false;

    for c in raw.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                after_close = false;
            }
            '}' => after_close = true,
            '{' if after_close => {
                // Trailing whitespace stays before the inserted comma.
                out.push(',');
                after_close = false;
            }
            c if c.is_whitespace() => {}
            _ => after_close = false,
        }
        out.push(c);
    }
    out
}

fn salvage_words(raw: &str) -> Vec<WordTiming> {
    let Ok(object) = Regex::new(r#"\{[^{}]*"word"\s*:[^{}]*\}"#) else {
        return Vec::new();
    };
    let words = object
        .find_iter(raw)
        .filter_map(|m| serde_json::from_str::<FrontendWord>(m.as_str()).ok())
        .collect();
    keep_valid(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_payload() {
        let raw = r#"{"words":[{"word":"你","start_time":0.0,"end_time":0.2},{"word":"好","start_time":0.2,"end_time":0.5}],"phonemes":[]}"#;
        let words = parse_word_timings(raw);
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].word, "好");
        assert_eq!(words[1].end_time, 0.5);
    }

    #[test]
    fn test_missing_commas_repaired() {
        let raw = r#"{"words":[{"word":"a","start_time":0.0,"end_time":0.1}{"word":"b","start_time":0.1,"end_time":0.3} {"word":"c","start_time":0.3,"end_time":0.4}]}"#;
        let words = parse_word_timings(raw);
        assert_eq!(
            words.iter().map(|w| w.word.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_braces_inside_strings_untouched() {
        let repaired = insert_missing_commas(r#"{"word":"}{"}"#);
        assert_eq!(repaired, r#"{"word":"}{"}"#);
    }

    #[test]
    fn test_truncated_payload_salvaged() {
        let raw = r#"{"words":[{"word":"one","start_time":0.0,"end_time":0.4},{"word":"two","start_time":0.4,"end_time":0.9},{"word":"thr"#;
        let words = parse_word_timings(raw);
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].word, "two");
    }

    #[test]
    fn test_garbage_yields_nothing() {
        assert!(parse_word_timings("not json at all").is_empty());
        assert!(parse_word_timings("").is_empty());
    }
}

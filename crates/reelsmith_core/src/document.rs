//! Source documents and their chapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Character, word and line counts of a block of text.
///
/// Each CJK ideograph, kana or hangul syllable counts as one word; other
/// words are whitespace-separated runs.
///
/// # Examples
///
/// ```
/// use reelsmith_core::TextStats;
///
/// let stats = TextStats::from_text("Hello world\n你好");
/// assert_eq!(stats.char_count, 14);
/// assert_eq!(stats.word_count, 4);
/// assert_eq!(stats.line_count, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextStats {
    /// Number of Unicode scalar values
    pub char_count: usize,
    /// Number of words
    pub word_count: usize,
    /// Number of lines
    pub line_count: usize,
}

impl TextStats {
    /// Count the characters, words and lines of `text`.
    pub fn from_text(text: &str) -> Self {
        let mut word_count = 0;
        let mut in_word = false;
        for c in text.chars() {
            if is_cjk(c) {
                word_count += 1;
                in_word = false;
            } else if c.is_whitespace() {
                in_word = false;
            } else if !in_word {
                word_count += 1;
                in_word = true;
            }
        }
        Self {
            char_count: text.chars().count(),
            word_count,
            line_count: text.lines().count(),
        }
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x3040..=0x30FF
        | 0xAC00..=0xD7AF
        | 0xF900..=0xFAFF)
}

/// An imported source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Record id
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Full source text
    pub text: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Create a new document with a fresh id.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: crate::new_id(),
            title: title.into(),
            text: text.into(),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }
}

/// One chapter of a document. Immutable once split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Chapter {
    id: String,
    document_id: String,
    /// 1-based position within the document
    sequence: u32,
    text: String,
    stats: TextStats,
    created_at: DateTime<Utc>,
}

impl Chapter {
    /// Create a chapter, computing its text statistics.
    pub fn new(document_id: impl Into<String>, sequence: u32, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: crate::new_id(),
            document_id: document_id.into(),
            sequence,
            stats: TextStats::from_text(&text),
            text,
            created_at: Utc::now(),
        }
    }
}

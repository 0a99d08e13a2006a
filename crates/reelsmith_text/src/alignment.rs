//! Word → character timing alignment.

use reelsmith_core::{CharTiming, WordTiming};

/// Spread each word's time span evenly across its characters.
///
/// A word of `n` characters spanning `[start, end]` yields `n` consecutive
/// slices of width `(end - start) / n`. Whitespace inside a word is dropped;
/// words with no characters or with `end < start` contribute nothing.
///
/// # Examples
///
/// ```
/// use reelsmith_core::WordTiming;
/// use reelsmith_text::build_char_timings;
///
/// let chars = build_char_timings(&[WordTiming::new("你好", 0.0, 0.5)]);
/// assert_eq!(chars.len(), 2);
/// assert_eq!(chars[0].character, '你');
/// assert_eq!(chars[0].end_time, 0.25);
/// assert_eq!(chars[1].start_time, 0.25);
/// assert_eq!(chars[1].end_time, 0.5);
/// ```
pub fn build_char_timings(words: &[WordTiming]) -> Vec<CharTiming> {
    let mut timings = Vec::new();
    for word in words {
        let chars: Vec<char> = word.word.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.is_empty() || word.end_time < word.start_time {
            continue;
        }
        let step = (word.end_time - word.start_time) / chars.len() as f64;
        let last = chars.len() - 1;
        for (i, character) in chars.into_iter().enumerate() {
            let start_time = word.start_time + step * i as f64;
            // Pin the final slice to the word end so rounding never drifts.
            let end_time = if i == last {
                word.end_time
            } else {
                word.start_time + step * (i + 1) as f64
            };
            timings.push(CharTiming {
                character,
                start_time,
                end_time,
            });
        }
    }
    timings
}

/// Approximate word timings for speech that came back without them.
///
/// Words are CJK characters or whitespace-separated runs; the total
/// `duration_secs` is shared out in proportion to character counts.
///
/// # Examples
///
/// ```
/// use reelsmith_text::estimate_word_timings;
///
/// let words = estimate_word_timings("go home", 3.0);
/// assert_eq!(words.len(), 2);
/// assert_eq!(words[0].end_time, 1.0);
/// assert_eq!(words[1].end_time, 3.0);
/// ```
pub fn estimate_word_timings(text: &str, duration_secs: f64) -> Vec<WordTiming> {
    let words = tokenize(text);
    let total_chars: usize = words.iter().map(|w| w.chars().count()).sum();
    if total_chars == 0 || duration_secs <= 0.0 {
        return Vec::new();
    }
    let per_char = duration_secs / total_chars as f64;
    let mut cursor = 0.0;
    let mut consumed = 0usize;
    let mut timings = Vec::with_capacity(words.len());
    for word in words {
        consumed += word.chars().count();
        let end = if consumed == total_chars {
            duration_secs
        } else {
            per_char * consumed as f64
        };
        timings.push(WordTiming::new(word, cursor, end));
        cursor = end;
    }
    timings
}

fn tokenize(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if is_cjk(c) {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            words.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32, 0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0x3040..=0x30FF | 0xAC00..=0xD7AF)
}

//! Subtitle cue construction and SRT rendering.

use crate::{build_char_timings, estimate_word_timings};
use reelsmith_core::CharTiming;

const BREAK_CHARS: &[char] = &[
    '。', '！', '？', '；', '，', '、', '：', '.', '!', '?', ';', ',', ':',
];

/// Cue splitting limits.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct SubtitleOptions {
    /// Longest cue in characters before a forced break
    max_chars: usize,
    /// Drop trailing break punctuation from cue text
    strip_punctuation: bool,
}

impl SubtitleOptions {
    /// Create options with the given maximum cue length.
    pub fn new(max_chars: usize, strip_punctuation: bool) -> Self {
        Self {
            max_chars: max_chars.max(1),
            strip_punctuation,
        }
    }
}

impl Default for SubtitleOptions {
    fn default() -> Self {
        Self::new(16, true)
    }
}

/// One timed subtitle line.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Displayed text
    pub text: String,
}

/// Group character timings into subtitle cues.
///
/// A cue closes after break punctuation or once it holds `max_chars`
/// characters. When `char_timings` is empty and a duration is known, timings
/// are estimated from `text` instead.
///
/// # Examples
///
/// ```
/// use reelsmith_core::WordTiming;
/// use reelsmith_text::{build_char_timings, build_subtitle_cues, SubtitleOptions};
///
/// let timings = build_char_timings(&[
///     WordTiming::new("你好，", 0.0, 0.6),
///     WordTiming::new("世界", 0.6, 1.0),
/// ]);
/// let cues = build_subtitle_cues("", &timings, None, &SubtitleOptions::default());
/// assert_eq!(cues.len(), 2);
/// assert_eq!(cues[0].text, "你好");
/// assert_eq!(cues[1].text, "世界");
/// assert_eq!(cues[1].end, 1.0);
/// ```
pub fn build_subtitle_cues(
    text: &str,
    char_timings: &[CharTiming],
    duration_secs: Option<f64>,
    options: &SubtitleOptions,
) -> Vec<SubtitleCue> {
    let estimated;
    let timings = if char_timings.is_empty() {
        match duration_secs {
            Some(duration) => {
                estimated = build_char_timings(&estimate_word_timings(text, duration));
                &estimated[..]
            }
            None => return Vec::new(),
        }
    } else {
        char_timings
    };

    let mut cues = Vec::new();
    let mut pending: Vec<&CharTiming> = Vec::new();
    for timing in timings {
        pending.push(timing);
        let at_break = BREAK_CHARS.contains(&timing.character);
        if at_break || pending.len() >= options.max_chars {
            flush(&mut pending, &mut cues, options);
        }
    }
    flush(&mut pending, &mut cues, options);
    cues
}

fn flush(pending: &mut Vec<&CharTiming>, cues: &mut Vec<SubtitleCue>, options: &SubtitleOptions) {
    let (Some(first), Some(last)) = (pending.first(), pending.last()) else {
        return;
    };
    let mut text: String = pending.iter().map(|t| t.character).collect();
    if options.strip_punctuation {
        text = text.trim_end_matches(BREAK_CHARS).to_string();
    }
    if !text.trim().is_empty() {
        cues.push(SubtitleCue {
            start: first.start_time,
            end: last.end_time,
            text,
        });
    }
    pending.clear();
}

/// Format seconds as an SRT timestamp `HH:MM:SS,mmm`.
///
/// # Examples
///
/// ```
/// use reelsmith_text::format_srt_time;
///
/// assert_eq!(format_srt_time(3723.456), "01:02:03,456");
/// ```
pub fn format_srt_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_sec = total_ms / 1000;
    let s = total_sec % 60;
    let total_min = total_sec / 60;
    let m = total_min % 60;
    let h = total_min / 60;
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// Render cues as an SRT document.
pub fn render_srt(cues: &[SubtitleCue]) -> String {
    let mut out = String::new();
    for (i, cue) in cues.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_srt_time(cue.start),
            format_srt_time(cue.end),
            cue.text
        ));
    }
    out
}

//! Chapter segmentation.

use reelsmith_error::{PipelineError, PipelineErrorKind, ReelsmithResult};
use tracing::{debug, instrument};

/// Split `text` into at most `count` chapters at line boundaries.
///
/// Chapter boundaries fall on the line end closest to each even share of
/// the total character count, so chapters come out roughly equal in length.
/// Line terminators stay attached to their line, so concatenating the
/// returned chapters reproduces `text` exactly. When the text has fewer
/// lines than `count`, one chapter per line is returned.
///
/// # Errors
///
/// Fails when `count` is zero or `text` is blank.
///
/// # Examples
///
/// ```
/// use reelsmith_text::split_chapters;
///
/// let text = "one\ntwo\nthree\nfour\n";
/// let chapters = split_chapters(text, 2).unwrap();
/// assert_eq!(chapters, vec!["one\ntwo\n", "three\nfour\n"]);
/// assert_eq!(chapters.concat(), text);
/// ```
#[instrument(skip(text), fields(text_len = text.len()))]
pub fn split_chapters(text: &str, count: usize) -> ReelsmithResult<Vec<String>> {
    if count == 0 {
        return Err(PipelineError::new(PipelineErrorKind::InvalidSplit(
            "chapter count must be at least 1".to_string(),
        ))
        .into());
    }
    if text.trim().is_empty() {
        return Err(PipelineError::new(PipelineErrorKind::InvalidSplit(
            "text is empty".to_string(),
        ))
        .into());
    }

    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let count = count.min(lines.len());

    // Character offset at the end of each line.
    let mut ends = Vec::with_capacity(lines.len());
    let mut total = 0usize;
    for line in &lines {
        total += line.chars().count();
        ends.push(total);
    }

    let mut chapters = Vec::with_capacity(count);
    let mut start_line = 0usize;
    for k in 1..count {
        let target = total * k / count;
        // Leave at least one line for every chapter still to come.
        let last_allowed = lines.len() - (count - k) - 1;
        let mut cut = start_line;
        while cut < last_allowed && ends[cut] < target {
            cut += 1;
        }
        if cut > start_line && ends[cut] >= target {
            let before = ends[cut - 1];
            if target - before < ends[cut] - target {
                cut -= 1;
            }
        }
        chapters.push(lines[start_line..=cut].concat());
        start_line = cut + 1;
    }
    chapters.push(lines[start_line..].concat());

    debug!(chapters = chapters.len(), total_chars = total, "Split text into chapters");
    Ok(chapters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chapter_is_whole_text() {
        let text = "a\nb\nc";
        assert_eq!(split_chapters(text, 1).unwrap(), vec![text.to_string()]);
    }

    #[test]
    fn test_more_chapters_than_lines() {
        let chapters = split_chapters("first\nsecond", 5).unwrap();
        assert_eq!(chapters, vec!["first\n", "second"]);
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(split_chapters("text", 0).is_err());
    }

    #[test]
    fn test_blank_text_rejected() {
        assert!(split_chapters(" \n\n", 2).is_err());
    }
}
